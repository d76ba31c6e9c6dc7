//! The token character set: standard Base64 with `+` swapped for `~`, `/`
//! for `_` and the `=` padding for `-`, leaving every token URL- and
//! filename-safe without percent-encoding.

use base64ct::{Base64, Encoding};

use crate::IdMaskError;

pub(crate) fn encode(data: &[u8]) -> String {
    let mut out = Base64::encode_string(data).into_bytes();
    for b in &mut out {
        *b = match *b {
            b'+' => b'~',
            b'/' => b'_',
            b'=' => b'-',
            other => other,
        };
    }
    // the substitution maps ASCII to ASCII
    String::from_utf8(out).expect("base64 output is ascii")
}

pub(crate) fn decode(token: &str) -> Result<Vec<u8>, IdMaskError> {
    if !token.is_ascii() {
        return Err(IdMaskError::StateMismatch);
    }
    let mut mapped = token.as_bytes().to_vec();
    for b in &mut mapped {
        *b = match *b {
            b'~' => b'+',
            b'_' => b'/',
            b'-' => b'=',
            // the characters we substitute away are not part of this
            // alphabet, even though the underlying decoder knows them
            b'+' | b'/' | b'=' => return Err(IdMaskError::StateMismatch),
            other => other,
        };
    }
    let mapped = String::from_utf8(mapped).expect("ascii in, ascii out");
    Base64::decode_vec(&mapped).map_err(|_| IdMaskError::StateMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_three_specials() {
        // 0xfb 0xef 0xbe encodes to "++++" in standard base64
        assert_eq!(encode(&[0xfb, 0xef, 0xbe]), "~~~~");
        assert_eq!(encode(&[0xff, 0xff, 0xff]), "____");
        assert_eq!(encode(b"f"), "Zg--");
        assert_eq!(decode("~~~~").unwrap(), [0xfb, 0xef, 0xbe]);
        assert_eq!(decode("Zg--").unwrap(), b"f");
    }

    #[test]
    fn rejects_foreign_alphabets() {
        assert_eq!(decode("Zg=="), Err(IdMaskError::StateMismatch));
        assert_eq!(decode("Z g--"), Err(IdMaskError::StateMismatch));
        assert_eq!(decode("Zß--"), Err(IdMaskError::StateMismatch));
    }
}
