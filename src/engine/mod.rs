//! The masking engines and the token plumbing they share.
//!
//! An engine pairs a fixed configuration (key store, deterministic or
//! randomized mode, entropy source) with one of the two masking schemes.
//! Engines hold no mutable state: `mask` and `unmask` take `&self` and a
//! single engine can serve any number of threads.

use crate::IdMaskError;

pub mod eight;
pub mod sixteen;

/// Scheme identifier for [`eight::EightByteEngine`], as carried in the
/// version byte.
pub(crate) const EIGHT_BYTE_ENGINE_ID: u8 = 0;
/// Scheme identifier for [`sixteen::SixteenByteEngine`].
pub(crate) const SIXTEEN_BYTE_ENGINE_ID: u8 = 1;

/// The capability set every masking scheme exposes.
pub trait Engine {
    /// Transform an identifier into an opaque URL-safe token.
    ///
    /// The identifier must be between one byte and the engine's width.
    fn mask(&self, id: &[u8]) -> Result<String, IdMaskError>;

    /// Recover the identifier bytes from a token minted by this engine
    /// configuration.
    ///
    /// Trailing zero bytes of the recovered identifier are stripped; see
    /// the crate docs for the zero-suffix caveat.
    fn unmask(&self, token: &str) -> Result<Vec<u8>, IdMaskError>;

    /// Mask an integer identifier via its decimal string representation,
    /// byte for byte: `mask_number(42)` equals `mask(b"42")`.
    ///
    /// The engine width therefore caps the number of decimal digits, not
    /// the binary magnitude.
    fn mask_number(&self, id: u64) -> Result<String, IdMaskError> {
        self.mask(id.to_string().as_bytes())
    }
}

/// Every engine keys AES-256 off the stored key material: shorter keys
/// are right-padded with zero bytes, longer ones truncated. The scheme
/// identifier pins this choice; changing it would strand minted tokens.
pub(crate) fn aes_key(bytes: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    let n = bytes.len().min(key.len());
    key[..n].copy_from_slice(&bytes[..n]);
    key
}

/// Pack `(key_id, engine_id)` into the version byte, obfuscated by XOR
/// with the first ciphertext byte so equal ids do not produce a fixed
/// token prefix. The XOR is not a security measure; in the sixteen-byte
/// scheme the MAC covers the version byte, in the eight-byte scheme the
/// reference value stands in.
pub(crate) fn encode_version(key_id: u8, engine_id: u8, ciphertext0: u8) -> Result<u8, IdMaskError> {
    if key_id > 0x0F {
        return Err(IdMaskError::InvalidKeyId);
    }
    if engine_id > 0x0F {
        return Err(IdMaskError::InvalidEngineId);
    }
    Ok(((key_id << 4) | engine_id) ^ ciphertext0)
}

/// Recover `(key_id, engine_id)` from an obfuscated version byte.
pub(crate) fn decode_version(version: u8, ciphertext0: u8) -> (u8, u8) {
    let raw = version ^ ciphertext0;
    (raw >> 4, raw & 0x0F)
}

/// Right-strip the zero padding from a decrypted payload.
pub(crate) fn strip_zero_padding(payload: &[u8]) -> Vec<u8> {
    let end = payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    payload[..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_byte_roundtrip() {
        for key_id in 0..=15u8 {
            for engine_id in 0..=15u8 {
                for ct0 in [0x00, 0x5a, 0xff] {
                    let v = encode_version(key_id, engine_id, ct0).unwrap();
                    assert_eq!(decode_version(v, ct0), (key_id, engine_id));
                }
            }
        }
    }

    #[test]
    fn version_byte_rejects_wide_ids() {
        assert_eq!(encode_version(16, 0, 0), Err(IdMaskError::InvalidKeyId));
        assert_eq!(encode_version(0, 16, 0), Err(IdMaskError::InvalidEngineId));
    }

    #[test]
    fn aes_key_pads_and_truncates() {
        assert_eq!(&aes_key(&[1; 20])[..20], [1; 20]);
        assert_eq!(&aes_key(&[1; 20])[20..], [0; 12]);
        assert_eq!(aes_key(&[2; 40]), [2; 32]);
    }

    #[test]
    fn zero_padding_strip() {
        assert_eq!(strip_zero_padding(&[1, 2, 0, 3, 0, 0]), vec![1, 2, 0, 3]);
        assert_eq!(strip_zero_padding(&[0, 0]), Vec::<u8>::new());
        assert_eq!(strip_zero_padding(&[9]), vec![9]);
    }
}
