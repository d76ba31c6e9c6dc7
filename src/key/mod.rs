//! Secret keys and the key store that engines resolve them from.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::entropy::{EntropySource, OsEntropy};
use crate::IdMaskError;

pub mod store;

/// Largest key id that fits the version byte's 4-bit key field.
pub const MAX_KEY_ID: u8 = 15;

/// Validated secret key material with its store id.
///
/// Construction enforces the key constraints; afterwards the key is
/// immutable. The bytes are wiped from memory when the key is dropped.
///
/// ```
/// use idmask::SecretKey;
///
/// let key = SecretKey::new(0, *b"correct horse battery").unwrap();
/// assert_eq!(key.id(), 0);
///
/// // 64 identical bytes carry no entropy
/// assert!(SecretKey::new(1, [0x41; 64]).is_err());
/// ```
#[derive(Clone)]
pub struct SecretKey {
    id: u8,
    bytes: Box<[u8]>,
}

impl SecretKey {
    /// Shortest accepted key, in bytes.
    pub const MIN_LEN: usize = 12;
    /// Longest accepted key, in bytes.
    pub const MAX_LEN: usize = 64;

    /// Length of keys produced by [`SecretKey::generate`].
    const GENERATED_LEN: usize = (Self::MIN_LEN + Self::MAX_LEN) / 2;

    /// Minimum Shannon entropy of the key's byte distribution, in bits
    /// per byte. Catches repeating patterns, not weak-but-varied keys.
    const MIN_ENTROPY_BITS: f64 = 2.5;

    /// Build a key from raw bytes.
    ///
    /// Fails with [`IdMaskError::InvalidArgument`] if the id does not fit
    /// in 4 bits, the length is outside `[12, 64]`, the bytes are all
    /// zero, or the byte distribution is too repetitive.
    pub fn new(id: u8, bytes: impl Into<Vec<u8>>) -> Result<Self, IdMaskError> {
        let bytes: Vec<u8> = bytes.into();
        if id > MAX_KEY_ID {
            return Err(IdMaskError::InvalidArgument("key id must fit in 4 bits"));
        }
        if bytes.len() < Self::MIN_LEN || bytes.len() > Self::MAX_LEN {
            return Err(IdMaskError::InvalidArgument(
                "key must be between 12 and 64 bytes",
            ));
        }
        if bytes.iter().all(|&b| b == 0) {
            return Err(IdMaskError::InvalidArgument("key bytes must not all be zero"));
        }
        if shannon_entropy(&bytes) < Self::MIN_ENTROPY_BITS {
            return Err(IdMaskError::InvalidArgument(
                "key bytes are too repetitive to be a real key",
            ));
        }
        Ok(Self {
            id,
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Build a key from a hex string.
    ///
    /// ```
    /// use idmask::SecretKey;
    ///
    /// let key = SecretKey::from_hex(3, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap();
    /// assert_eq!(key.id(), 3);
    /// ```
    pub fn from_hex(id: u8, hex: &str) -> Result<Self, IdMaskError> {
        let bytes = hex::decode(hex)
            .map_err(|_| IdMaskError::InvalidArgument("key is not a valid hex string"))?;
        Self::new(id, bytes)
    }

    /// Generate a fresh 38-byte key from the operating system RNG.
    pub fn generate(id: u8) -> Result<Self, IdMaskError> {
        Self::new(id, OsEntropy.generate(Self::GENERATED_LEN)?)
    }

    /// The store id carried in the version byte of every token minted
    /// under this key.
    pub fn id(&self) -> u8 {
        self.id
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && bool::from(self.bytes.ct_eq(&other.bytes))
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Shannon entropy of the byte histogram, in bits per byte.
fn shannon_entropy(bytes: &[u8]) -> f64 {
    let mut counts = [0usize; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let len = bytes.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_uniform_bytes_is_log2_of_alphabet() {
        assert_eq!(shannon_entropy(&[7; 32]), 0.0);
        assert_eq!(shannon_entropy(&[0, 1, 2, 3]), 2.0);
        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&all) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_keys() {
        assert!(SecretKey::new(0, vec![0u8; 32]).is_err());
        assert!(SecretKey::new(0, vec![1u8; 11]).is_err());
        assert!(SecretKey::new(0, vec![1u8; 65]).is_err());
        assert!(SecretKey::new(0, vec![0x41; 64]).is_err());
        assert!(SecretKey::new(16, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]).is_err());
    }

    #[test]
    fn accepts_the_reference_fixture_key() {
        let key = SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap();
        assert_eq!(key.bytes().len(), 20);
    }

    #[test]
    fn generated_keys_validate_and_differ() {
        let a = SecretKey::generate(0).unwrap();
        let b = SecretKey::generate(0).unwrap();
        assert_eq!(a.bytes().len(), 38);
        assert_ne!(a, b);
    }

    #[test]
    fn equality_covers_id_and_bytes() {
        let bytes: Vec<u8> = (0..16).collect();
        let a = SecretKey::new(0, bytes.clone()).unwrap();
        let b = SecretKey::new(0, bytes.clone()).unwrap();
        let c = SecretKey::new(1, bytes).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
