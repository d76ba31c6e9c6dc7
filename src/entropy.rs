//! Sources of randomness for randomized masking and key generation.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::IdMaskError;

/// A source of cryptographically strong random bytes.
///
/// Engines in randomized mode draw their per-token entropy through this
/// trait, so tests can substitute a deterministic source and pin token
/// bytes exactly. Implementations must be safe to call from multiple
/// threads sharing one engine.
pub trait EntropySource {
    /// Produce `len` random bytes, or fail with
    /// [`NotEnoughEntropy`](IdMaskError::NotEnoughEntropy).
    fn generate(&self, len: usize) -> Result<Vec<u8>, IdMaskError>;
}

/// The operating system's RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn generate(&self, len: usize) -> Result<Vec<u8>, IdMaskError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| IdMaskError::NotEnoughEntropy)?;
        Ok(bytes)
    }
}

/// An entropy source that always returns the same preset bytes,
/// regardless of the requested length.
///
/// Exists so test vectors can be reproduced byte-for-byte. Never use this
/// outside of tests: randomized masking degenerates to deterministic
/// masking with a predictable layout.
#[derive(Clone, Debug)]
pub struct FixedEntropy {
    bytes: Vec<u8>,
}

impl FixedEntropy {
    /// A source that will hand out exactly `bytes` on every call.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl EntropySource for FixedEntropy {
    fn generate(&self, _len: usize) -> Result<Vec<u8>, IdMaskError> {
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_requested_length() {
        let bytes = OsEntropy.generate(24).unwrap();
        assert_eq!(bytes.len(), 24);
        // 24 zero bytes from the OS RNG means something is very wrong
        assert_ne!(bytes, vec![0u8; 24]);
    }

    #[test]
    fn fixed_entropy_ignores_length() {
        let fixed = FixedEntropy::new([7u8; 4]);
        assert_eq!(fixed.generate(16).unwrap(), [7u8; 4]);
        assert_eq!(fixed.generate(1).unwrap(), [7u8; 4]);
    }
}
