//! Masking for identifiers of up to eight bytes, built on a single AES
//! block.
//!
//! The AES block is `reference(8) || payload(8)`. The reference value is
//! all zeros in deterministic mode and fresh random bytes in randomized
//! mode; on unmasking it must decrypt back to the expected value, which
//! is what stands in for a MAC here. A random 32-byte ciphertext survives
//! that check with probability 2^-64 - fine for short-lived opaque ids,
//! weaker than the sixteen-byte scheme's HMAC.

use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use subtle::ConstantTimeEq;

use crate::engine::{
    aes_key, decode_version, encode_version, strip_zero_padding, Engine, EIGHT_BYTE_ENGINE_ID,
};
use crate::entropy::{EntropySource, OsEntropy};
use crate::key::store::KeyStore;
use crate::{b64, IdMaskError};

type EcbEnc = ecb::Encryptor<aes::Aes256>;
type EcbDec = ecb::Decryptor<aes::Aes256>;

const REFERENCE_LEN: usize = 8;
// data block plus the full PKCS#7 padding block
const CIPHERTEXT_LEN: usize = 32;

/// Deterministic or randomized masking for identifiers of 1 to 8 bytes.
///
/// ```
/// use idmask::{EightByteEngine, Engine, KeyStore, SecretKey};
///
/// let key = SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap();
/// let engine = EightByteEngine::new(KeyStore::new(key));
///
/// let token = engine.mask(b"foo").unwrap();
/// assert_eq!(token, "gIC6GFLHSFQJDy~3f6_C8SaLivfwUzliqHY~Cz~Owp5L");
/// assert_eq!(engine.unmask(&token).unwrap(), b"foo");
/// ```
pub struct EightByteEngine<E: EntropySource = OsEntropy> {
    store: KeyStore,
    randomize: bool,
    entropy: E,
}

impl EightByteEngine {
    /// Widest identifier this engine accepts, in bytes.
    pub const WIDTH: usize = 8;

    /// A deterministic engine: equal identifiers yield equal tokens.
    pub fn new(store: KeyStore) -> Self {
        Self::with_entropy_source(store, false, OsEntropy)
    }

    /// A randomized engine: every call yields a fresh token.
    pub fn randomized(store: KeyStore) -> Self {
        Self::with_entropy_source(store, true, OsEntropy)
    }
}

impl<E: EntropySource> EightByteEngine<E> {
    /// An engine drawing randomness from the given source instead of the
    /// OS RNG.
    pub fn with_entropy_source(store: KeyStore, randomize: bool, entropy: E) -> Self {
        Self {
            store,
            randomize,
            entropy,
        }
    }

    fn reference(&self) -> Result<Vec<u8>, IdMaskError> {
        if !self.randomize {
            return Ok(vec![0u8; REFERENCE_LEN]);
        }
        let reference = self.entropy.generate(REFERENCE_LEN)?;
        if reference.len() != REFERENCE_LEN {
            return Err(IdMaskError::NotEnoughEntropy);
        }
        Ok(reference)
    }
}

impl<E: EntropySource> Engine for EightByteEngine<E> {
    fn mask(&self, id: &[u8]) -> Result<String, IdMaskError> {
        if id.is_empty() || id.len() > EightByteEngine::WIDTH {
            return Err(IdMaskError::InvalidInput);
        }
        let key = self.store.active_key();
        let reference = self.reference()?;

        let mut block = [0u8; 16];
        block[..REFERENCE_LEN].copy_from_slice(&reference);
        block[REFERENCE_LEN..][..id.len()].copy_from_slice(id);

        let ciphertext =
            EcbEnc::new(&aes_key(key.bytes()).into()).encrypt_padded_vec_mut::<Pkcs7>(&block);
        let version = encode_version(key.id(), EIGHT_BYTE_ENGINE_ID, ciphertext[0])?;

        let mut token = Vec::with_capacity(1 + REFERENCE_LEN + ciphertext.len());
        token.push(version);
        if self.randomize {
            token.extend_from_slice(&reference);
        }
        token.extend_from_slice(&ciphertext);
        Ok(b64::encode(&token))
    }

    fn unmask(&self, token: &str) -> Result<Vec<u8>, IdMaskError> {
        let raw = b64::decode(token)?;
        let reference_len = if self.randomize { REFERENCE_LEN } else { 0 };
        if raw.len() != 1 + reference_len + CIPHERTEXT_LEN {
            return Err(IdMaskError::StateMismatch);
        }
        let version = raw[0];
        let (expected_reference, ciphertext) = raw[1..].split_at(reference_len);
        let expected_reference = if self.randomize {
            expected_reference.to_vec()
        } else {
            vec![0u8; REFERENCE_LEN]
        };

        let (key_id, engine_id) = decode_version(version, ciphertext[0]);
        if engine_id != EIGHT_BYTE_ENGINE_ID {
            return Err(IdMaskError::StateMismatch);
        }
        let key = self.store.key(key_id).ok_or(IdMaskError::StateMismatch)?;

        let block = EcbDec::new(&aes_key(key.bytes()).into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| IdMaskError::Decryption)?;
        if block.len() != 16 {
            return Err(IdMaskError::StateMismatch);
        }

        let (actual_reference, payload) = block.split_at(REFERENCE_LEN);
        if actual_reference.ct_ne(&expected_reference).into() {
            return Err(IdMaskError::StateMismatch);
        }
        Ok(strip_zero_padding(payload))
    }
}
