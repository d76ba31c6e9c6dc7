#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! IDMask - reversible, authenticated masking of internal identifiers.
//!
//! Databases hand out small, guessable identifiers: auto-increment integers,
//! UUIDs, short reference strings. Exposing them verbatim leaks row counts
//! and invites enumeration. `idmask` transforms an identifier of up to 16
//! bytes into an opaque, URL-safe token and back again. The transformation
//! is bijective (every token decodes to the exact original bytes, unlike
//! hashing) and authenticated (tokens cannot be forged, truncated or
//! bit-flipped without the secret key).
//!
//! ## Engines
//!
//! Two engines cover the two supported identifier widths:
//!
//! * [`EightByteEngine`] masks 1-8 byte identifiers with a single AES block
//!   carrying an embedded reference value. Compact tokens, 64-bit forgery
//!   resistance.
//! * [`SixteenByteEngine`] masks 1-16 byte identifiers with HKDF-derived
//!   per-token material, AES-CBC and a truncated HMAC-SHA-256 tag. Longer
//!   tokens, full MAC authentication, optional high-security mode.
//!
//! Both engines offer a *deterministic* mode (the same identifier always
//! produces the same token, so tokens stay cache- and URL-stable) and a
//! *randomized* mode (every call produces a fresh, uncorrelated token for
//! the same identifier, suitable for one-time links).
//!
//! ```
//! use idmask::{EightByteEngine, Engine, KeyStore, SecretKey};
//!
//! let key = SecretKey::generate(0).unwrap();
//! let engine = EightByteEngine::new(KeyStore::new(key));
//!
//! let token = engine.mask_number(8_237_291).unwrap();
//! assert_eq!(engine.unmask(&token).unwrap(), b"8237291");
//! ```
//!
//! ## Key rotation
//!
//! A [`KeyStore`] holds up to sixteen [`SecretKey`]s, indexed by a 4-bit key
//! id that is carried (obfuscated) inside every token. Exactly one key is
//! *active* and mints new tokens; retired keys stay resident so tokens
//! minted under them keep unmasking.
//!
//! ```
//! use idmask::{Engine, KeyStore, SecretKey, SixteenByteEngine};
//!
//! let retired = SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap();
//! let old = SixteenByteEngine::new(KeyStore::new(retired.clone()));
//! let token = old.mask(b"foo").unwrap();
//!
//! // rotate: key 1 becomes active, key 0 stays readable
//! let active = SecretKey::generate(1).unwrap();
//! let store = KeyStore::with_keys(active, [retired]).unwrap();
//! let engine = SixteenByteEngine::new(store);
//! assert_eq!(engine.unmask(&token).unwrap(), b"foo");
//! ```
//!
//! ## Security notes
//!
//! Leaking a secret key forfeits every property above: anyone holding it can
//! unmask and forge tokens at will. Keys are validated at construction
//! (length, non-triviality, a Shannon-entropy floor) and wiped from memory
//! on drop, but managing them is the caller's job.
//!
//! Identifiers are right-stripped of zero bytes on unmasking, so an
//! identifier that legitimately ends in zero bytes is indistinguishable
//! from its shorter form. Fix the width out-of-band if that can happen.

mod b64;
pub mod engine;
pub mod entropy;
pub mod key;

pub use engine::{eight::EightByteEngine, sixteen::SixteenByteEngine, Engine};
pub use entropy::{EntropySource, FixedEntropy, OsEntropy};
pub use key::{store::KeyStore, SecretKey, MAX_KEY_ID};

/// Error returned for all IDMask operations that can fail.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdMaskError {
    /// The identifier is empty or longer than the engine's width.
    InvalidInput,
    /// A key id outside the 4-bit range reached the masking path.
    InvalidKeyId,
    /// An engine id outside the 4-bit range reached the masking path.
    InvalidEngineId,
    /// The entropy source could not produce the requested bytes.
    NotEnoughEntropy,
    /// The cipher backend failed to encrypt.
    Encryption,
    /// The cipher backend failed to decrypt.
    Decryption,
    /// The token failed authentication: minted by a different engine,
    /// under an unknown or different key, tampered with, or not a
    /// structurally valid token at all.
    StateMismatch,
    /// A construction-time constraint was violated.
    InvalidArgument(&'static str),
}

impl std::fmt::Display for IdMaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdMaskError::InvalidInput => f.write_str("identifier length not supported by this engine"),
            IdMaskError::InvalidKeyId => f.write_str("key id must fit in 4 bits"),
            IdMaskError::InvalidEngineId => f.write_str("engine id must fit in 4 bits"),
            IdMaskError::NotEnoughEntropy => f.write_str("entropy source could not provide random bytes"),
            IdMaskError::Encryption => f.write_str("encryption failed"),
            IdMaskError::Decryption => f.write_str("decryption failed"),
            IdMaskError::StateMismatch => f.write_str("token could not be authenticated"),
            IdMaskError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl std::error::Error for IdMaskError {}
