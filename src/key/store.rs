//! An immutable catalog of secret keys, indexed by 4-bit key id.

use std::collections::HashMap;

use crate::key::SecretKey;
use crate::IdMaskError;

/// Holds every key an engine may encounter, with exactly one marked
/// active.
///
/// New tokens are always minted under the active key; unmasking resolves
/// whatever key id the token carries, which is how tokens minted before a
/// key rotation stay readable. The store is read-only once built.
///
/// ```
/// use idmask::{KeyStore, SecretKey};
///
/// let active = SecretKey::generate(1).unwrap();
/// let retired = SecretKey::generate(0).unwrap();
/// let store = KeyStore::with_keys(active, [retired]).unwrap();
///
/// assert_eq!(store.active_key().id(), 1);
/// assert_eq!(store.len(), 2);
/// assert!(store.key(0).is_some());
/// assert!(store.key(9).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct KeyStore {
    keys: HashMap<u8, SecretKey>,
    active_id: u8,
}

impl KeyStore {
    /// A store holding a single active key.
    pub fn new(active: SecretKey) -> Self {
        let active_id = active.id();
        Self {
            keys: HashMap::from([(active_id, active)]),
            active_id,
        }
    }

    /// A store holding the active key plus any number of retired keys.
    ///
    /// Fails with [`IdMaskError::InvalidArgument`] if two keys share an
    /// id.
    pub fn with_keys(
        active: SecretKey,
        keys: impl IntoIterator<Item = SecretKey>,
    ) -> Result<Self, IdMaskError> {
        let mut store = Self::new(active);
        for key in keys {
            if store.keys.insert(key.id(), key).is_some() {
                return Err(IdMaskError::InvalidArgument("duplicate key id in key store"));
            }
        }
        Ok(store)
    }

    /// The key new tokens are minted under.
    ///
    /// # Panics
    ///
    /// If the store was [cleared](KeyStore::clear).
    pub fn active_key(&self) -> &SecretKey {
        self.keys
            .get(&self.active_id)
            .expect("key store used after clear")
    }

    /// Look up a key by the id recovered from a token's version byte.
    pub fn key(&self, id: u8) -> Option<&SecretKey> {
        self.keys.get(&id)
    }

    /// Number of resident keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys (only after [`KeyStore::clear`]).
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop all key material, wiping it from memory.
    ///
    /// An end-of-life action: the store (and any engine built on it) must
    /// not be used afterwards.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: u8, fill: u8) -> SecretKey {
        let bytes: Vec<u8> = (0..16u8).map(|i| i.wrapping_add(fill)).collect();
        SecretKey::new(id, bytes).unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = KeyStore::with_keys(key(2, 0), [key(7, 1), key(2, 2)]).unwrap_err();
        assert_eq!(
            err,
            IdMaskError::InvalidArgument("duplicate key id in key store")
        );
    }

    #[test]
    fn lookup_and_active() {
        let store = KeyStore::with_keys(key(0, 0), [key(1, 1), key(15, 2)]).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.active_key().id(), 0);
        assert_eq!(store.key(15).unwrap().id(), 15);
        assert!(store.key(8).is_none());
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = KeyStore::new(key(4, 9));
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
        assert!(store.key(4).is_none());
    }
}
