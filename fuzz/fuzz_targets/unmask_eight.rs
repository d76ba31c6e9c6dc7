#![no_main]

use idmask::{EightByteEngine, Engine, KeyStore, SecretKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let store = KeyStore::new(
        SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap(),
    );
    let _ = EightByteEngine::new(store.clone()).unmask(data);
    let _ = EightByteEngine::randomized(store).unmask(data);
});
