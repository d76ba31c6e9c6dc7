#![no_main]

use idmask::{Engine, KeyStore, SecretKey, SixteenByteEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let store = KeyStore::new(
        SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap(),
    );
    let _ = SixteenByteEngine::new(store.clone()).unmask(data);
    let _ = SixteenByteEngine::randomized(store.clone()).unmask(data);
    let _ = SixteenByteEngine::new(store).high_security().unmask(data);
});
