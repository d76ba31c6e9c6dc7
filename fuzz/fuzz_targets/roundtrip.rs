#![no_main]

use idmask::{
    EightByteEngine, Engine, FixedEntropy, KeyStore, SecretKey, SixteenByteEngine,
};
use libfuzzer_sys::fuzz_target;

#[derive(arbitrary::Arbitrary, Debug)]
struct Input {
    id: Vec<u8>,
    entropy: [u8; 16],
    eight: bool,
}

fuzz_target!(|input: Input| {
    let store = KeyStore::new(
        SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap(),
    );

    // unmasking strips the zero padding, and with it any zero suffix
    let mut expected = input.id.clone();
    while expected.last() == Some(&0) {
        expected.pop();
    }

    if input.eight {
        if input.id.is_empty() || input.id.len() > 8 {
            return;
        }
        let entropy = FixedEntropy::new(&input.entropy[..8]);
        let engine = EightByteEngine::with_entropy_source(store, true, entropy);
        let token = engine.mask(&input.id).unwrap();
        assert_eq!(engine.unmask(&token).unwrap(), expected);
    } else {
        if input.id.is_empty() || input.id.len() > 16 {
            return;
        }
        let entropy = FixedEntropy::new(input.entropy);
        let engine = SixteenByteEngine::with_entropy_source(store, true, entropy);
        let token = engine.mask(&input.id).unwrap();
        assert_eq!(engine.unmask(&token).unwrap(), expected);
    }
});
