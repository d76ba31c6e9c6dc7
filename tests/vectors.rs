use idmask::{
    EightByteEngine, Engine, FixedEntropy, KeyStore, SecretKey, SixteenByteEngine,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct TestFile {
    key: String,
    tests: Vec<Test>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Test {
    name: String,
    engine: String,
    id: String,
    token: String,
    entropy: Option<String>,
    #[serde(default)]
    key_id: u8,
    #[serde(default)]
    high_security: bool,
}

impl Test {
    fn engine(&self, key_hex: &str) -> Box<dyn Engine> {
        let key = SecretKey::from_hex(self.key_id, key_hex).unwrap();
        let store = KeyStore::new(key);
        let entropy = self
            .entropy
            .as_deref()
            .map(|e| FixedEntropy::new(hex::decode(e).unwrap()));

        match (self.engine.as_str(), entropy) {
            ("eight", None) => Box::new(EightByteEngine::new(store)),
            ("eight", Some(entropy)) => {
                Box::new(EightByteEngine::with_entropy_source(store, true, entropy))
            }
            ("sixteen", entropy) => {
                let randomize = entropy.is_some();
                let engine = SixteenByteEngine::with_entropy_source(
                    store,
                    randomize,
                    entropy.unwrap_or_else(|| FixedEntropy::new(vec![])),
                );
                if self.high_security {
                    Box::new(engine.high_security())
                } else {
                    Box::new(engine)
                }
            }
            (other, _) => panic!("unknown engine {other}"),
        }
    }
}

#[test]
fn reference_vectors() {
    let test_file: TestFile =
        serde_json::from_str(include_str!("test-vectors/idmask.json")).unwrap();

    for test in &test_file.tests {
        let engine = test.engine(&test_file.key);
        let id = hex::decode(&test.id).unwrap();

        assert_eq!(
            engine.mask(&id).unwrap(),
            test.token,
            "{}: mask failed",
            test.name
        );
        assert_eq!(
            engine.unmask(&test.token).unwrap(),
            id,
            "{}: unmask failed",
            test.name
        );
    }
}
