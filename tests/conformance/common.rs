use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FORMLOGIC_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Reads a YAML case suite from the fixtures directory.
pub fn load_cases<T: serde::de::DeserializeOwned>(name: &str) -> Vec<T> {
    let path = fixtures_dir().join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {:?}: {}", path, e));
    serde_saphyr::from_str(&content).unwrap_or_else(|e| panic!("cannot parse {:?}: {}", path, e))
}
