use std::path::PathBuf;
use std::sync::Arc;

use cardscore::{Artifacts, ServeConfig};

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases/credit")
}

pub fn fixture_config() -> ServeConfig {
    let dir = fixture_dir();
    ServeConfig::builder()
        .model_path(dir.join("credit_card_model.json"))
        .scaler_path(dir.join("scaler.json"))
        .build()
        .expect("fixture paths are non-empty")
}

pub fn fixture_artifacts() -> Arc<Artifacts> {
    Arc::new(Artifacts::load(&fixture_config()).expect("fixture artifacts load"))
}
