//! Loading the served artifacts and scoring through them directly.

mod common;

use std::path::Path;

use cardscore::features::{
    FittedScaler, Gender, MODEL_FEATURE_ORDER, Ownership, RawRecord, engineer, scale_and_assemble,
};
use cardscore::{ArtifactError, Artifacts, PredictError, ServeConfig};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(common::fixture_dir().join(name)).unwrap()
}

#[test]
fn loads_fixture_artifacts() {
    let artifacts = common::fixture_artifacts();
    let classifier = artifacts.classifier();

    assert_eq!(classifier.objective(), "binary:logistic");
    assert_eq!(classifier.n_features(), MODEL_FEATURE_ORDER.len());
    assert_eq!(classifier.n_classes(), 2);
    assert_eq!(classifier.forest().n_trees(), 2);
    assert_eq!(artifacts.scaler().n_features_in(), 6);
}

#[test]
fn predicts_one_label_per_record() {
    let artifacts = common::fixture_artifacts();
    let records = [
        RawRecord {
            num_children: 2,
            gender: Gender::Male,
            income: 50000.0,
            own_car: Ownership::Yes,
            own_housing: Ownership::No,
        },
        RawRecord {
            num_children: 0,
            gender: Gender::Female,
            income: 20000.0,
            own_car: Ownership::No,
            own_housing: Ownership::No,
        },
    ];

    assert_eq!(artifacts.predict(&records).unwrap(), vec![1, 0]);
}

#[test]
fn model_input_follows_training_layout() {
    let artifacts = common::fixture_artifacts();
    let record = RawRecord {
        num_children: 1,
        gender: Gender::Female,
        income: 60000.0,
        own_car: Ownership::Yes,
        own_housing: Ownership::Yes,
    };

    let assembled = scale_and_assemble(&engineer(&[record]), artifacts.scaler()).unwrap();
    assert_eq!(assembled.columns(), MODEL_FEATURE_ORDER.as_slice());
    assert!(artifacts.classifier().check_features(assembled.columns()).is_ok());
}

#[test]
fn missing_model_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServeConfig::builder()
        .model_path(dir.path().join("absent.json"))
        .scaler_path(common::fixture_dir().join("scaler.json"))
        .build()
        .unwrap();

    let err = Artifacts::load(&config).unwrap_err();
    assert!(matches!(err, ArtifactError::Model { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn corrupt_scaler_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let scaler = write(dir.path(), "scaler.json", "{\"kind\": \"standard\"");
    let config = ServeConfig::builder()
        .model_path(common::fixture_dir().join("credit_card_model.json"))
        .scaler_path(scaler)
        .build()
        .unwrap();

    let err = Artifacts::load(&config).unwrap_err();
    assert!(matches!(err, ArtifactError::Scaler { .. }));
}

#[test]
fn regression_objective_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let model = fixture("credit_card_model.json").replace("binary:logistic", "reg:squarederror");
    let model = write(dir.path(), "model.json", &model);
    let config = ServeConfig::builder()
        .model_path(model)
        .scaler_path(common::fixture_dir().join("scaler.json"))
        .build()
        .unwrap();

    let err = Artifacts::load(&config).unwrap_err();
    assert!(matches!(err, ArtifactError::Conversion { .. }), "{err}");
}

#[test]
fn scaler_fitted_on_other_columns_fails_each_request() {
    let dir = tempfile::tempdir().unwrap();
    let scaler = fixture("scaler.json").replace("\"Income_per_Child\"", "\"Income_Per_Child\"");
    let scaler = write(dir.path(), "scaler.json", &scaler);
    let artifacts = Artifacts::load(
        &ServeConfig::builder()
            .model_path(common::fixture_dir().join("credit_card_model.json"))
            .scaler_path(scaler)
            .build()
            .unwrap(),
    )
    .unwrap();

    let record = RawRecord {
        num_children: 0,
        gender: Gender::Male,
        income: 1000.0,
        own_car: Ownership::No,
        own_housing: Ownership::No,
    };
    let err = artifacts.predict(&[record]).unwrap_err();
    assert!(matches!(err, PredictError::Preprocess(_)));
    assert!(!err.is_client_error());
}

#[test]
fn fixture_scaler_reads_standard_export() {
    let scaler = FittedScaler::from_file(common::fixture_dir().join("scaler.json")).unwrap();
    assert!(matches!(scaler, FittedScaler::Standard(_)));
    assert_eq!(
        scaler.feature_names_in().unwrap(),
        [
            "Num_Children",
            "Income",
            "Income_per_Child",
            "Total_Owned_Assets",
            "Income_Interaction",
            "Income_Stability_Score",
        ]
    );
}
