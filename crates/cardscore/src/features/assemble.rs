//! Continuous-block scaling and reassembly into model order.

use super::{BINARY_FEATURES, FeatureMatrix, FittedScaler, MODEL_FEATURE_ORDER, PreprocessError};

/// Scale the continuous columns of `engineered`, pass the binary columns
/// through, and return the result in [`MODEL_FEATURE_ORDER`].
///
/// The continuous block keeps the relative order it has in `engineered`,
/// which is the order the scaler was fitted on.
pub fn scale_and_assemble(
    engineered: &FeatureMatrix,
    scaler: &FittedScaler,
) -> Result<FeatureMatrix, PreprocessError> {
    let binary = engineered.select(&BINARY_FEATURES)?;
    let continuous = engineered.without(&BINARY_FEATURES);

    let scaled = scaler.transform(continuous.columns(), continuous.values())?;
    let scaled = FeatureMatrix::new(continuous.columns().to_vec(), scaled);

    scaled.hstack(&binary)?.select(&MODEL_FEATURE_ORDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Gender, Ownership, RawRecord, ScalerError, engineer};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use serde_json::json;

    const CONTINUOUS: [&str; 6] = [
        "Num_Children",
        "Income",
        "Income_per_Child",
        "Total_Owned_Assets",
        "Income_Interaction",
        "Income_Stability_Score",
    ];

    fn scaler() -> FittedScaler {
        serde_json::from_value(json!({
            "kind": "standard",
            "mean_": [1.0, 40000.0, 20000.0, 1.0, 50000.0, 40000.0],
            "scale_": [1.0, 20000.0, 10000.0, 0.5, 50000.0, 40000.0],
            "n_features_in_": 6,
            "feature_names_in_": CONTINUOUS
        }))
        .unwrap()
    }

    fn reference_applicant() -> RawRecord {
        RawRecord {
            num_children: 2,
            gender: Gender::Male,
            income: 50_000.0,
            own_car: Ownership::Yes,
            own_housing: Ownership::No,
        }
    }

    #[test]
    fn golden_vector_in_model_order() {
        let assembled = scale_and_assemble(&engineer(&[reference_applicant()]), &scaler()).unwrap();

        assert_eq!(assembled.columns(), &MODEL_FEATURE_ORDER);
        let expected = array![[
            1.0, 0.5, -1.0 / 3.0, 0.0, 1.0, 0.25, // scaled
            1.0, 0.0, 1.0, 0.0, 0.0, 2.0, // binary
        ]];
        assert_abs_diff_eq!(assembled.values(), expected.view(), epsilon = 1e-9);
    }

    #[test]
    fn binary_columns_are_not_scaled() {
        let engineered = engineer(&[reference_applicant()]);
        let assembled = scale_and_assemble(&engineered, &scaler()).unwrap();
        for name in BINARY_FEATURES {
            assert_eq!(assembled.column(name), engineered.column(name));
        }
    }

    #[test]
    fn scaler_fitted_on_other_columns_fails() {
        let mut names = CONTINUOUS.to_vec();
        names.swap(0, 1);
        let scaler: FittedScaler = serde_json::from_value(json!({
            "kind": "standard",
            "mean_": vec![0.0; 6],
            "scale_": vec![1.0; 6],
            "n_features_in_": 6,
            "feature_names_in_": names
        }))
        .unwrap();

        let err = scale_and_assemble(&engineer(&[reference_applicant()]), &scaler).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::Scaling(ScalerError::FeatureNamesMismatch { .. })
        ));
    }

    #[test]
    fn scaler_with_wrong_width_fails() {
        let scaler: FittedScaler = serde_json::from_value(json!({
            "kind": "standard",
            "mean_": vec![0.0; 5],
            "scale_": vec![1.0; 5],
            "n_features_in_": 5
        }))
        .unwrap();

        let err = scale_and_assemble(&engineer(&[reference_applicant()]), &scaler).unwrap_err();
        assert_eq!(
            err,
            PreprocessError::Scaling(ScalerError::FeatureCountMismatch { expected: 5, actual: 6 })
        );
    }
}
