//! Derived applicant features.

use ndarray::Array2;

use super::{ENGINEERED_COLUMNS, FeatureMatrix, RawRecord};

/// Engineer the full feature set for `records`, one row per record, with
/// columns in [`ENGINEERED_COLUMNS`] order.
pub fn engineer(records: &[RawRecord]) -> FeatureMatrix {
    let values = records.iter().flat_map(engineer_row).collect();
    let values = Array2::from_shape_vec((records.len(), ENGINEERED_COLUMNS.len()), values)
        .expect("every record yields one value per engineered column");
    FeatureMatrix::new(ENGINEERED_COLUMNS.to_vec(), values)
}

fn engineer_row(record: &RawRecord) -> [f64; ENGINEERED_COLUMNS.len()] {
    let num_children = f64::from(record.num_children);
    let gender = record.gender.indicator();
    let income = record.income;
    let own_car = record.own_car.indicator();
    let own_housing = record.own_housing.indicator();

    let income_per_child = income / (num_children + 1.0);
    let financial_stability = indicator(own_car == 1.0 && own_housing == 1.0);
    let large_family = indicator(record.num_children > 3);
    let total_owned_assets = own_car + own_housing;
    let gender_family_interaction = gender * num_children;
    let income_interaction = income * num_children;
    let income_stability_score = income * (own_housing + own_car);

    [
        num_children,
        gender,
        income,
        own_car,
        own_housing,
        income_per_child,
        financial_stability,
        large_family,
        total_owned_assets,
        gender_family_interaction,
        income_interaction,
        income_stability_score,
    ]
}

#[inline]
fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
