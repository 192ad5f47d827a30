//! Parsing of `/predict` request bodies into validated records.
//!
//! Each field holds either a scalar or an array; arrays must agree in length
//! and scalars are repeated to match them.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{PredictError, ValidationError};
use crate::features::{Gender, Ownership, RawRecord};

/// Keys every request must carry, in the order they are looked up.
pub const REQUIRED_FIELDS: [&str; 5] = ["Num_Children", "Gender", "Income", "Own_Car", "Own_Housing"];

/// One request field: a single value or one value per record.
#[derive(Debug, Clone, PartialEq)]
enum Column<T> {
    Scalar(T),
    Values(Vec<T>),
}

impl<T: Copy> Column<T> {
    fn len(&self) -> Option<usize> {
        match self {
            Column::Scalar(_) => None,
            Column::Values(values) => Some(values.len()),
        }
    }

    fn get(&self, idx: usize) -> T {
        match self {
            Column::Scalar(value) => *value,
            Column::Values(values) => values[idx],
        }
    }
}

/// Parse a request body into one record per batch entry.
///
/// All keys are checked for presence before any value is inspected, so a
/// missing key is reported even when other fields are malformed.
pub fn parse_records(body: &[u8]) -> Result<Vec<RawRecord>, PredictError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ValidationError::NotAnObject.into());
    };

    if let Some(&missing) = REQUIRED_FIELDS.iter().find(|&&key| !object.contains_key(key)) {
        return Err(PredictError::MissingField(missing));
    }

    let num_children = column(&object, "Num_Children", parse_count)?;
    let gender = column(&object, "Gender", parse_choice::<Gender>)?;
    let income = column(&object, "Income", parse_amount)?;
    let own_car = column(&object, "Own_Car", parse_choice::<Ownership>)?;
    let own_housing = column(&object, "Own_Housing", parse_choice::<Ownership>)?;

    let lengths = [
        ("Num_Children", num_children.len()),
        ("Gender", gender.len()),
        ("Income", income.len()),
        ("Own_Car", own_car.len()),
        ("Own_Housing", own_housing.len()),
    ];
    let n_records = batch_len(&lengths)?;

    Ok((0..n_records)
        .map(|idx| RawRecord {
            num_children: num_children.get(idx),
            gender: gender.get(idx),
            income: income.get(idx),
            own_car: own_car.get(idx),
            own_housing: own_housing.get(idx),
        })
        .collect())
}

/// Common array length, or 1 when every field is a scalar.
fn batch_len(lengths: &[(&'static str, Option<usize>)]) -> Result<usize, ValidationError> {
    let mut expected: Option<usize> = None;
    for &(field, len) in lengths {
        let Some(len) = len else { continue };
        match expected {
            None => expected = Some(len),
            Some(expected) if expected != len => {
                return Err(ValidationError::LengthMismatch {
                    field,
                    len,
                    expected,
                });
            }
            Some(_) => {}
        }
    }

    match expected.unwrap_or(1) {
        0 => Err(ValidationError::EmptyBatch),
        n => Ok(n),
    }
}

fn column<T>(
    object: &Map<String, Value>,
    field: &'static str,
    parse: impl Fn(&Value) -> Result<T, String>,
) -> Result<Column<T>, PredictError> {
    let value = object.get(field).ok_or(PredictError::MissingField(field))?;
    let parse_one =
        |v: &Value| parse(v).map_err(|message| ValidationError::InvalidValue { field, message });

    let column = match value {
        Value::Array(items) => Column::Values(items.iter().map(parse_one).collect::<Result<_, _>>()?),
        scalar => Column::Scalar(parse_one(scalar)?),
    };
    Ok(column)
}

/// Non-negative whole number; `2` and `2.0` are both accepted.
fn parse_count(value: &Value) -> Result<u32, String> {
    let invalid = || format!("expected a non-negative whole number, got {value}");
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| invalid());
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(f as u32),
        _ => Err(invalid()),
    }
}

/// Finite, non-negative number.
fn parse_amount(value: &Value) -> Result<f64, String> {
    let amount = f64::deserialize(value).map_err(|e| e.to_string())?;
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(format!("expected a non-negative number, got {value}"))
    }
}

fn parse_choice<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| e.to_string())
}
