//! The compare-and-swap step every backend runs while it holds a document.
//!
//! A backend looks the document up, calls [`apply`] (or [`matches_version`]
//! for deletes) and writes the result back, all under its per-document
//! atomicity. Reading the version is part of the same step as the mutation,
//! so there is no window between check and write.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use super::{CasOutcome, Mutation};
use crate::document::{Version, UPDATED_AT_FIELD, VERSION_FIELD};

/// Version token stored in `body`, if it has a readable one.
pub fn stored_version(body: &Value) -> Option<Version> {
    body.get(VERSION_FIELD)?.as_str()?.parse().ok()
}

/// True when the stored version equals `expected`.
pub fn matches_version(body: &Value, expected: Version) -> bool {
    stored_version(body) == Some(expected)
}

/// Runs `mutation` against the stored `current` body.
///
/// Never returns `NotFound`; the caller handles absence before getting here.
pub fn apply(current: &Value, expected: Version, mutation: &Mutation) -> CasOutcome {
    if !matches_version(current, expected) {
        return CasOutcome::VersionMismatch;
    }

    match mutation {
        Mutation::Replace(body) => CasOutcome::Applied(body.clone()),
        Mutation::Increment {
            field,
            amount,
            version,
            updated_at,
        } => match increment(current, field, *amount, *version, *updated_at) {
            Ok(body) => CasOutcome::Applied(body),
            Err(reason) => CasOutcome::Rejected(reason),
        },
    }
}

fn increment(
    current: &Value,
    field: &str,
    amount: f64,
    version: Version,
    updated_at: DateTime<Utc>,
) -> Result<Value, String> {
    let mut body = current.clone();
    let object = body
        .as_object_mut()
        .ok_or_else(|| "stored document is not an object".to_string())?;

    let value = object
        .get(field)
        .ok_or_else(|| format!("field `{}` does not exist", field))?;
    let next = add(value, amount).map_err(|reason| format!("field `{}`: {}", field, reason))?;
    let stamp = serde_json::to_value(updated_at).map_err(|e| e.to_string())?;

    object.insert(field.to_string(), next);
    object.insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));
    object.insert(UPDATED_AT_FIELD.to_string(), stamp);
    Ok(body)
}

/// Adds `amount` to a JSON number.
///
/// An integer stays an integer: the amount must be integral and the sum must
/// fit in `i64` or `u64`. Only a float is summed in `f64`.
fn add(value: &Value, amount: f64) -> Result<Value, String> {
    if !amount.is_finite() {
        return Err("increment amount is not finite".to_string());
    }
    let Value::Number(number) = value else {
        return Err("value is not numeric".to_string());
    };

    let integer = number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from));
    if let Some(current) = integer {
        if amount.fract() != 0.0 {
            return Err("fractional amount on integer field".to_string());
        }
        // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
        if amount < i64::MIN as f64 || amount >= i64::MAX as f64 {
            return Err("integer overflow".to_string());
        }
        let sum = current + amount as i128;
        if let Ok(sum) = i64::try_from(sum) {
            return Ok(Value::from(sum));
        }
        if let Ok(sum) = u64::try_from(sum) {
            return Ok(Value::from(sum));
        }
        return Err("integer overflow".to_string());
    }

    let current = number
        .as_f64()
        .ok_or_else(|| "value is not numeric".to_string())?;
    Number::from_f64(current + amount)
        .map(Value::Number)
        .ok_or_else(|| "result is not finite".to_string())
}
