//! Post-deserialization checks for response records.

use serde::de::DeserializeOwned;

use crate::error::ValidationError;

/// A response record decoded from a JSON body.
pub trait Record: DeserializeOwned + Validate {
    /// Top-level fields that must be present and non-null.
    const REQUIRED_FIELDS: &'static [&'static str];
}

/// Decode and validate a record from a JSON value.
///
/// Missing required fields are reported as
/// [`ValidationError::MissingField`] rather than as a serde message.
pub fn decode_record<T: Record>(value: serde_json::Value) -> Result<T, ValidationError> {
    if !T::REQUIRED_FIELDS.is_empty() {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::Malformed("expected a JSON object".into()))?;
        for field in T::REQUIRED_FIELDS {
            if object.get(*field).is_none_or(serde_json::Value::is_null) {
                return Err(ValidationError::MissingField((*field).to_string()));
            }
        }
    }
    let record: T =
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    record.validate()?;
    Ok(record)
}

/// A record that can check its own invariants after deserialization.
///
/// Serde guarantees shape; `validate` guarantees meaning (non-empty
/// identifiers, values in range).
pub trait Validate {
    /// Check every invariant of the record.
    fn validate(&self) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

/// Fail with [`ValidationError::InvalidField`] when `value` is blank.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Fail with [`ValidationError::InvalidField`] when `value` is outside `[min, max]`.
pub fn require_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            field,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}
