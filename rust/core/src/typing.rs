// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input validation and typed access to dictionary fields.
//!
//! Dictionaries arrive as `serde_json::Value`. A key that is absent or `null`
//! is treated the same way (use the default); a key holding the wrong kind of
//! value is a type error.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Check that a number is finite and not negative.
pub fn float_positive(value: f64, input_name: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidValue {
            name: input_name.to_string(),
            reason: format!("must be greater than or equal to 0. Got {}", value),
        });
    }
    Ok(value)
}

/// Check that a number is finite and inside `[min, max]`.
pub fn float_in_range(value: f64, min: f64, max: f64, input_name: &str) -> Result<f64> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::InvalidValue {
            name: input_name.to_string(),
            reason: format!("must be between {} and {}. Got {}", min, max, value),
        });
    }
    Ok(value)
}

/// Check that an integer is not negative.
pub fn int_positive(value: i64, input_name: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidValue {
        name: input_name.to_string(),
        reason: format!("must be a positive integer. Got {}", value),
    })
}

/// Check that an identifier is usable in a radiance scene.
///
/// Identifiers may only contain ASCII letters, digits, `.`, `_` and `-`,
/// and must be between 1 and 100 characters long.
pub fn valid_rad_string(value: &str, input_name: &str) -> Result<String> {
    let ok_chars = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if value.is_empty() || value.len() > 100 || !ok_chars {
        return Err(Error::InvalidValue {
            name: input_name.to_string(),
            reason: format!("\"{}\" is not a valid radiance identifier", value),
        });
    }
    Ok(value.to_string())
}

/// Short description of a JSON value's kind for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// View a value as a JSON object.
pub fn as_object<'a>(data: &'a Value, expected: &str) -> Result<&'a Map<String, Value>> {
    data.as_object()
        .ok_or_else(|| Error::type_error(expected, value_kind(data)))
}

/// The `type` discriminator of a dictionary.
pub fn type_tag(data: &Value) -> Result<&str> {
    match data.get("type") {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::type_error("string type tag", value_kind(other))),
        None => Err(Error::MissingKey("type")),
    }
}

/// Require the `type` discriminator to equal `expected`.
pub fn check_type(data: &Value, expected: &str) -> Result<()> {
    let tag = type_tag(data)?;
    if tag != expected {
        return Err(Error::format(expected, tag));
    }
    Ok(())
}

/// A present, non-null field.
pub fn field<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

/// A present, non-null field; absence is an error.
pub fn required_field<'a>(data: &'a Value, key: &'static str) -> Result<&'a Value> {
    field(data, key).ok_or(Error::MissingKey(key))
}

pub fn required_str<'a>(data: &'a Value, key: &'static str) -> Result<&'a str> {
    match field(data, key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::type_error(format!("string for {}", key), value_kind(other))),
        None => Err(Error::MissingKey(key)),
    }
}

pub fn optional_str<'a>(data: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match field(data, key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::type_error(format!("string for {}", key), value_kind(other))),
        None => Ok(None),
    }
}

pub fn required_f64(data: &Value, key: &'static str) -> Result<f64> {
    optional_f64(data, key)?.ok_or(Error::MissingKey(key))
}

pub fn optional_f64(data: &Value, key: &str) -> Result<Option<f64>> {
    match field(data, key) {
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::type_error(format!("number for {}", key), value_kind(v))),
        None => Ok(None),
    }
}

pub fn optional_i64(data: &Value, key: &str) -> Result<Option<i64>> {
    match field(data, key) {
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| Error::type_error(format!("integer for {}", key), value_kind(v))),
        None => Ok(None),
    }
}

pub fn optional_bool(data: &Value, key: &str) -> Result<Option<bool>> {
    match field(data, key) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::type_error(format!("boolean for {}", key), value_kind(other))),
        None => Ok(None),
    }
}

pub fn optional_array<'a>(data: &'a Value, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match field(data, key) {
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(Error::type_error(format!("list for {}", key), value_kind(other))),
        None => Ok(None),
    }
}

/// Read a `[x, y, z]` array.
pub fn optional_vector(data: &Value, key: &str) -> Result<Option<[f64; 3]>> {
    match field(data, key) {
        Some(v) => {
            let arr: [f64; 3] = serde_json::from_value(v.clone()).map_err(|_| {
                Error::type_error(format!("[x, y, z] array for {}", key), value_kind(v))
            })?;
            Ok(Some(arr))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positive_and_range_checks() {
        assert_eq!(float_positive(0.0, "x").unwrap(), 0.0);
        assert!(float_positive(-0.1, "x").is_err());
        assert!(float_positive(f64::NAN, "x").is_err());
        assert!(float_in_range(2.0, 0.0, 1.0, "x").is_err());
        assert_eq!(int_positive(8, "n").unwrap(), 8);
        assert!(int_positive(-1, "n").is_err());
    }

    #[test]
    fn radiance_identifiers() {
        assert!(valid_rad_string("Generic_Wall-0.50", "id").is_ok());
        assert!(valid_rad_string("has space", "id").is_err());
        assert!(valid_rad_string("", "id").is_err());
    }

    #[test]
    fn null_counts_as_absent() {
        let data = json!({"type": "Thing", "offset": null, "count": 3});
        assert_eq!(optional_f64(&data, "offset").unwrap(), None);
        assert_eq!(optional_i64(&data, "count").unwrap(), Some(3));
        assert!(matches!(required_f64(&data, "offset"), Err(Error::MissingKey("offset"))));
    }

    #[test]
    fn wrong_kinds_are_type_errors() {
        let data = json!({"type": 3, "flag": "yes"});
        assert!(matches!(type_tag(&data), Err(Error::Type { .. })));
        assert!(matches!(optional_bool(&data, "flag"), Err(Error::Type { .. })));
    }

    #[test]
    fn check_type_reports_both_tags() {
        let data = json!({"type": "StoryRadianceProperties"});
        let err = check_type(&data, "BuildingRadianceProperties").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected BuildingRadianceProperties. Got StoryRadianceProperties."
        );
    }
}
