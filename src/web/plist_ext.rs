//! Small typed-accessor helpers over `plist::Dictionary`.
//!
//! The property-list codec itself is out of scope (spec.md SS1): this
//! module only adapts its typed accessors (`as_string`, `as_real`, ...) into
//! `Result<_, AppError>` so handlers don't each hand-roll the same
//! "missing or wrong type" error.

use plist::{Dictionary, Value};

use crate::errors::AppError;

pub fn as_dict(value: &Value) -> Result<&Dictionary, AppError> {
    value
        .as_dictionary()
        .ok_or_else(|| AppError::validation("expected a plist dictionary"))
}

pub fn string(dict: &Dictionary, key: &str) -> Result<String, AppError> {
    dict.get(key)
        .and_then(Value::as_string)
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("missing or non-string field {key:?}")))
}

pub fn optional_string(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::as_string).map(str::to_string)
}

pub fn optional_real(dict: &Dictionary, key: &str) -> Option<f32> {
    dict.get(key).and_then(Value::as_real).map(|v| v as f32)
}

pub fn dict_field<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a Dictionary, AppError> {
    dict.get(key)
        .and_then(Value::as_dictionary)
        .ok_or_else(|| AppError::validation(format!("missing or non-dictionary field {key:?}")))
}

pub fn data(dict: &Dictionary, key: &str) -> Result<Vec<u8>, AppError> {
    dict.get(key)
        .and_then(Value::as_data)
        .map(|bytes| bytes.to_vec())
        .ok_or_else(|| AppError::validation(format!("missing or non-data field {key:?}")))
}

pub fn optional_uint(dict: &Dictionary, key: &str) -> Option<u64> {
    dict.get(key).and_then(Value::as_unsigned_integer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_with(key: &str, value: Value) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert(key.to_string(), value);
        dict
    }

    #[test]
    fn string_reads_back_plain_strings() {
        let dict = dict_with("uuid", Value::String("abc".to_string()));
        assert_eq!(string(&dict, "uuid").unwrap(), "abc");
    }

    #[test]
    fn string_rejects_missing_or_wrong_type() {
        let dict = dict_with("uuid", Value::Integer(1.into()));
        assert!(string(&dict, "uuid").is_err());
        assert!(string(&dict, "missing").is_err());
    }

    #[test]
    fn optional_real_reads_floats() {
        let dict = dict_with("Start-Position-Seconds", Value::Real(12.5));
        assert_eq!(optional_real(&dict, "Start-Position-Seconds"), Some(12.5));
        assert_eq!(optional_real(&dict, "missing"), None);
    }
}
