//! Single-field checks. Each returns `Err(reason)` naming the field, so the
//! caller can hand the reason straight back to the client.

use serde_json::Value as JsonValue;

use crate::utils::time::parse_timestamp;

pub type Verdict = std::result::Result<(), String>;

pub fn validate_string(
    value: &JsonValue,
    field_name: &str,
    max_length: usize,
    allow_empty: bool,
) -> Verdict {
    let Some(text) = value.as_str() else {
        return Err(format!("{} must be a string", field_name));
    };
    if !allow_empty && text.trim().is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }
    // Limits are in characters, not bytes.
    if text.chars().count() > max_length {
        return Err(format!(
            "{} exceeds maximum length of {}",
            field_name, max_length
        ));
    }
    Ok(())
}

pub fn validate_integer(value: &JsonValue, field_name: &str, min_value: Option<i64>) -> Verdict {
    let Some(parsed) = parse_integer(value) else {
        return Err(format!("{} must be a valid integer", field_name));
    };
    match min_value {
        Some(min) if parsed < min => Err(format!("{} must be at least {}", field_name, min)),
        _ => Ok(()),
    }
}

pub fn validate_datetime(value: &JsonValue, field_name: &str) -> Verdict {
    match value.as_str().map(parse_timestamp) {
        Some(Some(_)) => Ok(()),
        _ => Err(format!(
            "{} must be in format YYYY-MM-DD HH:MM:SS",
            field_name
        )),
    }
}

/// Accepts JSON integers and base-10 strings (surrounding whitespace allowed).
pub fn parse_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_at_max_length_passes_and_one_more_fails() {
        let at_limit = json!("x".repeat(25));
        let over_limit = json!("x".repeat(26));
        assert!(validate_string(&at_limit, "Euser", 25, false).is_ok());
        assert_eq!(
            validate_string(&over_limit, "Euser", 25, false).unwrap_err(),
            "Euser exceeds maximum length of 25"
        );
    }

    #[test]
    fn length_counts_characters() {
        let value = json!("ééééé");
        assert!(validate_string(&value, "CaseID", 5, false).is_ok());
    }

    #[test]
    fn empty_string_depends_on_policy() {
        let blank = json!("   ");
        assert_eq!(
            validate_string(&blank, "ActionCode", 50, false).unwrap_err(),
            "ActionCode cannot be empty"
        );
        assert!(validate_string(&json!(""), "CaseID", 50, true).is_ok());
    }

    #[test]
    fn non_string_is_rejected() {
        assert_eq!(
            validate_string(&json!(12), "ErrorCode", 50, false).unwrap_err(),
            "ErrorCode must be a string"
        );
        assert!(validate_string(&JsonValue::Null, "CaseID", 50, true).is_err());
    }

    #[test]
    fn integer_accepts_numbers_and_numeric_strings() {
        assert!(validate_integer(&json!(3), "PageNumber", Some(1)).is_ok());
        assert!(validate_integer(&json!(" 20 "), "PageSize", Some(1)).is_ok());
        assert_eq!(parse_integer(&json!("-4")), Some(-4));
    }

    #[test]
    fn integer_below_minimum_or_garbage_fails() {
        assert_eq!(
            validate_integer(&json!("0"), "PageNumber", Some(1)).unwrap_err(),
            "PageNumber must be at least 1"
        );
        assert_eq!(
            validate_integer(&json!("ten"), "PageSize", Some(1)).unwrap_err(),
            "PageSize must be a valid integer"
        );
        assert!(validate_integer(&json!(2.5), "ModuleID", None).is_err());
        assert!(validate_integer(&json!(true), "ModuleID", None).is_err());
    }

    #[test]
    fn datetime_requires_full_timestamp() {
        assert!(validate_datetime(&json!("2024-02-29 23:59:59"), "FromDate").is_ok());
        for bad in [
            "2024-02-29",
            "2024-02-29T23:59:59",
            "2023-02-29 10:00:00",
            "yesterday",
            "2024-01-0500:00:00",
            " 2024-01-05 00:00:00",
            "+2024-01-05 00:00:00",
            "2024-01-05   00:00:00",
            "2024-01-05 00:00:60",
        ] {
            assert_eq!(
                validate_datetime(&json!(bad), "ToDate").unwrap_err(),
                "ToDate must be in format YYYY-MM-DD HH:MM:SS"
            );
        }
    }
}
