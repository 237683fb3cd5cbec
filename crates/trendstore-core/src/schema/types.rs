//! The closed storage-type mapping and default-literal parsing.
//!
//! `StorageType` replaces the original system's runtime type objects with a
//! tagged variant, so every consumer matches exhaustively and unknown tokens
//! are impossible to smuggle past schema building.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::prelude::*;

use crate::record::parse_timestamp;

/// Primitive storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    /// True/false flags (`bit`, `bool`, `boolean`).
    Boolean,
    /// All numeric tokens collapse to one number type (stored as JSON numbers).
    Number,
    /// Free text (`string`, `text`, `utf8`).
    Text,
    /// Absolute timestamps (`date`, `datetime`, `timestamp`).
    Temporal,
}

impl StorageType {
    /// Resolve a textual type token to a storage type.
    ///
    /// Case-insensitive and total: unknown tokens yield `None` (the column
    /// is unresolved), never a panic or an error.
    pub fn resolve(token: &str) -> Option<StorageType> {
        match token.trim().to_ascii_lowercase().as_str() {
            "bit" | "bool" | "boolean" => Some(StorageType::Boolean),
            "byte" | "int16" | "uint16" | "int32" | "uint32" | "int64" | "uint64" | "float"
            | "float32" | "double" | "float64" | "number" => Some(StorageType::Number),
            "string" | "text" | "utf8" => Some(StorageType::Text),
            "date" | "datetime" | "timestamp" => Some(StorageType::Temporal),
            _ => None,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageType::Boolean => "Boolean",
            StorageType::Number => "Number",
            StorageType::Text => "Text",
            StorageType::Temporal => "Temporal",
        };
        f.write_str(name)
    }
}

/// Errors parsing a column's default-value literal.
#[derive(Debug, Snafu)]
pub enum DefaultParseError {
    /// The literal of a Number column is not a parsable number.
    ///
    /// An invalid literal is a failure, never a silent zero.
    #[snafu(display("invalid numeric default literal '{literal}'"))]
    InvalidNumber {
        /// The offending literal.
        literal: String,
        /// Underlying float parse error.
        source: std::num::ParseFloatError,
    },

    /// The literal parses as a float but is not representable as a JSON
    /// number (NaN or infinite).
    #[snafu(display("non-finite numeric default literal '{literal}'"))]
    NonFiniteNumber {
        /// The offending literal.
        literal: String,
    },
}

/// Parse a default-value literal for a column of the given type.
///
/// - Boolean: `"true"` (case-insensitive) and `"1"` are true, anything else
///   is false.
/// - Number: numeric parse; invalid literals surface as errors.
/// - Text: the literal passes through unchanged.
/// - Temporal: no meaningful literal default; always `None` (the value is
///   stamped at write time).
///
/// `None` literals yield `None` for every type. Pure function.
pub fn parse_default(
    storage_type: StorageType,
    literal: Option<&str>,
) -> Result<Option<Value>, DefaultParseError> {
    let Some(literal) = literal else {
        return Ok(None);
    };

    match storage_type {
        StorageType::Boolean => {
            let truthy = literal.eq_ignore_ascii_case("true") || literal == "1";
            Ok(Some(Value::Bool(truthy)))
        }
        StorageType::Number => {
            let parsed: f64 = literal.parse().context(InvalidNumberSnafu { literal })?;
            let number = serde_json::Number::from_f64(parsed)
                .context(NonFiniteNumberSnafu { literal })?;
            Ok(Some(Value::Number(number)))
        }
        StorageType::Text => Ok(Some(Value::String(literal.to_string()))),
        StorageType::Temporal => Ok(None),
    }
}

/// Whether a JSON value conforms to a storage type.
///
/// Temporal values are strings that parse as timestamps (any accepted input
/// form); the other types map directly onto the JSON scalar kinds.
pub fn value_conforms(storage_type: StorageType, value: &Value) -> bool {
    match storage_type {
        StorageType::Boolean => value.is_boolean(),
        StorageType::Number => value.is_number(),
        StorageType::Text => value.is_string(),
        StorageType::Temporal => value
            .as_str()
            .is_some_and(|s| parse_timestamp(s).is_some()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(StorageType::resolve("BIT"), Some(StorageType::Boolean));
        assert_eq!(StorageType::resolve("Int32"), Some(StorageType::Number));
        assert_eq!(StorageType::resolve("STRING"), Some(StorageType::Text));
        assert_eq!(StorageType::resolve("Date"), Some(StorageType::Temporal));
    }

    #[test]
    fn resolve_covers_the_original_token_table() {
        for token in ["bit", "byte", "uint16", "int16", "int32", "uint32", "string", "date"] {
            assert!(StorageType::resolve(token).is_some(), "token {token}");
        }
    }

    #[test]
    fn resolve_is_total_over_unknown_tokens() {
        assert_eq!(StorageType::resolve("varchar"), None);
        assert_eq!(StorageType::resolve(""), None);
        assert_eq!(StorageType::resolve("🦀"), None);
    }

    #[test]
    fn boolean_defaults_parse_one_and_true_as_true() {
        let t = |lit| parse_default(StorageType::Boolean, Some(lit)).unwrap();
        assert_eq!(t("1"), Some(json!(true)));
        assert_eq!(t("true"), Some(json!(true)));
        assert_eq!(t("TRUE"), Some(json!(true)));
        assert_eq!(t("0"), Some(json!(false)));
        assert_eq!(t("yes"), Some(json!(false)));
    }

    #[test]
    fn number_defaults_parse_or_fail_loudly() {
        assert_eq!(
            parse_default(StorageType::Number, Some("42.5")).unwrap(),
            Some(json!(42.5))
        );
        let err = parse_default(StorageType::Number, Some("forty"));
        assert!(matches!(err, Err(DefaultParseError::InvalidNumber { .. })));
        let err = parse_default(StorageType::Number, Some("NaN"));
        assert!(matches!(err, Err(DefaultParseError::NonFiniteNumber { .. })));
    }

    #[test]
    fn text_defaults_pass_through_and_temporal_has_none() {
        assert_eq!(
            parse_default(StorageType::Text, Some("hello")).unwrap(),
            Some(json!("hello"))
        );
        assert_eq!(parse_default(StorageType::Temporal, Some("2024-01-01")).unwrap(), None);
        assert_eq!(parse_default(StorageType::Number, None).unwrap(), None);
    }

    #[test]
    fn conformance_matches_json_scalar_kinds() {
        assert!(value_conforms(StorageType::Boolean, &json!(true)));
        assert!(!value_conforms(StorageType::Boolean, &json!("true")));
        assert!(value_conforms(StorageType::Number, &json!(7)));
        assert!(!value_conforms(StorageType::Number, &json!("7")));
        assert!(value_conforms(StorageType::Text, &json!("AF01")));
        assert!(value_conforms(StorageType::Temporal, &json!("2024-06-01T00:00:00Z")));
        assert!(!value_conforms(StorageType::Temporal, &json!("later")));
    }
}
