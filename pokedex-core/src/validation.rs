//! Insert and update payloads.
//!
//! Insert applies a falsy check to all four fields: absent, `null`, `false`,
//! `0`, `NaN` and `""` are all rejected. Update applies no presence check at
//! all; absent fields become empty strings and replace the stored values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::query::parse_number;
use crate::{PokemonNumber, Record};

/// Message returned for an insert with a missing field.
pub const MISSING_FIELDS_MESSAGE: &str =
    "please make sure u have number, name, type1, type2. Thanks";

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Raw insert body, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordDraft {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>))]
    pub number: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub name: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub type1: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub type2: Option<Value>,
}

impl RecordDraft {
    /// Names of fields that fail the presence check, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("number", &self.number),
            ("name", &self.name),
            ("type1", &self.type1),
            ("type2", &self.type2),
        ]
        .into_iter()
        .filter(|(_, value)| !value.as_ref().is_some_and(is_truthy))
        .map(|(field, _)| field)
        .collect()
    }

    /// Validate and convert into a `Record`.
    pub fn into_record(self) -> Result<Record, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let number = self
            .number
            .as_ref()
            .and_then(number_from_value)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "number",
                reason: "must be an integer or a numeric string".to_string(),
            })?;

        Ok(Record {
            number,
            name: string_field("name", self.name)?,
            type1: string_field("type1", self.type1)?,
            type2: string_field("type2", self.type2)?,
        })
    }
}

fn number_from_value(value: &Value) -> Option<PokemonNumber> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn string_field(field: &'static str, value: Option<Value>) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(ValidationError::InvalidValue {
            field,
            reason: "must be a string".to_string(),
        }),
    }
}

/// Update body. The number always comes from the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub type1: Option<String>,
    #[serde(default)]
    pub type2: Option<String>,
}

impl RecordFields {
    /// Build the replacement record. Old values are never merged in.
    pub fn into_record(self, number: PokemonNumber) -> Record {
        Record {
            number,
            name: self.name.unwrap_or_default(),
            type1: self.type1.unwrap_or_default(),
            type2: self.type2.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(body: Value) -> RecordDraft {
        serde_json::from_value(body).expect("draft body should deserialize")
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_complete_draft_becomes_record() {
        let record = draft(json!({
            "number": 6969,
            "name": "cliftonTestPokemonWrong",
            "type1": "Flying",
            "type2": "Rock"
        }))
        .into_record()
        .expect("complete draft is valid");

        assert_eq!(
            record,
            Record::new(6969, "cliftonTestPokemonWrong", "Flying", "Rock")
        );
    }

    #[test]
    fn test_numeric_string_number_is_parsed() {
        let record = draft(json!({
            "number": "152abc",
            "name": "Chikorita",
            "type1": "Grass",
            "type2": "None"
        }))
        .into_record()
        .expect("numeric string is accepted");
        assert_eq!(record.number, 152);
    }

    #[test]
    fn test_falsy_fields_are_missing() {
        let err = draft(json!({
            "number": 0,
            "name": "",
            "type1": "Fire"
        }))
        .into_record()
        .expect_err("falsy fields fail");

        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["number", "name", "type2"]
            }
        );
        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
    }

    #[test]
    fn test_non_numeric_number_is_invalid() {
        let err = draft(json!({
            "number": "abc",
            "name": "Missingno",
            "type1": "Bird",
            "type2": "Normal"
        }))
        .into_record()
        .expect_err("non numeric number fails");
        assert!(matches!(
            err,
            ValidationError::InvalidValue { field: "number", .. }
        ));
    }

    #[test]
    fn test_non_string_name_is_invalid() {
        let err = draft(json!({
            "number": 1,
            "name": 12,
            "type1": "Grass",
            "type2": "Poison"
        }))
        .into_record()
        .expect_err("numeric name fails");
        assert!(matches!(
            err,
            ValidationError::InvalidValue { field: "name", .. }
        ));
    }

    #[test]
    fn test_update_fields_replace_without_merge() {
        let fields = RecordFields {
            name: Some("cliftonTestPokemon".to_string()),
            type1: None,
            type2: Some("Flying".to_string()),
        };
        assert_eq!(
            fields.into_record(6969),
            Record::new(6969, "cliftonTestPokemon", "", "Flying")
        );
    }
}
