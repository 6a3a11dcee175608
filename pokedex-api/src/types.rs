//! API Request and Response Types
//!
//! Response bodies keep the field names existing clients read
//! (`newPokemon`, `updatedPokemon`, `deletedPokemon`, `msg`).

use pokedex_core::{Record, RecordCollection};
use serde::{Deserialize, Serialize};

// ============================================================================
// LIST
// ============================================================================

/// Outcome flag of the list envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Fail,
}

/// Envelope returned by `GET /api/pokemon`, on success and on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListEnvelope {
    pub status: EnvelopeStatus,
    pub message: String,
    pub data: RecordCollection,
}

impl ListEnvelope {
    pub fn success(message: impl Into<String>, data: RecordCollection) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Fail,
            message: message.into(),
            data: Vec::new(),
        }
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Query parameters of `GET /api/pokemon/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct SearchParams {
    /// Pokedex number; wins over `type` when both are given
    pub id: Option<String>,
    /// Exact, case-sensitive type name
    #[serde(rename = "type")]
    #[cfg_attr(feature = "openapi", param(rename = "type"))]
    pub type_name: Option<String>,
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// Response to a successful insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InsertedResponse {
    pub msg: String,
    #[serde(rename = "newPokemon")]
    pub new_pokemon: Record,
}

/// Response to a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatedResponse {
    pub msg: String,
    #[serde(rename = "updatedPokemon")]
    pub updated_pokemon: Record,
}

/// Response to a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeletedResponse {
    pub msg: String,
    #[serde(rename = "deletedPokemon")]
    pub deleted_pokemon: Record,
}

impl InsertedResponse {
    pub fn new(record: Record) -> Self {
        Self {
            msg: "inserted pokemon".to_string(),
            new_pokemon: record,
        }
    }
}

impl UpdatedResponse {
    pub fn new(record: Record) -> Self {
        Self {
            msg: "updated pokemon".to_string(),
            updated_pokemon: record,
        }
    }
}

impl DeletedResponse {
    pub fn new(record: Record) -> Self {
        Self {
            msg: "deleted pokemon".to_string(),
            deleted_pokemon: record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fail_envelope_has_empty_data() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(ListEnvelope::fail("list is empty"))?;
        assert_eq!(
            json,
            json!({ "status": "fail", "message": "list is empty", "data": [] })
        );
        Ok(())
    }

    #[test]
    fn test_mutation_responses_use_client_field_names() -> Result<(), serde_json::Error> {
        let record = Record::new(6969, "cliftonTestPokemonWrong", "Flying", "Rock");

        let inserted = serde_json::to_value(InsertedResponse::new(record.clone()))?;
        assert_eq!(inserted["msg"], "inserted pokemon");
        assert_eq!(inserted["newPokemon"]["number"], 6969);

        let updated = serde_json::to_value(UpdatedResponse::new(record.clone()))?;
        assert_eq!(updated["updatedPokemon"]["name"], "cliftonTestPokemonWrong");

        let deleted = serde_json::to_value(DeletedResponse::new(record))?;
        assert_eq!(deleted["msg"], "deleted pokemon");
        assert_eq!(deleted["deletedPokemon"]["type2"], "Rock");
        Ok(())
    }

    #[test]
    fn test_search_params_read_type_key() -> Result<(), serde_json::Error> {
        let params: SearchParams = serde_json::from_value(json!({ "type": "Rock" }))?;
        assert_eq!(params.type_name.as_deref(), Some("Rock"));
        assert_eq!(params.id, None);
        Ok(())
    }
}
