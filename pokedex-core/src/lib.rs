//! Pokedex Core - Record Types
//!
//! Data types shared by every other crate: the `Record` itself, the pure
//! query layer used on materialized collections, insert/update payload
//! validation, and the error taxonomy.
//!
//! Nothing in this crate performs I/O.

use serde::{Deserialize, Serialize};

pub mod error;
pub mod query;
pub mod validation;

pub use error::{
    CacheError, PokedexError, PokedexResult, QueryError, StoreError, ValidationError,
};
pub use query::{
    filter_by_type, find_by_number, parse_number, position_of, search, SearchHit, SearchQuery,
};
pub use validation::{is_truthy, RecordDraft, RecordFields, MISSING_FIELDS_MESSAGE};

/// Identifier of a Pokémon within the collection.
///
/// Not necessarily contiguous. Unique within a collection at any point in time.
pub type PokemonNumber = i64;

/// One Pokémon entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Record {
    pub number: PokemonNumber,
    pub name: String,
    pub type1: String,
    pub type2: String,
}

impl Record {
    pub fn new(
        number: PokemonNumber,
        name: impl Into<String>,
        type1: impl Into<String>,
        type2: impl Into<String>,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            type1: type1.into(),
            type2: type2.into(),
        }
    }

    /// True if either type slot equals `type_name` exactly.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.type1 == type_name || self.type2 == type_name
    }
}

/// Ordered sequence of records, in insertion order of the persistent store.
pub type RecordCollection = Vec<Record>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_flat() -> Result<(), serde_json::Error> {
        let record = Record::new(1, "Bulbasaur", "Grass", "Poison");
        let json = serde_json::to_value(&record)?;
        assert_eq!(
            json,
            serde_json::json!({
                "number": 1,
                "name": "Bulbasaur",
                "type1": "Grass",
                "type2": "Poison"
            })
        );
        Ok(())
    }

    #[test]
    fn test_has_type_is_case_sensitive() {
        let record = Record::new(25, "Pikachu", "Electric", "");
        assert!(record.has_type("Electric"));
        assert!(!record.has_type("electric"));
        assert!(record.has_type(""));
    }
}
