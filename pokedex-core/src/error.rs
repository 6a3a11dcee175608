//! Error types for Pokedex operations

use crate::PokemonNumber;
use thiserror::Error;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to read record store at {location}: {reason}")]
    Read { location: String, reason: String },

    #[error("Record store at {location} is not a well-formed record list: {reason}")]
    Malformed { location: String, reason: String },

    #[error("Failed to write record store at {location}: {reason}")]
    Write { location: String, reason: String },
}

/// Payload validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of the four insert fields is absent or falsy.
    #[error("please make sure u have number, name, type1, type2. Thanks")]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Remote cache errors.
///
/// These never reach an HTTP client; the cache layer logs them and degrades
/// to the record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed for {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Cache {operation} timed out after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    #[error("Cache command failed: {reason}")]
    Command { reason: String },

    #[error("Cache payload could not be encoded: {reason}")]
    Encode { reason: String },
}

/// Search errors. The display strings are part of the HTTP contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("please enter id or type")]
    MissingCriteria,

    #[error("couldn't find pokemon with id {id}")]
    IdNotFound { id: String },

    #[error("couldn't find pokemon with type {type_name}")]
    TypeNotFound { type_name: String },
}

/// Master error type for all Pokedex errors.
#[derive(Debug, Clone, Error)]
pub enum PokedexError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("pokemon {number} not found")]
    NotFound { number: PokemonNumber },

    #[error("pokemon with number {number} already exists")]
    AlreadyExists { number: PokemonNumber },
}

/// Result type alias for Pokedex operations.
pub type PokedexResult<T> = Result<T, PokedexError>;
