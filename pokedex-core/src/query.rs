//! Query layer over a materialized record collection.
//!
//! Every function here is pure and total: the same collection gives the same
//! answer whether it came from the cache or from the store.

use crate::error::QueryError;
use crate::{PokemonNumber, Record};

/// Parse a leading integer the way a lenient query-string parser does.
///
/// Leading whitespace is skipped, one optional sign is accepted, then the
/// longest run of ASCII digits is taken. Anything after the digits is
/// ignored, so `"12abc"` is `12`. Returns `None` when no digit follows, or
/// when the value does not fit in an `i64`.
pub fn parse_number(raw: &str) -> Option<PokemonNumber> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    if negative {
        format!("-{}", digits).parse().ok()
    } else {
        digits.parse().ok()
    }
}

/// Exact-match lookup by number. Unparseable input is "no match".
pub fn find_by_number<'a>(records: &'a [Record], raw_id: &str) -> Option<&'a Record> {
    let number = parse_number(raw_id)?;
    records.iter().find(|r| r.number == number)
}

/// Index of the first record with the given number.
pub fn position_of(records: &[Record], number: PokemonNumber) -> Option<usize> {
    records.iter().position(|r| r.number == number)
}

/// All records whose `type1` or `type2` equals `type_name`, original order kept.
pub fn filter_by_type(records: &[Record], type_name: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.has_type(type_name))
        .cloned()
        .collect()
}

/// A search request after parameter precedence has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Raw `id` parameter, kept verbatim for the not-found message.
    ById(String),
    ByType(String),
}

impl SearchQuery {
    /// Build a query from the optional `id` and `type` parameters.
    ///
    /// `id` wins over `type`. Empty strings count as absent.
    pub fn from_params(id: Option<&str>, type_name: Option<&str>) -> Result<Self, QueryError> {
        match (id.filter(|s| !s.is_empty()), type_name.filter(|s| !s.is_empty())) {
            (Some(id), _) => Ok(Self::ById(id.to_string())),
            (None, Some(type_name)) => Ok(Self::ByType(type_name.to_string())),
            (None, None) => Err(QueryError::MissingCriteria),
        }
    }
}

/// Successful search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHit {
    Single(Record),
    Many(Vec<Record>),
}

/// Run a search against a collection.
pub fn search(records: &[Record], query: &SearchQuery) -> Result<SearchHit, QueryError> {
    match query {
        SearchQuery::ById(raw_id) => find_by_number(records, raw_id)
            .cloned()
            .map(SearchHit::Single)
            .ok_or_else(|| QueryError::IdNotFound { id: raw_id.clone() }),
        SearchQuery::ByType(type_name) => {
            let matches = filter_by_type(records, type_name);
            if matches.is_empty() {
                Err(QueryError::TypeNotFound {
                    type_name: type_name.clone(),
                })
            } else {
                Ok(SearchHit::Many(matches))
            }
        }
    }
}
