//! Property-Based Tests for the Pokemon routes
//!
//! For any valid insert body, the API SHALL:
//! - accept it with admin credentials
//! - answer a search by its number with the inserted record
//! - show it at the end of the list
//! - remove it again on delete, leaving the collection as it was

use axum::http::{Method, StatusCode};
use pokedex_test_utils::fixtures::*;
use pokedex_test_utils::generators::*;
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[path = "support/http.rs"]
mod http_support;
use http_support::*;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_insert_search_delete_cycle(draft in arb_valid_draft()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let (service, store) = memory_service(Vec::new());
            let app = app(service);
            let number = draft["number"].as_i64().ok_or_else(|| TestCaseError::fail("number"))?;

            let created = send(&app, authed(Method::POST, "/api/pokemon", Some(draft.clone()))).await;
            prop_assert_eq!(created.status, StatusCode::OK);
            prop_assert_eq!(&created.body["newPokemon"], &draft);

            let found = send(&app, get(&format!("/api/pokemon/search?id={}", number))).await;
            prop_assert_eq!(found.status, StatusCode::OK);
            prop_assert_eq!(&found.body, &draft);

            let listed = send(&app, get("/api/pokemon")).await;
            prop_assert_eq!(&listed.body["data"][0], &draft);

            let deleted = send(&app, authed(Method::DELETE, &format!("/api/pokemon/{}", number), None)).await;
            prop_assert_eq!(deleted.status, StatusCode::OK);
            prop_assert!(store.snapshot().await.is_empty());

            let empty = send(&app, get("/api/pokemon")).await;
            prop_assert_eq!(empty.status, StatusCode::NOT_FOUND);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_type_search_returns_exactly_matching_records(
        collection in arb_collection(12),
        type_name in arb_type().prop_filter("non-empty type", |t| !t.is_empty()),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let expected: Vec<_> = collection
                .iter()
                .filter(|r| r.has_type(type_name))
                .cloned()
                .collect();
            let (service, _) = memory_service(collection);
            let app = app(service);

            let response = send(&app, get(&format!("/api/pokemon/search?type={}", type_name))).await;
            if expected.is_empty() {
                prop_assert_eq!(response.status, StatusCode::NOT_FOUND);
            } else {
                prop_assert_eq!(response.status, StatusCode::OK);
                let hits: Vec<pokedex_test_utils::Record> =
                    serde_json::from_value(response.body).map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(hits, expected);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
