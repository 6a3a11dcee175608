//! End-to-end smoke tests for the Pokedex API router

use axum::http::{Method, StatusCode};
use pokedex_api::ApiConfig;
use pokedex_test_utils::fixtures::*;
use pokedex_test_utils::{PokedexService, Record};
use serde_json::{json, Value};
use std::sync::Arc;

#[path = "support/http.rs"]
mod http_support;
use http_support::*;

fn records(value: &Value) -> Vec<Record> {
    serde_json::from_value(value.clone()).expect("array of records")
}

fn starter_app() -> (axum::Router, Arc<PokedexService>) {
    let (service, _) = memory_service(starter_collection());
    (app(service.clone()), service)
}

// ============================================================================
// LIST
// ============================================================================

#[tokio::test]
async fn smoke_test_list_reads_store_then_cache() {
    let (app, _) = starter_app();

    let first = send(&app, get("/api/pokemon")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["status"], "success");
    assert_eq!(first.body["message"], "pokemon list retrieved from store");
    assert_eq!(first.source(), Some("store"));
    assert_eq!(records(&first.body["data"]), starter_collection());

    let second = send(&app, get("/api/pokemon")).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["message"], "pokemon list retrieved from cache");
    assert_eq!(second.source(), Some("cache"));
    assert_eq!(records(&second.body["data"]), starter_collection());
}

#[tokio::test]
async fn smoke_test_empty_list_is_not_found() {
    let (service, _) = memory_service(Vec::new());
    let app = app(service);

    let response = send(&app, get("/api/pokemon")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({ "status": "fail", "message": "list is empty", "data": [] })
    );
}

// ============================================================================
// SEARCH
// ============================================================================

#[tokio::test]
async fn smoke_test_search_by_id_returns_bare_record() {
    let (app, _) = starter_app();

    let response = send(&app, get("/api/pokemon/search?id=25")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(pikachu()).expect("encode"));
    assert!(response.source().is_some());
}

#[tokio::test]
async fn smoke_test_search_by_type_matches_either_slot() {
    let (app, _) = starter_app();

    let response = send(&app, get("/api/pokemon/search?type=Flying")).await;
    assert_eq!(response.status, StatusCode::OK);
    let hits = records(&response.body);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Pidgey");

    let response = send(&app, get("/api/pokemon/search?type=Grass")).await;
    assert_eq!(records(&response.body), vec![bulbasaur()]);
}

#[tokio::test]
async fn smoke_test_search_id_takes_precedence_over_type() {
    let (app, _) = starter_app();

    let response = send(&app, get("/api/pokemon/search?id=4&type=Electric")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(charmander()).expect("encode"));
}

#[tokio::test]
async fn smoke_test_search_errors() {
    let (app, _) = starter_app();

    let response = send(&app, get("/api/pokemon/search")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "please enter id or type");

    let response = send(&app, get("/api/pokemon/search?id=9999")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "couldn't find pokemon with id 9999");

    let response = send(&app, get("/api/pokemon/search?type=Rockk")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "couldn't find pokemon with type Rockk");

    // Types are case-sensitive.
    let response = send(&app, get("/api/pokemon/search?type=fire")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// MUTATIONS
// ============================================================================

#[tokio::test]
async fn smoke_test_full_crud_chain() {
    let (service, store) = memory_service(starter_collection());
    let app = app(service);

    // Warm the cache so every later read proves the refresh happened.
    send(&app, get("/api/pokemon")).await;

    let created = send(
        &app,
        authed(
            Method::POST,
            "/api/pokemon",
            Some(json!({
                "number": 6969,
                "name": "cliftonTestPokemonWrong",
                "type1": "Flying",
                "type2": "Rock"
            })),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["msg"], "inserted pokemon");
    assert_eq!(
        created.body["newPokemon"],
        serde_json::to_value(test_pokemon()).expect("encode")
    );

    let found = send(&app, get("/api/pokemon/search?id=6969")).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["name"], "cliftonTestPokemonWrong");

    let updated = send(
        &app,
        authed(
            Method::PUT,
            "/api/pokemon/6969",
            Some(json!({ "name": "cliftonTestPokemon", "type2": "Flying" })),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["msg"], "updated pokemon");
    assert_eq!(
        updated.body["updatedPokemon"],
        json!({ "number": 6969, "name": "cliftonTestPokemon", "type1": "", "type2": "Flying" })
    );

    let listed = send(&app, get("/api/pokemon")).await;
    let listed = records(&listed.body["data"]);
    assert_eq!(listed.last(), Some(&Record::new(6969, "cliftonTestPokemon", "", "Flying")));

    let deleted = send(&app, authed(Method::DELETE, "/api/pokemon/6969", None)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["msg"], "deleted pokemon");
    assert_eq!(deleted.body["deletedPokemon"]["number"], 6969);

    let gone = send(&app, get("/api/pokemon/search?id=6969")).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(store.snapshot().await, starter_collection());
}

#[tokio::test]
async fn smoke_test_duplicate_number_conflicts() {
    let (service, store) = memory_service(starter_collection());
    let app = app(service);

    let response = send(
        &app,
        authed(
            Method::POST,
            "/api/pokemon",
            Some(json!({ "number": 25, "name": "Raichu", "type1": "Electric", "type2": "x" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["code"], "ENTITY_ALREADY_EXISTS");
    assert_eq!(store.snapshot().await, starter_collection());
}

#[tokio::test]
async fn smoke_test_missing_fields_legacy_status() {
    let (service, store) = memory_service(vec![bulbasaur()]);
    let app = app(service);

    // Empty type2 is falsy, so this is a missing field.
    let response = send(
        &app,
        authed(
            Method::POST,
            "/api/pokemon",
            Some(json!({ "number": 4, "name": "Charmander", "type1": "Fire", "type2": "" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["error"],
        "please make sure u have number, name, type1, type2. Thanks"
    );
    assert_eq!(response.body["code"], "MISSING_FIELD");
    assert_eq!(store.snapshot().await, vec![bulbasaur()]);
}

#[tokio::test]
async fn smoke_test_missing_fields_strict_status() {
    let (service, store) = memory_service(vec![bulbasaur()]);
    let app = app_with(service, ApiConfig::default().with_strict_validation(true));

    let response = send(&app, authed(Method::POST, "/api/pokemon", None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["details"]["missing"],
        json!(["number", "name", "type1", "type2"])
    );
    assert_eq!(store.snapshot().await, vec![bulbasaur()]);
}

#[tokio::test]
async fn smoke_test_malformed_body_is_bad_request() {
    let (service, _) = memory_service(vec![bulbasaur()]);
    let app = app(service);

    let response = send(&app, authed_raw(Method::POST, "/api/pokemon", "{not json")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn smoke_test_update_and_delete_unknown_number() {
    let (service, store) = memory_service(vec![bulbasaur()]);
    let app = app(service);

    let response = send(
        &app,
        authed(Method::PUT, "/api/pokemon/42", Some(json!({ "name": "Nobody" }))),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "pokemon not found");

    let response = send(&app, authed(Method::DELETE, "/api/pokemon/42", None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, authed(Method::DELETE, "/api/pokemon/bulbasaur", None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(store.snapshot().await, vec![bulbasaur()]);
}

// ============================================================================
// AUTH
// ============================================================================

#[tokio::test]
async fn smoke_test_mutations_require_basic_auth() {
    let (service, store) = memory_service(vec![bulbasaur()]);
    let app = app(service);

    let attempts = [
        anonymous(
            Method::POST,
            "/api/pokemon",
            Some(serde_json::to_value(charmander()).expect("encode")),
        ),
        anonymous(Method::PUT, "/api/pokemon/1", Some(json!({ "name": "x" }))),
        anonymous(Method::DELETE, "/api/pokemon/1", None),
        with_credentials(
            Method::DELETE,
            "/api/pokemon/1",
            None,
            Some(pokedex_api::basic_header_value("admin", "wrong")),
        ),
        with_credentials(
            Method::DELETE,
            "/api/pokemon/1",
            None,
            Some("Bearer abc".to_string()),
        ),
    ];

    for request in attempts {
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["code"], "UNAUTHORIZED");
        let challenge = response.header("www-authenticate").expect("challenge header");
        assert!(challenge.starts_with("Basic realm=\"pokedex\""));
    }

    assert_eq!(store.snapshot().await, vec![bulbasaur()]);
}

#[tokio::test]
async fn smoke_test_reads_are_public() {
    let (app, _) = starter_app();

    assert_eq!(send(&app, get("/api/pokemon")).await.status, StatusCode::OK);
    assert_eq!(
        send(&app, get("/api/pokemon/search?id=1")).await.status,
        StatusCode::OK
    );
}

// ============================================================================
// OPERATIONAL ENDPOINTS
// ============================================================================

#[tokio::test]
async fn smoke_test_health_endpoints() {
    let (app, _) = starter_app();

    let ping = send(&app, get("/health/ping")).await;
    assert_eq!(ping.status, StatusCode::OK);
    assert_eq!(ping.text, "pong");

    let live = send(&app, get("/health/live")).await;
    assert_eq!(live.status, StatusCode::OK);

    let ready = send(&app, get("/health/ready")).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "healthy");
    assert_eq!(ready.body["details"]["store"]["records"], 5);
    assert_eq!(ready.body["details"]["cache"]["mode"], "connected");
}

#[tokio::test]
async fn smoke_test_metrics_after_traffic() {
    let (app, _) = starter_app();
    send(&app, get("/api/pokemon")).await;

    let response = send(&app, get("/metrics")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("pokedex_http_requests_total"));
    assert!(response.text.contains("pokedex_collection_reads_total"));
}

#[tokio::test]
async fn smoke_test_openapi_document_is_served() {
    let (app, _) = starter_app();

    let response = send(&app, get("/openapi.json")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/pokemon"].is_object());
    assert!(response.body["paths"]["/api/pokemon/search"].is_object());
}
