//! Pokemon REST API Routes
//!
//! Reads go through the cached service path and are public. Mutations write
//! the record store, refresh the cache, and sit behind the basic-auth gate.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use pokedex_core::{
    parse_number, PokedexError, PokemonNumber, Record, RecordDraft, RecordFields, SearchHit,
    SearchQuery, ValidationError,
};
use pokedex_storage::{ListOutcome, PokedexService};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{basic_auth_middleware, AuthMiddlewareState},
    telemetry::metrics::with_metrics,
    types::{DeletedResponse, InsertedResponse, ListEnvelope, SearchParams, UpdatedResponse},
};

/// Response header naming the layer that answered a read (`cache` or `store`).
pub const SOURCE_HEADER: &str = "x-pokedex-source";

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for pokemon routes.
#[derive(Debug, Clone)]
pub struct PokemonState {
    pub service: Arc<PokedexService>,
    /// Answer missing insert fields with 400 instead of 200.
    pub strict_validation: bool,
}

impl PokemonState {
    pub fn new(service: Arc<PokedexService>, strict_validation: bool) -> Self {
        Self {
            service,
            strict_validation,
        }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/pokemon - List every pokemon
#[utoipa::path(
    get,
    path = "/api/pokemon",
    tag = "Pokemon",
    responses(
        (status = 200, description = "Full collection, from the cache when possible", body = ListEnvelope),
        (status = 404, description = "The collection is empty", body = ListEnvelope),
        (status = 500, description = "Record store unreadable", body = ListEnvelope),
    ),
)]
pub async fn list_pokemon(State(state): State<Arc<PokemonState>>) -> Response {
    match state.service.list().await {
        ListOutcome::Found(read) => {
            let source = read.source();
            with_metrics(|m| m.record_collection_read(source));

            let envelope = ListEnvelope::success(
                format!("pokemon list retrieved from {}", source.as_str()),
                read.into_value(),
            );
            (
                StatusCode::OK,
                [(
                    HeaderName::from_static(SOURCE_HEADER),
                    HeaderValue::from_static(source.as_str()),
                )],
                Json(envelope),
            )
                .into_response()
        }
        ListOutcome::Empty => {
            (StatusCode::NOT_FOUND, Json(ListEnvelope::fail("list is empty"))).into_response()
        }
        ListOutcome::Failed(e) => {
            tracing::error!(error = %e, "Failed to retrieve pokemon list");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ListEnvelope::fail("failed to retrieve pokemon list")),
            )
                .into_response()
        }
    }
}

/// GET /api/pokemon/search - Find by number or by type
#[utoipa::path(
    get,
    path = "/api/pokemon/search",
    tag = "Pokemon",
    params(SearchParams),
    responses(
        (status = 200, description = "A single record for `id`, an array of records for `type`", body = Record),
        (status = 400, description = "Neither id nor type given", body = ApiError),
        (status = 404, description = "Nothing matched", body = ApiError),
        (status = 500, description = "Record store unreadable", body = ApiError),
    ),
)]
pub async fn search_pokemon(
    State(state): State<Arc<PokemonState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Response> {
    let query = SearchQuery::from_params(params.id.as_deref(), params.type_name.as_deref())
        .map_err(PokedexError::from)?;

    let read = state
        .service
        .search(&query)
        .await
        .map_err(|e| ApiError::for_operation(e, "failed to search pokemon"))?;

    let source = read.source();
    with_metrics(|m| m.record_collection_read(source));
    let source_header = [(
        HeaderName::from_static(SOURCE_HEADER),
        HeaderValue::from_static(source.as_str()),
    )];

    Ok(match read.into_value() {
        SearchHit::Single(record) => (source_header, Json(record)).into_response(),
        SearchHit::Many(records) => (source_header, Json(records)).into_response(),
    })
}

/// POST /api/pokemon - Insert a new pokemon
#[utoipa::path(
    post,
    path = "/api/pokemon",
    tag = "Pokemon",
    request_body = RecordDraft,
    responses(
        (status = 200, description = "Inserted; a missing field also answers 200 unless strict validation is on", body = InsertedResponse),
        (status = 400, description = "Malformed body, or a missing field under strict validation", body = ApiError),
        (status = 401, description = "Missing or wrong basic credentials", body = ApiError),
        (status = 409, description = "Number already taken", body = ApiError),
        (status = 500, description = "Record store write failed", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn create_pokemon(
    State(state): State<Arc<PokemonState>>,
    body: Bytes,
) -> ApiResult<Json<InsertedResponse>> {
    let draft: RecordDraft = parse_body(&body)?;

    let record = draft
        .into_record()
        .map_err(|e| validation_error(e, state.strict_validation))?;

    let result = state.service.insert(record).await;
    with_metrics(|m| m.record_write("insert", result.is_ok()));

    let inserted = result.map_err(|e| ApiError::for_operation(e, "failed to insert pokemon"))?;
    Ok(Json(InsertedResponse::new(inserted)))
}

/// PUT /api/pokemon/:number - Replace a pokemon's name and types
#[utoipa::path(
    put,
    path = "/api/pokemon/{number}",
    tag = "Pokemon",
    params(
        ("number" = i64, Path, description = "Pokedex number"),
    ),
    request_body = RecordFields,
    responses(
        (status = 200, description = "Updated; absent fields are stored as empty strings", body = UpdatedResponse),
        (status = 400, description = "Malformed body", body = ApiError),
        (status = 401, description = "Missing or wrong basic credentials", body = ApiError),
        (status = 404, description = "No pokemon with this number", body = ApiError),
        (status = 500, description = "Record store write failed", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn update_pokemon(
    State(state): State<Arc<PokemonState>>,
    Path(raw_number): Path<String>,
    body: Bytes,
) -> ApiResult<Json<UpdatedResponse>> {
    let number = path_number(&raw_number)?;
    let fields: RecordFields = parse_body(&body)?;

    let result = state.service.update(number, fields).await;
    with_metrics(|m| m.record_write("update", result.is_ok()));

    let updated = result.map_err(|e| ApiError::for_operation(e, "failed to update pokemon"))?;
    Ok(Json(UpdatedResponse::new(updated)))
}

/// DELETE /api/pokemon/:number - Remove a pokemon
#[utoipa::path(
    delete,
    path = "/api/pokemon/{number}",
    tag = "Pokemon",
    params(
        ("number" = i64, Path, description = "Pokedex number"),
    ),
    responses(
        (status = 200, description = "Deleted", body = DeletedResponse),
        (status = 401, description = "Missing or wrong basic credentials", body = ApiError),
        (status = 404, description = "No pokemon with this number", body = ApiError),
        (status = 500, description = "Record store write failed", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_pokemon(
    State(state): State<Arc<PokemonState>>,
    Path(raw_number): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let number = path_number(&raw_number)?;

    let result = state.service.delete(number).await;
    with_metrics(|m| m.record_write("delete", result.is_ok()));

    let deleted = result.map_err(|e| ApiError::for_operation(e, "failed to delete pokemon"))?;
    Ok(Json(DeletedResponse::new(deleted)))
}

// ============================================================================
// HELPERS
// ============================================================================

/// Deserialize a JSON body. An empty body is the default value.
fn parse_body<T>(body: &Bytes) -> ApiResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// A path number that does not parse cannot name an existing record.
fn path_number(raw: &str) -> ApiResult<PokemonNumber> {
    parse_number(raw).ok_or_else(ApiError::pokemon_not_found)
}

/// Missing insert fields answer 200 unless strict validation is on.
fn validation_error(err: ValidationError, strict: bool) -> ApiError {
    let legacy = matches!(err, ValidationError::MissingFields { .. }) && !strict;
    let api_error = ApiError::from(err);
    if legacy {
        api_error.with_status(StatusCode::OK)
    } else {
        api_error
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the pokemon router. Mutating routes require basic auth.
pub fn create_router(
    service: Arc<PokedexService>,
    strict_validation: bool,
    auth_state: AuthMiddlewareState,
) -> Router {
    let state = Arc::new(PokemonState::new(service, strict_validation));
    let auth = from_fn_with_state(auth_state, basic_auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_pokemon).merge(post(create_pokemon).route_layer(auth.clone())),
        )
        .route("/search", get(search_pokemon))
        .route(
            "/:number",
            put(update_pokemon)
                .delete(delete_pokemon)
                .route_layer(auth),
        )
        .with_state(state)
}
