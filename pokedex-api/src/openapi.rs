//! OpenAPI Specification for the Pokedex API
//!
//! Generated by utoipa from the handler annotations and schema derives.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, pokemon};
use crate::telemetry::metrics;
use crate::types::*;

use pokedex_core::{Record, RecordDraft, RecordFields};

/// OpenAPI document for the Pokedex API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pokedex API",
        version = "0.1.0",
        description = "Pokemon records over a JSON file store with a Redis read-through cache",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Pokemon", description = "Record listing, search and basic-auth mutations"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        pokemon::list_pokemon,
        pokemon::search_pokemon,
        pokemon::create_pokemon,
        pokemon::update_pokemon,
        pokemon::delete_pokemon,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        Record,
        RecordDraft,
        RecordFields,
        EnvelopeStatus,
        ListEnvelope,
        InsertedResponse,
        UpdatedResponse,
        DeletedResponse,
        ApiError,
        ErrorCode,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Basic)
                        .description(Some("Admin credentials for mutating routes"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate the OpenAPI document as a JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}
