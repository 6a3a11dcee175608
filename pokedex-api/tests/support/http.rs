#![allow(dead_code)]
//! Router-level request helpers shared by the API integration tests.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use pokedex_api::{basic_header_value, create_api_router, ApiConfig, AuthConfig};
use pokedex_test_utils::PokedexService;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

/// Full router with development settings.
pub fn app(service: Arc<PokedexService>) -> Router {
    app_with(service, ApiConfig::default())
}

pub fn app_with(service: Arc<PokedexService>, config: ApiConfig) -> Router {
    create_api_router(service, &config, AuthConfig::new(ADMIN_USER, ADMIN_PASSWORD))
        .expect("development configuration is accepted")
}

/// Buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    /// Value of the `x-pokedex-source` header.
    pub fn source(&self) -> Option<&str> {
        self.headers
            .get("x-pokedex-source")
            .and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router service is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body is readable");
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
        text,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Request carrying the admin credentials.
pub fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    with_credentials(method, uri, body, Some(basic_header_value(ADMIN_USER, ADMIN_PASSWORD)))
}

/// Request without an `Authorization` header.
pub fn anonymous(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    with_credentials(method, uri, body, None)
}

pub fn with_credentials(
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorization: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

/// Raw body, sent as JSON regardless of content.
pub fn authed_raw(method: Method, uri: &str, raw: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_header_value(ADMIN_USER, ADMIN_PASSWORD))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .expect("valid request")
}
