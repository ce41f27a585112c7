//! HTTP gateway (Axum) for profile scoring.
//!
//! This module is primarily used by the `leadscore` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::predict_handler;
pub use payload::{PredictRequest, PredictResponse};
pub use state::AppState;

use crate::constants::{LEADSCORE_STATUS_HEADER, LEADSCORE_STATUS_HEALTHY, LEADSCORE_STATUS_READY};
use crate::embedding::device::device_label;

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route(
            "/healthz",
            get(health_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/ready",
            get(ready_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/predict",
            post(predict_handler).fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Same routes as [`create_router_with_state`], reachable from any origin.
pub fn create_router_with_cors(state: AppState) -> Router {
    create_router_with_state(state).layer(CorsLayer::permissive())
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub encoder: &'static str,
    pub encoder_mode: &'static str,
    pub device: &'static str,
    pub hidden_size: usize,
    pub booster: &'static str,
    pub num_trees: usize,
    pub objective: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        LEADSCORE_STATUS_HEADER,
        HeaderValue::from_static(LEADSCORE_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Both models are loaded before the router exists, so readiness only reports them.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let encoder = state.scorer.encoder();
    let booster = state.scorer.booster();

    let components = ComponentStatus {
        http: LEADSCORE_STATUS_READY,
        encoder: LEADSCORE_STATUS_READY,
        encoder_mode: if encoder.is_stub() { "stub" } else { "real" },
        device: device_label(encoder.device()),
        hidden_size: encoder.hidden_size(),
        booster: LEADSCORE_STATUS_READY,
        num_trees: booster.num_trees(),
        objective: booster.objective().name().to_string(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        LEADSCORE_STATUS_HEADER,
        HeaderValue::from_static(LEADSCORE_STATUS_READY),
    );

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok",
            components,
        }),
    )
        .into_response()
}

pub async fn not_found_handler(uri: Uri) -> GatewayError {
    GatewayError::NotFound(uri.path().to_string())
}

pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> GatewayError {
    GatewayError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
