use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::constants::{LEADSCORE_STATUS_HEADER, LEADSCORE_STATUS_SCORED};
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{PredictRequest, PredictResponse};
use crate::gateway::state::AppState;

/// `POST /predict`: scores one profile text.
///
/// The body is taken as raw JSON so malformed bodies and wrong field types surface as
/// structured `400` errors instead of axum's plain-text rejections.
#[instrument(skip(state, payload), fields(text_len = tracing::field::Empty))]
pub async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) =
        payload.map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))?;
    let request = parse_predict_request(&body)?;
    tracing::Span::current().record("text_len", request.profile_text.len());

    debug!("Scoring profile");

    let scorer = Arc::clone(&state.scorer);
    let score = tokio::task::spawn_blocking(move || scorer.score(&request.profile_text))
        .await
        .map_err(|e| {
            error!(error = %e, "Scoring task panicked or was cancelled");
            GatewayError::InternalError(format!("Scoring task failed: {}", e))
        })?
        .map_err(|e| {
            error!(error = %e, "Scoring failed");
            GatewayError::ScoringFailed(e)
        })?;

    debug!(score, "Profile scored");

    Ok(make_response(PredictResponse { score }))
}

/// Extracts `profile_text` from a decoded body. Unknown fields are ignored.
pub(crate) fn parse_predict_request(body: &Value) -> Result<PredictRequest, GatewayError> {
    let object = body.as_object().ok_or_else(|| {
        GatewayError::InvalidRequest("Request body must be a JSON object".to_string())
    })?;

    match object.get("profile_text") {
        Some(Value::String(text)) => Ok(PredictRequest {
            profile_text: text.clone(),
        }),
        Some(Value::Null) | None => Err(GatewayError::InvalidRequest(
            "Missing `profile_text`".to_string(),
        )),
        Some(_) => Err(GatewayError::InvalidRequest(
            "`profile_text` must be a string".to_string(),
        )),
    }
}

fn make_response(body: PredictResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        LEADSCORE_STATUS_HEADER,
        HeaderValue::from_static(LEADSCORE_STATUS_SCORED),
    );

    (StatusCode::OK, headers, Json(body)).into_response()
}
