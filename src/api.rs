use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ConfigError;
use crate::error::{AnalyzeError, MSG_IMAGE_TOO_LARGE};
use crate::handlers::AnalyzeHandler;
use crate::models::AnalyzeBody;

/// Transport limit. Larger than the validator's base64 ceiling so the validator reports oversize images.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub analyze_handler: Arc<AnalyzeHandler>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error_response(status, &self.client_message())
    }
}

/// CORS for the browser client: GET and POST from `frontend_url`, or from anywhere when unset.
pub fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let origin = match frontend_url {
        Some(url) => {
            let value = HeaderValue::from_str(url).map_err(|_| ConfigError::Invalid {
                name: "FRONTEND_URL",
                value: url.to_string(),
            })?;
            AllowOrigin::exact(value)
        }
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn create_router(analyze_handler: Arc<AnalyzeHandler>, cors: CorsLayer) -> Router {
    let state = Arc::new(AppState { analyze_handler });

    Router::new()
        .route("/", get(root_handler))
        .route("/api/analyze", post(analyze_food))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn analyze_food(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            log::warn!("⚠️ Unreadable request body: {}", rejection.body_text());
            return if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, MSG_IMAGE_TOO_LARGE)
            } else {
                error_response(StatusCode::BAD_REQUEST, "Invalid JSON body")
            };
        }
    };

    match state.analyze_handler.analyze(body).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            log::info!("↩️ Responding {} to analyze request", e.status());
            e.into_response()
        }
    }
}

async fn root_handler() -> &'static str {
    "Nutrition Analyzer API - POST /api/analyze with an image or a food name"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
