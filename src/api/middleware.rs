//! API middleware and shared types
//!
//! Contains:
//! - `AppState` shared by every handler
//! - `ApiError`, rendered in the same `{ code, message, data }` envelope as
//!   successful responses
//! - CORS and request tracing layers

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{HttpMakeClassifier, TraceLayer},
};

use crate::config::DataConfig;
use crate::models::{ConfigCenterItem, WelcomeTableItem};
use crate::repository::{fixtures, InMemoryRepository};
use crate::services::{ConfigCenterService, WelcomeTableService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config_center: Arc<ConfigCenterService>,
    pub welcome_table: Arc<WelcomeTableService>,
}

impl AppState {
    /// Build state over the given collections
    pub fn with_items(
        config_items: Vec<ConfigCenterItem>,
        welcome_rows: Vec<WelcomeTableItem>,
    ) -> Self {
        Self {
            config_center: Arc::new(ConfigCenterService::new(InMemoryRepository::boxed(
                config_items,
            ))),
            welcome_table: Arc::new(WelcomeTableService::new(InMemoryRepository::boxed(
                welcome_rows,
            ))),
        }
    }

    /// Build state from the embedded fixtures or the configured override files
    pub fn from_config(data: &DataConfig) -> anyhow::Result<Self> {
        let config_items = fixtures::load_config_center(data.config_center.as_deref())?;
        let welcome_rows = fixtures::load_welcome_table(data.welcome_table.as_deref())?;
        tracing::info!(
            config_center = config_items.len(),
            welcome_table = welcome_rows.len(),
            "Mock data loaded"
        );
        Ok(Self::with_items(config_items, welcome_rows))
    }
}

/// Error response, shaped like the success envelope with `data: null`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: i32::from(status.as_u16()),
            message: message.into(),
            data: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = u16::try_from(self.code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// CORS for the admin UI origin
///
/// An origin that is not a valid header value falls back to allowing any
/// origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Request tracing for every route
pub fn trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
}
