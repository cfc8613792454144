//! API layer - HTTP handlers and routing
//!
//! This module contains the HTTP list endpoints:
//! - Configuration-center list (pagination + four filters)
//! - Welcome-table list (pagination only)
//!
//! Every response uses the `{ code, message, data }` envelope.

pub mod config_center;
pub mod extract;
pub mod middleware;
pub mod welcome_table;

use axum::Router;

pub use extract::ListBody;
pub use middleware::{cors_layer, trace_layer, ApiError, AppState};

/// Build the API router (routes only, no middleware)
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(config_center::router())
        .merge(welcome_table::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    build_api_router()
        .fallback(middleware::not_found)
        .layer(cors_layer(cors_origin))
        .layer(trace_layer())
        .with_state(state)
}
