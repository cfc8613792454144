//! Welcome-table API endpoints
//!
//! - POST /api/welcome-table - Paginated metrics rows

use axum::{extract::State, routing::post, Json, Router};

use super::extract::ListBody;
use super::middleware::{ApiError, AppState};
use crate::models::{JsonVo, PageQuery, PageResult, WelcomeTableItem};

/// Route path of the list endpoint
pub const LIST_PATH: &str = "/api/welcome-table";

pub fn router() -> Router<AppState> {
    Router::new().route(LIST_PATH, post(list_welcome_table))
}

async fn list_welcome_table(
    State(state): State<AppState>,
    ListBody(page): ListBody<PageQuery>,
) -> Result<Json<JsonVo<PageResult<WelcomeTableItem>>>, ApiError> {
    let page = state
        .welcome_table
        .list(&page)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(JsonVo::success(page)))
}
