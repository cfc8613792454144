//! Configuration-center API endpoints
//!
//! - POST /api/dev-team/config-manage/center/list - Paginated, filterable entry list

use axum::{extract::State, routing::post, Json, Router};

use super::extract::ListBody;
use super::middleware::{ApiError, AppState};
use crate::models::{ConfigCenterItem, ConfigCenterQuery, JsonVo, PageResult};

/// Route path of the list endpoint
pub const LIST_PATH: &str = "/api/dev-team/config-manage/center/list";

/// Build the configuration-center router
pub fn router() -> Router<AppState> {
    Router::new().route(LIST_PATH, post(list_config_center))
}

/// POST /api/dev-team/config-manage/center/list
///
/// Always answers code 200 for a well-formed body; pages past the end
/// come back empty with the real total.
async fn list_config_center(
    State(state): State<AppState>,
    ListBody(query): ListBody<ConfigCenterQuery>,
) -> Result<Json<JsonVo<PageResult<ConfigCenterItem>>>, ApiError> {
    let page = state
        .config_center
        .list(&query)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(JsonVo::success(page)))
}
