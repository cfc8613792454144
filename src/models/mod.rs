//! Data models
//!
//! This module contains the data structures shared by the server and the client:
//! - The pagination contract (query parameters, page result, response envelope)
//! - Resource records and their query parameter types

mod config_center;
mod pagination;
mod welcome_table;

pub use config_center::{ConfigCenterItem, ConfigCenterPatch, ConfigCenterQuery};
pub use pagination::{
    total_pages, JsonVo, PageQuery, PageQueryPatch, PageResult, QueryParams, CODE_REQUEST_FAILED,
    CODE_SUCCESS, DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE,
};
pub use welcome_table::WelcomeTableItem;
