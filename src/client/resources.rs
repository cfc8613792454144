//! Typed queries for the list endpoints served by this crate

use super::{ListQuery, ListQueryOptions, QueryClient, QueryError};
use crate::api;
use crate::models::{
    ConfigCenterItem, ConfigCenterPatch, ConfigCenterQuery, PageQuery, PageQueryPatch,
    WelcomeTableItem,
};

pub const CONFIG_CENTER_KEY_PREFIX: &str = "config-center";
pub const WELCOME_TABLE_KEY_PREFIX: &str = "welcome-table";

pub type ConfigCenterListQuery = ListQuery<ConfigCenterQuery, ConfigCenterItem>;
pub type WelcomeTableListQuery = ListQuery<PageQuery, WelcomeTableItem>;

pub fn config_center_options(initial: ConfigCenterPatch) -> ListQueryOptions<ConfigCenterQuery> {
    ListQueryOptions::new(CONFIG_CENTER_KEY_PREFIX, api::config_center::LIST_PATH)
        .initial_params(initial)
}

pub fn welcome_table_options(initial: PageQueryPatch) -> ListQueryOptions<PageQuery> {
    ListQueryOptions::new(WELCOME_TABLE_KEY_PREFIX, api::welcome_table::LIST_PATH)
        .initial_params(initial)
}

/// Configuration-center list starting from `initial` over the defaults
pub fn config_center_query(
    client: &QueryClient,
    initial: ConfigCenterPatch,
) -> Result<ConfigCenterListQuery, QueryError> {
    client.list_query(config_center_options(initial))
}

pub fn welcome_table_query(
    client: &QueryClient,
    initial: PageQueryPatch,
) -> Result<WelcomeTableListQuery, QueryError> {
    client.list_query(welcome_table_options(initial))
}
