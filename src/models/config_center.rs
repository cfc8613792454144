//! Configuration-center model
//!
//! Records served by the configuration-center list endpoint and the
//! query parameters (pagination plus four optional filters) it accepts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::pagination::{PageQuery, QueryParams};

/// Configuration entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCenterItem {
    pub config_id: String,
    pub config_name: String,
    pub config_type: String,
    pub config_key: String,
    pub config_value: String,
    pub default_value: String,
    pub config_description: String,
    /// "enabled" or "disabled"
    pub status: String,
    pub sort_order: i32,
    pub remark: String,
    #[serde(with = "datetime_format")]
    pub create_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    pub update_time: NaiveDateTime,
    pub creator: String,
    pub updater: String,
}

/// Query parameters for the configuration-center list
///
/// `config_type` and `status` match exactly; `config_name` and
/// `config_key` match by case-sensitive substring. Unset or empty
/// filters are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCenterQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_key: Option<String>,
}

/// Partial update for [`ConfigCenterQuery`]
///
/// `Some("")` on a filter clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigCenterPatch {
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
    pub config_name: Option<String>,
    pub config_type: Option<String>,
    pub status: Option<String>,
    pub config_key: Option<String>,
}

fn merge_filter(current: &Option<String>, patch: Option<String>) -> Option<String> {
    match patch {
        Some(value) if value.is_empty() => None,
        Some(value) => Some(value),
        None => current.clone(),
    }
}

impl QueryParams for ConfigCenterQuery {
    type Patch = ConfigCenterPatch;

    fn page(&self) -> PageQuery {
        self.page
    }

    fn with_page(&self, page: PageQuery) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    fn merged(&self, patch: ConfigCenterPatch) -> Self {
        Self {
            page: PageQuery::new(
                patch.page_index.unwrap_or(self.page.page_index),
                patch.page_size.unwrap_or(self.page.page_size),
            ),
            config_name: merge_filter(&self.config_name, patch.config_name),
            config_type: merge_filter(&self.config_type, patch.config_type),
            status: merge_filter(&self.status, patch.status),
            config_key: merge_filter(&self.config_key, patch.config_key),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` timestamps used by the admin UI
mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
