//! Mock data fixtures
//!
//! The default collections are embedded at compile time from `data/*.json`.
//! A configured path replaces the embedded copy with a file read at startup.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::models::{ConfigCenterItem, WelcomeTableItem};

const CONFIG_CENTER_JSON: &str = include_str!("../../data/config-center.json");
const WELCOME_TABLE_JSON: &str = include_str!("../../data/welcome-table.json");

/// Load configuration-center entries, from `path` when given
pub fn load_config_center(path: Option<&Path>) -> Result<Vec<ConfigCenterItem>> {
    load(path, CONFIG_CENTER_JSON, "config-center.json")
}

/// Load welcome-table rows, from `path` when given
pub fn load_welcome_table(path: Option<&Path>) -> Result<Vec<WelcomeTableItem>> {
    load(path, WELCOME_TABLE_JSON, "welcome-table.json")
}

fn load<T: DeserializeOwned>(path: Option<&Path>, embedded: &str, name: &str) -> Result<Vec<T>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fixture '{}'", path.display()))?;
            let items = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse fixture '{}'", path.display()))?;
            tracing::info!("Loaded fixture from {}", path.display());
            Ok(items)
        }
        None => serde_json::from_str(embedded)
            .with_context(|| format!("Embedded fixture '{}' is invalid", name)),
    }
}
