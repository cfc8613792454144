//! Services layer - List logic
//!
//! Services are responsible for:
//! - Applying resource-specific filters to the full collection
//! - Slicing the requested page out of the filtered result

pub mod config_center;
pub mod filter;
pub mod welcome_table;

pub use config_center::ConfigCenterService;
pub use filter::Filters;
pub use welcome_table::WelcomeTableService;

/// Error types for list service operations
#[derive(Debug, thiserror::Error)]
pub enum ListServiceError {
    /// The backing repository failed
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}
