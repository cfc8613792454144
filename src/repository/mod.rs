//! Repositories
//!
//! Read access to the list collections served by the API.
//!
//! This module provides:
//! - `ListRepository` trait, the seam where a real datastore would plug in
//! - `InMemoryRepository` backed by a read-only collection
//! - `fixtures` for loading the default mock collections

pub mod fixtures;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::InMemoryRepository;

/// Read-only list repository
#[async_trait]
pub trait ListRepository<T>: Send + Sync {
    /// Return the full collection in its stored order
    async fn list_all(&self) -> Result<Vec<T>>;
}
