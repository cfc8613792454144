//! In-memory repository
//!
//! Holds a collection loaded once at startup. The data is never mutated
//! after construction, so concurrent requests share it without locking.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::ListRepository;

/// Repository over a fixed in-memory collection
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    items: Arc<[T]>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> InMemoryRepository<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(items: Vec<T>) -> Arc<dyn ListRepository<T>> {
        Arc::new(Self::new(items))
    }
}

#[async_trait]
impl<T> ListRepository<T> for InMemoryRepository<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn list_all(&self) -> Result<Vec<T>> {
        Ok(self.items.to_vec())
    }
}
