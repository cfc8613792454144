//! List-query client
//!
//! Client side of the list endpoints: an observable parameter store, a
//! cached paginated query bound to it, and the transports the query sends
//! requests through.
//!
//! # Usage
//!
//! ```rust,ignore
//! use admin_lists::client::{resources, QueryClient};
//! use admin_lists::config::Config;
//!
//! let config = Config::default();
//! let client = QueryClient::http(&config.client, &config.query)?;
//! let query = resources::welcome_table_query(&client, Default::default())?;
//! let state = query.settled().await;
//! ```

pub mod query;
pub mod resources;
pub mod store;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{create_cache, MemoryCache};
use crate::config::{ClientConfig, QueryConfig};
use crate::models::QueryParams;

pub use query::{cache_key, ListItem, ListQuery, ListQueryOptions, QueryError, QueryState};
pub use store::{ParamStore, SubscriptionId};
pub use transport::{HttpTransport, ListTransport, RouterTransport, TransportError};

/// Shared transport and result cache for list queries
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn ListTransport>,
    cache: Arc<MemoryCache>,
    stale_time: Duration,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("cache", &self.cache)
            .field("stale_time", &self.stale_time)
            .finish()
    }
}

impl QueryClient {
    pub fn new(transport: Arc<dyn ListTransport>, config: &QueryConfig) -> Self {
        Self {
            transport,
            cache: create_cache(config),
            stale_time: config.stale_time(),
        }
    }

    /// Client talking HTTP to `client.base_url`
    pub fn http(client: &ClientConfig, query: &QueryConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(client)?;
        Ok(Self::new(Arc::new(transport), query))
    }

    /// Create a list query; must be called inside a Tokio runtime
    pub fn list_query<P, T>(
        &self,
        options: ListQueryOptions<P>,
    ) -> Result<ListQuery<P, T>, QueryError>
    where
        P: QueryParams,
        T: ListItem,
    {
        ListQuery::new(
            options,
            Arc::clone(&self.transport),
            Arc::clone(&self.cache),
            self.stale_time,
        )
    }

    /// Drop every cached page under `prefix`
    pub async fn invalidate(&self, prefix: &str) {
        tracing::debug!("Invalidating cached pages for {}", prefix);
        self.cache.delete_prefix(&format!("{}:", prefix)).await;
    }
}
