//! Cache layer
//!
//! Result cache for the list-query client. Fetched pages are stored under
//! their cache key (`<prefix>:<serialized params>`) and reused while fresh.
//!
//! # Usage
//!
//! ```rust,ignore
//! use admin_lists::cache::create_cache;
//! use admin_lists::config::QueryConfig;
//!
//! let cache = create_cache(&QueryConfig::default());
//! cache.set("key", &"value").await?;
//! ```

pub mod memory;

use std::sync::Arc;

use crate::config::QueryConfig;

pub use memory::MemoryCache;

/// Create a cache sized and timed from configuration
pub fn create_cache(config: &QueryConfig) -> Arc<MemoryCache> {
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_entries,
        config.stale_time(),
    ))
}
