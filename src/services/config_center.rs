//! Configuration-center service
//!
//! Filters the configuration entries by the optional query filters and
//! returns the requested page. Exact-match filters (type, status) run
//! before substring filters (name, key).

use std::sync::Arc;
use tracing::debug;

use super::filter::Filters;
use super::ListServiceError;
use crate::models::{ConfigCenterItem, ConfigCenterQuery, PageResult};
use crate::repository::ListRepository;

pub struct ConfigCenterService {
    repo: Arc<dyn ListRepository<ConfigCenterItem>>,
}

impl ConfigCenterService {
    pub fn new(repo: Arc<dyn ListRepository<ConfigCenterItem>>) -> Self {
        Self { repo }
    }

    /// Return one page of entries matching every supplied filter
    ///
    /// Out-of-range pages are not an error: they yield an empty list
    /// with the real `total`.
    pub async fn list(
        &self,
        query: &ConfigCenterQuery,
    ) -> Result<PageResult<ConfigCenterItem>, ListServiceError> {
        let items = self.repo.list_all().await?;
        let filters = Self::filters(query);
        let matched = filters.apply(items);

        debug!(
            filters = filters.len(),
            matched = matched.len(),
            page_index = query.page.page_index,
            page_size = query.page.page_size,
            "Listing configuration entries"
        );

        Ok(PageResult::paginate(matched, &query.page))
    }

    fn filters(query: &ConfigCenterQuery) -> Filters<ConfigCenterItem> {
        Filters::<ConfigCenterItem>::new()
            .exact(query.config_type.as_deref(), |i| i.config_type.as_str())
            .exact(query.status.as_deref(), |i| i.status.as_str())
            .contains(query.config_name.as_deref(), |i| i.config_name.as_str())
            .contains(query.config_key.as_deref(), |i| i.config_key.as_str())
    }
}
