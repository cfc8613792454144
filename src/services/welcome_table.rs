//! Welcome-table service

use std::sync::Arc;

use super::ListServiceError;
use crate::models::{PageQuery, PageResult, WelcomeTableItem};
use crate::repository::ListRepository;

pub struct WelcomeTableService {
    repo: Arc<dyn ListRepository<WelcomeTableItem>>,
}

impl WelcomeTableService {
    pub fn new(repo: Arc<dyn ListRepository<WelcomeTableItem>>) -> Self {
        Self { repo }
    }

    /// Return the requested page of rows; this list has no filters
    pub async fn list(
        &self,
        page: &PageQuery,
    ) -> Result<PageResult<WelcomeTableItem>, ListServiceError> {
        let rows = self.repo.list_all().await?;
        tracing::debug!(rows = rows.len(), page_index = page.page_index, "Listing welcome table");
        Ok(PageResult::paginate(rows, page))
    }
}
