//! Pagination contract
//!
//! Shared request and response shapes for every list endpoint:
//! - `PageQuery`: 1-based page index and page size sent by the client
//! - `PageResult`: one page of items plus pagination metadata
//! - `JsonVo`: the `{ code, message, data }` envelope wrapping every response
//!
//! All wire names are camelCase (`pageIndex`, `pageSize`, `totalPages`).

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Default page index (1-based)
pub const DEFAULT_PAGE_INDEX: u32 = 1;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Envelope code signalling success
pub const CODE_SUCCESS: i32 = 200;

/// Envelope code used for client-side transport failures
pub const CODE_REQUEST_FAILED: i32 = 500;

fn default_page_index() -> u32 {
    DEFAULT_PAGE_INDEX
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Base pagination parameters carried by every list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Current page (1-based)
    #[serde(default = "default_page_index")]
    pub page_index: u32,
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    /// Create pagination parameters, clamping both values to at least 1
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Same parameters with zero values clamped to 1
    pub fn normalized(self) -> Self {
        Self::new(self.page_index, self.page_size)
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Partial update for [`PageQuery`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQueryPatch {
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
}

/// Parameter types accepted by a list endpoint
///
/// Implementors carry a [`PageQuery`] plus any resource-specific filters.
/// `merged` is a pure shallow merge: it returns a new value and leaves
/// `self` untouched, so an in-flight request keeps the parameters it was
/// dispatched with.
pub trait QueryParams:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial update applied by [`QueryParams::merged`]
    type Patch: Default + Send;

    /// Pagination part of the parameters
    fn page(&self) -> PageQuery;

    /// Copy of the parameters with the pagination part replaced
    fn with_page(&self, page: PageQuery) -> Self;

    /// Copy of the parameters with every `Some` field of `patch` applied;
    /// page values are clamped to at least 1
    fn merged(&self, patch: Self::Patch) -> Self;
}

impl QueryParams for PageQuery {
    type Patch = PageQueryPatch;

    fn page(&self) -> PageQuery {
        *self
    }

    fn with_page(&self, page: PageQuery) -> Self {
        page
    }

    fn merged(&self, patch: PageQueryPatch) -> Self {
        Self::new(
            patch.page_index.unwrap_or(self.page_index),
            patch.page_size.unwrap_or(self.page_size),
        )
    }
}

/// Total number of pages for `total` items, 0 when there are no items
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// One page of a list plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    /// Items on the current page
    pub list: Vec<T>,
    /// Number of matching items across all pages
    pub total: u64,
    /// Echoed page index
    pub page_index: u32,
    /// Echoed page size
    pub page_size: u32,
    /// `ceil(total / page_size)`
    pub total_pages: u64,
}

impl<T> PageResult<T> {
    /// Slice one page out of the full (already filtered) item list
    ///
    /// Pages past the end yield an empty list with the real `total`.
    pub fn paginate(items: Vec<T>, page: &PageQuery) -> Self {
        let page = page.normalized();
        let total = items.len() as u64;
        let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let list: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(page.page_size as usize)
            .collect();

        Self {
            list,
            total,
            page_index: page.page_index,
            page_size: page.page_size,
            total_pages: total_pages(total, page.page_size),
        }
    }

    /// Empty first page, used by the client fallback envelope
    pub fn empty() -> Self {
        Self {
            list: Vec::new(),
            total: 0,
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page_index) < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 1
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Response envelope: status code, message and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonVo<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> JsonVo<T> {
    /// Envelope with code 200 and message "success"
    pub fn success(data: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: "success".to_string(),
            data,
        }
    }

    pub fn failure(code: i32, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

impl<T> JsonVo<PageResult<T>> {
    /// Envelope returned to callers when the request never produced a response
    pub fn request_failed() -> Self {
        Self::failure(CODE_REQUEST_FAILED, "request failed", PageResult::empty())
    }
}
