//! Paginated list query
//!
//! A [`ListQuery`] binds one [`ParamStore`] to one list endpoint. Every
//! parameter change (page, size or filter) produces a new cache key and
//! triggers a fetch; fresh cached pages are served without a request.
//! State is published through a `watch` channel so views can re-render on
//! every change.
//!
//! Responses are applied only while their cache key is still the store's
//! current key. A slow response for parameters the user has already moved
//! away from is discarded instead of overwriting newer data.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::store::{ParamStore, SubscriptionId};
use super::transport::ListTransport;
use crate::cache::MemoryCache;
use crate::models::{
    total_pages, JsonVo, PageQuery, PageResult, QueryParams, CODE_REQUEST_FAILED, CODE_SUCCESS,
    DEFAULT_PAGE_INDEX,
};

/// Item types a list query can hold
pub trait ListItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> ListItem for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Error types for list queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// No response was received, or it could not be decoded
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success envelope code
    #[error("Server returned code {code}: {message}")]
    Application { code: i32, message: String },

    #[error("Failed to encode query parameters: {0}")]
    Encode(String),

    #[error("List queries must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Options for [`QueryClient::list_query`](super::QueryClient::list_query)
pub struct ListQueryOptions<P: QueryParams> {
    /// Cache key namespace, e.g. `config-center`
    pub key_prefix: String,
    /// Endpoint path the parameters are posted to
    pub api_url: String,
    /// Merged over `P::default()` to form the initial parameters
    pub initial_params: P::Patch,
    /// When false, nothing is fetched automatically
    pub enabled: bool,
    /// Freshness window; the client default when unset
    pub stale_time: Option<Duration>,
}

impl<P: QueryParams> ListQueryOptions<P> {
    pub fn new(key_prefix: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            api_url: api_url.into(),
            initial_params: P::Patch::default(),
            enabled: true,
            stale_time: None,
        }
    }

    pub fn initial_params(mut self, patch: P::Patch) -> Self {
        self.initial_params = patch;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }
}

/// Observable state of a list query
#[derive(Debug, Clone)]
pub struct QueryState<P, T> {
    /// Current parameters
    pub params: P,
    /// Cache key of `params`
    pub key: String,
    /// Items of the last successful response
    pub items: Vec<T>,
    /// Total of the last successful response
    pub total: u64,
    /// A request is in flight
    pub is_fetching: bool,
    /// At least one successful response has been applied
    pub has_data: bool,
    /// Outcome of the last applied response, `None` after a success
    pub error: Option<QueryError>,
    pub last_code: Option<i32>,
    pub last_message: Option<String>,
    /// When items were last replaced
    pub updated_at: Option<DateTime<Utc>>,
    /// Key whose response (success or failure) was last applied
    pub resolved_key: Option<String>,
}

impl<P: QueryParams, T> QueryState<P, T> {
    fn new(params: P, key: String) -> Self {
        Self {
            params,
            key,
            items: Vec::new(),
            total: 0,
            is_fetching: false,
            has_data: false,
            error: None,
            last_code: None,
            last_message: None,
            updated_at: None,
            resolved_key: None,
        }
    }

    pub fn page(&self) -> PageQuery {
        self.params.page()
    }

    /// `ceil(total / pageSize)` using the current page size
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.page().page_size)
    }

    /// Fetching with nothing to show yet
    pub fn is_loading(&self) -> bool {
        self.is_fetching && !self.has_data
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The current parameters have an applied response and nothing is in flight
    pub fn is_settled(&self) -> bool {
        !self.is_fetching && self.resolved_key.as_deref() == Some(self.key.as_str())
    }
}

/// Cache key for `params` under `prefix`: `<prefix>:<json params>`
pub fn cache_key<P: Serialize>(prefix: &str, params: &P) -> Result<String, QueryError> {
    serde_json::to_string(params)
        .map(|json| format!("{}:{}", prefix, json))
        .map_err(|e| QueryError::Encode(e.to_string()))
}

enum FetchOutcome<T> {
    Page(PageResult<T>, String),
    Rejected { code: i32, message: String },
    Failed(QueryError),
}

struct QueryInner<P: QueryParams, T> {
    key_prefix: String,
    api_url: String,
    enabled: bool,
    stale_time: Duration,
    store: Arc<ParamStore<P>>,
    transport: Arc<dyn ListTransport>,
    cache: Arc<MemoryCache>,
    state: watch::Sender<QueryState<P, T>>,
    in_flight: AtomicUsize,
    runtime: Handle,
}

impl<P: QueryParams, T: ListItem> QueryInner<P, T> {
    /// Sync the published params and key with the store
    ///
    /// The store is read under the watch lock, so when two changes race the
    /// last writer publishes the store's latest value.
    fn on_params_changed(self: &Arc<Self>) {
        let mut changed = None;
        self.state.send_modify(|state| {
            let params = self.store.get();
            match cache_key(&self.key_prefix, &params) {
                Ok(key) => {
                    state.params = params.clone();
                    state.key = key;
                    changed = Some(params);
                }
                Err(e) => {
                    warn!("Cannot build cache key for {}: {}", self.key_prefix, e);
                    state.error = Some(e);
                }
            }
        });

        if let Some(params) = changed {
            if self.enabled {
                self.spawn_fetch(params);
            }
        }
    }

    fn spawn_fetch(self: &Arc<Self>, params: P) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.run(params, false).await;
        });
    }

    async fn run(self: Arc<Self>, params: P, force: bool) -> JsonVo<PageResult<T>> {
        let key = match cache_key(&self.key_prefix, &params) {
            Ok(key) => key,
            Err(e) => {
                warn!("Cannot build cache key for {}: {}", self.key_prefix, e);
                self.state.send_modify(|state| state.error = Some(e));
                return JsonVo::request_failed();
            }
        };

        if !force {
            match self
                .cache
                .get_fresh::<JsonVo<PageResult<T>>>(&key, self.stale_time)
                .await
            {
                Ok(Some(cached)) => {
                    debug!("Serving {} from cache", key);
                    self.publish(
                        &key,
                        FetchOutcome::Page(cached.data.clone(), cached.message.clone()),
                        false,
                    );
                    return cached;
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache entry {}: {:#}", key, e),
            }
        }

        self.state.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_fetching = true;
        });

        let envelope = match self.request(&params).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("List request for {} failed: {}", key, e);
                self.publish(&key, FetchOutcome::Failed(e), true);
                return JsonVo::request_failed();
            }
        };

        if !envelope.is_success() {
            let code = envelope.code;
            let message = envelope.message.clone();
            debug!("List request for {} answered code {}: {}", key, code, message);
            self.publish(&key, FetchOutcome::Rejected { code, message }, true);
            return JsonVo::failure(envelope.code, envelope.message, PageResult::empty());
        }

        let page: PageResult<T> = match serde_json::from_value(envelope.data) {
            Ok(page) => page,
            Err(e) => {
                let error = QueryError::Transport(format!("invalid page payload: {}", e));
                warn!("List request for {} failed: {}", key, error);
                self.publish(&key, FetchOutcome::Failed(error), true);
                return JsonVo::request_failed();
            }
        };

        let result = JsonVo {
            code: envelope.code,
            message: envelope.message,
            data: page,
        };
        if let Err(e) = self.cache.set(&key, &result).await {
            warn!("Failed to cache {}: {:#}", key, e);
        }

        self.publish(
            &key,
            FetchOutcome::Page(result.data.clone(), result.message.clone()),
            true,
        );
        result
    }

    /// Post the parameters and decode the envelope, leaving `data` raw
    /// because failure envelopes may carry no page.
    async fn request(&self, params: &P) -> Result<JsonVo<Value>, QueryError> {
        let body = serde_json::to_value(params).map_err(|e| QueryError::Encode(e.to_string()))?;

        let response = self
            .transport
            .post_json(&self.api_url, body)
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        serde_json::from_value(response)
            .map_err(|e| QueryError::Transport(format!("invalid response envelope: {}", e)))
    }

    /// Apply an outcome if `key` is still the published key
    ///
    /// The key comparison and the write happen under the same watch lock
    /// that `on_params_changed` takes, so a superseded response can never
    /// land on newer params.
    fn publish(&self, key: &str, outcome: FetchOutcome<T>, finished_request: bool) {
        let mut applied = false;

        self.state.send_modify(|state| {
            if finished_request {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            state.is_fetching = self.in_flight.load(Ordering::SeqCst) > 0;
            if state.key != key {
                return;
            }

            match outcome {
                FetchOutcome::Page(page, message) => {
                    state.items = page.list;
                    state.total = page.total;
                    state.has_data = true;
                    state.error = None;
                    state.last_code = Some(CODE_SUCCESS);
                    state.last_message = Some(message);
                    state.updated_at = Some(Utc::now());
                }
                FetchOutcome::Rejected { code, message } => {
                    state.error = Some(QueryError::Application {
                        code,
                        message: message.clone(),
                    });
                    state.last_code = Some(code);
                    state.last_message = Some(message);
                }
                FetchOutcome::Failed(error) => {
                    state.error = Some(error);
                    state.last_code = Some(CODE_REQUEST_FAILED);
                    state.last_message = Some("request failed".to_string());
                }
            }
            state.resolved_key = Some(key.to_string());
            applied = true;
        });

        if !applied {
            debug!("Discarded response for superseded key {}", key);
        }
    }
}

/// Paginated, cached list query bound to one endpoint
///
/// Dropping the query unsubscribes it from its parameter store; fetches
/// already in flight still complete and fill the shared cache.
pub struct ListQuery<P: QueryParams, T: ListItem> {
    inner: Arc<QueryInner<P, T>>,
    subscription: SubscriptionId,
}

impl<P: QueryParams, T: ListItem> ListQuery<P, T> {
    pub(crate) fn new(
        options: ListQueryOptions<P>,
        transport: Arc<dyn ListTransport>,
        cache: Arc<MemoryCache>,
        default_stale_time: Duration,
    ) -> Result<Self, QueryError> {
        let runtime = Handle::try_current().map_err(|_| QueryError::NoRuntime)?;

        let initial = P::default().merged(options.initial_params);
        let initial = initial.with_page(initial.page().normalized());
        let key = cache_key(&options.key_prefix, &initial)?;
        let store = Arc::new(ParamStore::new(initial.clone()));
        let (state, _) = watch::channel(QueryState::new(initial.clone(), key));

        let inner = Arc::new(QueryInner {
            key_prefix: options.key_prefix,
            api_url: options.api_url,
            enabled: options.enabled,
            stale_time: options.stale_time.unwrap_or(default_stale_time),
            store,
            transport,
            cache,
            state,
            in_flight: AtomicUsize::new(0),
            runtime,
        });

        let weak: Weak<QueryInner<P, T>> = Arc::downgrade(&inner);
        let subscription = inner.store.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_params_changed();
            }
        });

        if inner.enabled {
            inner.spawn_fetch(initial);
        }

        Ok(Self {
            inner,
            subscription,
        })
    }

    pub fn key_prefix(&self) -> &str {
        &self.inner.key_prefix
    }

    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Parameter store driving this query
    pub fn store(&self) -> &Arc<ParamStore<P>> {
        &self.inner.store
    }

    pub fn params(&self) -> P {
        self.inner.store.get()
    }

    /// Cache key of the current parameters
    pub fn cache_key(&self) -> String {
        self.inner.state.borrow().key.clone()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> QueryState<P, T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<QueryState<P, T>> {
        self.inner.state.subscribe()
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.state.borrow().items.clone()
    }

    pub fn total(&self) -> u64 {
        self.inner.state.borrow().total
    }

    pub fn total_pages(&self) -> u64 {
        self.inner.state.borrow().total_pages()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.state.borrow().is_fetching
    }

    pub fn error(&self) -> Option<QueryError> {
        self.inner.state.borrow().error.clone()
    }

    /// Shallow-merge `patch` into the current parameters
    pub fn update_params(&self, patch: P::Patch) {
        self.inner.store.update(patch);
    }

    /// Replace the parameters wholesale, clamping page values to at least 1
    pub fn set_params(&self, params: P) {
        let page = params.page().normalized();
        self.inner.store.set(params.with_page(page));
    }

    /// Restore the initial parameters
    pub fn reset_params(&self) {
        self.inner.store.reset();
    }

    /// Go to `page_index` (0 is treated as 1)
    pub fn set_page_index(&self, page_index: u32) {
        let params = self.params();
        let page = PageQuery::new(page_index, params.page().page_size);
        self.set_params(params.with_page(page));
    }

    /// Change the page size and go back to the first page
    pub fn set_page_size(&self, page_size: u32) {
        let params = self.params();
        self.set_params(params.with_page(PageQuery::new(DEFAULT_PAGE_INDEX, page_size)));
    }

    /// Fetch the current parameters, serving a fresh cached page if present
    ///
    /// Transport failures resolve to the `{500, "request failed"}` envelope
    /// instead of an error.
    pub async fn fetch(&self) -> JsonVo<PageResult<T>> {
        Arc::clone(&self.inner).run(self.params(), false).await
    }

    /// Fetch the current parameters, bypassing the cache
    pub async fn refetch(&self) -> JsonVo<PageResult<T>> {
        Arc::clone(&self.inner).run(self.params(), true).await
    }

    /// Wait until the current parameters have an applied response
    ///
    /// Never resolves for a disabled query that has not been fetched.
    pub async fn settled(&self) -> QueryState<P, T> {
        let mut receiver = self.subscribe();
        let settled = receiver
            .wait_for(|state| state.is_settled())
            .await
            .map(|state| (*state).clone());

        match settled {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }
}

impl<P: QueryParams, T: ListItem> Drop for ListQuery<P, T> {
    fn drop(&mut self) {
        self.inner.store.unsubscribe(self.subscription);
    }
}

impl<P: QueryParams + std::fmt::Debug, T: ListItem> std::fmt::Debug for ListQuery<P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListQuery")
            .field("key_prefix", &self.inner.key_prefix)
            .field("api_url", &self.inner.api_url)
            .field("params", &self.params())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::TransportError;
    use crate::client::QueryClient;
    use crate::config::QueryConfig;
    use crate::models::PageQueryPatch;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const PREFIX: &str = "numbers";
    const URL: &str = "/api/numbers";

    type Script = Box<dyn Fn(PageQuery) -> Result<Value, TransportError> + Send + Sync>;

    /// Serves numbers 1..=25 with a per-page delay and scripted overrides
    struct FakeTransport {
        calls: AtomicUsize,
        delays: Mutex<Vec<(u32, Duration)>>,
        script: Mutex<Option<Script>>,
    }

    impl FakeTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delays: Mutex::new(Vec::new()),
                script: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn delay_page(&self, page_index: u32, delay: Duration) {
            self.delays.lock().unwrap().push((page_index, delay));
        }

        fn script<F>(&self, script: F)
        where
            F: Fn(PageQuery) -> Result<Value, TransportError> + Send + Sync + 'static,
        {
            *self.script.lock().unwrap() = Some(Box::new(script));
        }
    }

    #[async_trait]
    impl ListTransport for FakeTransport {
        async fn post_json(&self, _path: &str, body: Value) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page: PageQuery = serde_json::from_value(body)?;

            let delay = self
                .delays
                .lock()
                .unwrap()
                .iter()
                .find(|(index, _)| *index == page.page_index)
                .map(|(_, delay)| *delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(script) = self.script.lock().unwrap().as_ref() {
                return script(page);
            }

            let numbers: Vec<u32> = (1..=25).collect();
            Ok(serde_json::to_value(JsonVo::success(PageResult::paginate(numbers, &page)))?)
        }
    }

    fn client(transport: Arc<FakeTransport>) -> QueryClient {
        QueryClient::new(transport, &QueryConfig::default())
    }

    fn options() -> ListQueryOptions<PageQuery> {
        ListQueryOptions::new(PREFIX, URL)
    }

    fn numbers_query(transport: &Arc<FakeTransport>) -> ListQuery<PageQuery, u32> {
        client(Arc::clone(transport)).list_query(options()).unwrap()
    }

    #[tokio::test]
    async fn test_initial_fetch_populates_state() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);

        let state = query.settled().await;
        assert_eq!(state.items, (1..=10).collect::<Vec<u32>>());
        assert_eq!(state.total, 25);
        assert_eq!(state.total_pages(), 3);
        assert!(!state.is_loading());
        assert!(state.error.is_none());
        assert_eq!(state.last_code, Some(200));
        assert!(state.updated_at.is_some());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_format() {
        let query: ListQuery<PageQuery, u32> = client(FakeTransport::new())
            .list_query(options().enabled(false))
            .unwrap();
        assert_eq!(query.cache_key(), r#"numbers:{"pageIndex":1,"pageSize":10}"#);
    }

    #[tokio::test]
    async fn test_param_change_fetches_new_page() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);
        query.settled().await;

        query.set_page_index(3);
        let state = query.settled().await;

        assert_eq!(state.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(state.page().page_index, 3);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_serves_cached_page() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);
        query.settled().await;

        query.update_params(PageQueryPatch {
            page_index: Some(2),
            page_size: None,
        });
        query.settled().await;

        query.reset_params();
        let state = query.settled().await;

        assert_eq!(state.params, PageQuery::default());
        assert_eq!(state.items, (1..=10).collect::<Vec<u32>>());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);
        query.settled().await;

        let cached = query.fetch().await;
        assert_eq!(transport.calls(), 1);
        assert_eq!(cached.data.total, 25);

        let fresh = query.refetch().await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(fresh.code, 200);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_requests() {
        let transport = FakeTransport::new();
        let query: ListQuery<PageQuery, u32> = client(transport.clone())
            .list_query(options().stale_time(Duration::ZERO))
            .unwrap();
        query.settled().await;

        query.fetch().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_queries_share_cache() {
        let transport = FakeTransport::new();
        let client = client(transport.clone());

        let first: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
        first.settled().await;
        let second: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
        let state = second.settled().await;

        assert_eq!(state.total, 25);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_reader_stale_time_decides_freshness() {
        let transport = FakeTransport::new();
        let client = client(transport.clone());

        let cached: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
        cached.settled().await;
        assert_eq!(transport.calls(), 1);

        let always_fresh: ListQuery<PageQuery, u32> = client
            .list_query(options().stale_time(Duration::ZERO).enabled(false))
            .unwrap();
        always_fresh.fetch().await;
        assert_eq!(transport.calls(), 2);

        // Written by a zero-stale-time query, still fresh for the default window
        let patient: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
        let state = patient.settled().await;
        assert_eq!(state.total, 25);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_request() {
        let transport = FakeTransport::new();
        let client = client(transport.clone());
        let query: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
        query.settled().await;

        client.invalidate(PREFIX).await;
        query.fetch().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let transport = FakeTransport::new();
        transport.delay_page(1, Duration::from_millis(200));
        let query = numbers_query(&transport);

        query.set_page_index(2);
        let state = query.settled().await;
        assert_eq!(state.items, (11..=20).collect::<Vec<u32>>());

        tokio::time::sleep(Duration::from_millis(300)).await;
        let state = query.state();
        assert_eq!(state.items, (11..=20).collect::<Vec<u32>>());
        assert_eq!(state.page().page_index, 2);
        assert!(!state.is_fetching);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_non_success_code_keeps_items() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);
        query.settled().await;

        transport.script(|_| Ok(json!({"code": 403, "message": "forbidden", "data": null})));
        query.set_page_index(2);
        let state = query.settled().await;

        assert_eq!(state.items, (1..=10).collect::<Vec<u32>>());
        assert_eq!(
            state.error,
            Some(QueryError::Application {
                code: 403,
                message: "forbidden".to_string()
            })
        );
        assert_eq!(state.last_code, Some(403));

        let envelope = query.refetch().await;
        assert_eq!(envelope.code, 403);
        assert!(envelope.data.list.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_returns_fallback() {
        let transport = FakeTransport::new();
        let query: ListQuery<PageQuery, u32> = client(transport.clone())
            .list_query(options().enabled(false))
            .unwrap();

        transport.script(|_| Err(TransportError::Status(502)));
        let envelope = query.fetch().await;

        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.message, "request failed");
        assert!(envelope.data.list.is_empty());
        assert_eq!(envelope.data.total, 0);

        let state = query.state();
        assert!(matches!(state.error, Some(QueryError::Transport(_))));
        assert!(!state.is_fetching);
        assert!(!state.has_data);
    }

    #[tokio::test]
    async fn test_disabled_query_does_not_fetch() {
        let transport = FakeTransport::new();
        let query: ListQuery<PageQuery, u32> = client(transport.clone())
            .list_query(options().enabled(false))
            .unwrap();

        query.set_page_index(2);
        tokio::task::yield_now().await;
        assert_eq!(transport.calls(), 0);
        assert_eq!(query.state().page().page_index, 2);

        let envelope = query.fetch().await;
        assert_eq!(envelope.data.page_index, 2);
        assert_eq!(query.items(), (11..=20).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_set_page_size_resets_page_index() {
        let query: ListQuery<PageQuery, u32> = client(FakeTransport::new())
            .list_query(options().initial_params(PageQueryPatch {
                page_index: Some(3),
                page_size: None,
            }))
            .unwrap();
        query.settled().await;
        assert_eq!(query.params(), PageQuery::new(3, 10));

        query.set_page_size(5);
        assert_eq!(query.params(), PageQuery::new(1, 5));
        assert_eq!(query.total_pages(), 5);

        let state = query.settled().await;
        assert_eq!(state.items, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_zero_page_values_are_clamped() {
        let query = numbers_query(&FakeTransport::new());
        query.settled().await;

        query.set_page_size(0);
        assert_eq!(query.params(), PageQuery::new(1, 1));
        assert_eq!(query.total_pages(), 25);

        query.set_page_index(0);
        query.set_params(PageQuery {
            page_index: 0,
            page_size: 0,
        });
        assert_eq!(query.params(), PageQuery::new(1, 1));
        assert_eq!(query.cache_key(), r#"numbers:{"pageIndex":1,"pageSize":1}"#);
    }

    #[tokio::test]
    async fn test_response_for_replaced_key_is_not_applied() {
        let query: ListQuery<PageQuery, u32> = client(FakeTransport::new())
            .list_query(options().enabled(false))
            .unwrap();
        let first_key = query.cache_key();

        query.set_page_index(2);
        let page = PageResult::paginate(vec![1, 2, 3], &PageQuery::default());
        query
            .inner
            .publish(&first_key, FetchOutcome::Page(page, "success".to_string()), false);

        let state = query.state();
        assert!(state.items.is_empty());
        assert!(state.resolved_key.is_none());
        assert_eq!(state.page().page_index, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rapid_page_changes_settle_on_last_page() {
        let transport = FakeTransport::new();
        transport.delay_page(2, Duration::from_millis(5));
        let client = client(transport.clone());

        for _ in 0..50 {
            let query: ListQuery<PageQuery, u32> = client.list_query(options()).unwrap();
            query.set_page_index(2);
            query.set_page_index(3);

            let state = tokio::time::timeout(Duration::from_secs(5), query.settled())
                .await
                .unwrap();
            assert_eq!(state.page().page_index, 3);
            assert_eq!(state.items, vec![21, 22, 23, 24, 25]);
            assert_eq!(state.resolved_key.as_deref(), Some(state.key.as_str()));
        }
    }

    #[tokio::test]
    async fn test_drop_unsubscribes_listener() {
        let query: ListQuery<PageQuery, u32> = client(FakeTransport::new())
            .list_query(options().enabled(false))
            .unwrap();
        let store = Arc::clone(query.store());
        assert_eq!(store.listener_count(), 1);

        drop(query);
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_external_store_update_triggers_fetch() {
        let transport = FakeTransport::new();
        let query = numbers_query(&transport);
        query.settled().await;

        query.store().set(PageQuery::new(2, 20));
        let state = query.settled().await;
        assert_eq!(state.items.len(), 5);
        assert_eq!(state.key, query.cache_key());
    }

    #[test]
    fn test_outside_runtime_is_rejected() {
        let result: Result<ListQuery<PageQuery, u32>, _> =
            client(FakeTransport::new()).list_query(options());
        assert_eq!(result.unwrap_err(), QueryError::NoRuntime);
    }
}
