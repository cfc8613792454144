//! Observable parameter store
//!
//! Holds the current query parameters of one list view and notifies
//! registered listeners whenever they change. Listeners run after the
//! internal lock is released, so a listener may read the store again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::models::QueryParams;

/// Listener callback type
pub type ParamListener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Handle returned by [`ParamStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Parameter store with change listeners
pub struct ParamStore<P> {
    /// Parameters restored by `reset`
    initial: P,
    current: RwLock<P>,
    listeners: RwLock<Vec<(SubscriptionId, ParamListener<P>)>>,
    next_id: AtomicU64,
}

impl<P: std::fmt::Debug> std::fmt::Debug for ParamStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamStore")
            .field("initial", &self.initial)
            .field("current", &*self.current.read().unwrap_or_else(PoisonError::into_inner))
            .finish()
    }
}

impl<P: QueryParams> ParamStore<P> {
    pub fn new(initial: P) -> Self {
        Self {
            current: RwLock::new(initial.clone()),
            initial,
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the current parameters
    pub fn get(&self) -> P {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the parameters
    ///
    /// Returns `false` and notifies nobody when `params` equals the current value.
    pub fn set(&self, params: P) -> bool {
        self.replace(|_| params)
    }

    /// Merge a partial update into the current parameters
    pub fn update(&self, patch: P::Patch) -> bool {
        self.replace(|current| current.merged(patch))
    }

    /// Restore the initial parameters
    pub fn reset(&self) -> bool {
        self.set(self.initial.clone())
    }

    fn replace<F>(&self, next: F) -> bool
    where
        F: FnOnce(&P) -> P,
    {
        let changed = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let next = next(&current);
            if *current == next {
                None
            } else {
                *current = next.clone();
                Some(next)
            }
        };

        match changed {
            Some(params) => {
                self.notify(&params);
                true
            }
            None => false,
        }
    }

    /// Register a change listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));

        debug!("Registered parameter listener {:?}", id);
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        before != listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self, params: &P) {
        let listeners: Vec<ParamListener<P>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(params);
        }
    }
}
