//! Load-once collection cache with request coalescing.
//!
//! # Design
//! One [`CollectionCache`] per resource collection, alive for the whole
//! client session. State lives in a `tokio::sync::watch` channel so
//! reactive consumers can subscribe to changes; only the single
//! coordination routine in [`ensure_loaded`](CollectionCache::ensure_loaded)
//! ever mutates it.
//!
//! Coalescing works by storing a [`Shared`] handle to the in-flight load.
//! The handle is installed synchronously, before the first await point, so
//! under cooperative scheduling no second caller can slip in between
//! "mark in-flight" and "issue fetch". Every concurrent caller awaits the
//! same future and observes the same outcome. The handle is cleared as the
//! very last step of the load, success or failure, so a failed load never
//! poisons the cache; the next call simply fetches again.
//!
//! There is no timeout and no cancellation: dropping awaiters parks the
//! shared future, and the stored handle lets the next caller drive the same
//! fetch to completion.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::watch;

use crate::error::{ApiError, LoadError};

/// Items with a server-assigned string identity, for by-id lookups.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Observable snapshot of a cached collection.
///
/// `items` preserves server order. `loaded` flips to true after the first
/// successful fetch and never back; `error` holds the last failure message
/// or `None`.
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    pub items: Arc<Vec<T>>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            loaded: false,
            loading: false,
            error: None,
        }
    }
}

type SharedLoad<T> = Shared<BoxFuture<'static, Result<Arc<Vec<T>>, LoadError>>>;

struct Inner<T> {
    state: watch::Sender<CollectionState<T>>,
    inflight: Mutex<Option<SharedLoad<T>>>,
    default_error: String,
}

/// In-memory cache for one fetched collection.
///
/// Cloning is cheap and every clone observes the same cache.
pub struct CollectionCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CollectionCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for CollectionCache<T> {
    fn default() -> Self {
        Self::new("Failed to load collection")
    }
}

impl<T> CollectionCache<T> {
    /// Create an empty cache. `default_error` is the message recorded when
    /// a load fails without a usable detail of its own.
    pub fn new(default_error: &str) -> Self {
        let (state, _rx) = watch::channel(CollectionState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                inflight: Mutex::new(None),
                default_error: default_error.to_string(),
            }),
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> CollectionState<T>
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// The cached list (empty until the first successful load).
    pub fn items(&self) -> Arc<Vec<T>> {
        self.inner.state.borrow().items.clone()
    }

    /// Subscribe to state changes. Readers never mutate.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.inner.state.subscribe()
    }

    /// Synchronous snapshot lookup by id over whatever is currently cached.
    pub fn get_by_id(&self, id: &str) -> Option<T>
    where
        T: Keyed + Clone,
    {
        self.inner
            .state
            .borrow()
            .items
            .iter()
            .find(|item| item.key() == id)
            .cloned()
    }

    /// Reactive by-id view: recomputes the lookup whenever the collection
    /// changes.
    pub fn by_id(&self, id: &str) -> ByIdView<T> {
        ByIdView {
            rx: self.subscribe(),
            id: id.to_string(),
        }
    }

    /// Return the cached list, fetching it at most once.
    ///
    /// - Cache hit: returns the same `Arc` with no loader call.
    /// - In flight: returns the pending shared future; `loader` is not
    ///   invoked.
    /// - Miss: marks loading, runs `loader`, stores the result. On failure
    ///   every awaiter gets the same [`LoadError`] (the error's detail if
    ///   present, else the fixed default) and the cache stays unloaded so a
    ///   later call retries.
    pub async fn ensure_loaded<F, Fut>(&self, loader: F) -> Result<Arc<Vec<T>>, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
        T: Send + Sync + 'static,
    {
        if self.inner.state.borrow().loaded {
            return Ok(self.inner.state.borrow().items.clone());
        }

        // Everything up to storing the handle is synchronous: the lock is
        // released before the first await, and no task switch can observe
        // "loading" without an installed in-flight handle.
        let shared = {
            let mut inflight = self.inner.inflight.lock().unwrap();
            if let Some(pending) = inflight.as_ref() {
                pending.clone()
            } else {
                self.inner.state.send_modify(|s| {
                    s.loading = true;
                    s.error = None;
                });
                let load = Self::run_load(Arc::clone(&self.inner), loader());
                let shared = load.boxed().shared();
                *inflight = Some(shared.clone());
                shared
            }
        };

        shared.await
    }

    async fn run_load(
        inner: Arc<Inner<T>>,
        fut: impl Future<Output = Result<Vec<T>, ApiError>>,
    ) -> Result<Arc<Vec<T>>, LoadError>
    where
        T: Send + Sync,
    {
        let result = match fut.await {
            Ok(list) => {
                let list = Arc::new(list);
                inner.state.send_modify(|s| {
                    s.items = Arc::clone(&list);
                    s.loaded = true;
                });
                Ok(list)
            }
            Err(e) => {
                let message = e
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| inner.default_error.clone());
                inner.state.send_modify(|s| s.error = Some(message.clone()));
                Err(LoadError::new(message))
            }
        };
        inner.state.send_modify(|s| s.loading = false);
        // Last step: clearing the handle re-arms the cache for retries.
        *inner.inflight.lock().unwrap() = None;
        result
    }
}

/// A reactive view of one item, looked up by id on every read.
///
/// Exposes current-value read ([`get`](Self::get)) and change notification
/// ([`changed`](Self::changed)), the minimal observable container.
pub struct ByIdView<T> {
    rx: watch::Receiver<CollectionState<T>>,
    id: String,
}

impl<T: Keyed + Clone> ByIdView<T> {
    /// Recompute the lookup against the current collection.
    pub fn get(&self) -> Option<T> {
        self.rx
            .borrow()
            .items
            .iter()
            .find(|item| item.key() == self.id)
            .cloned()
    }

    /// Wait until the underlying collection changes.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}
