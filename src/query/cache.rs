//! Keyed read cache shared by every view.
//!
//! One `QueryClient` is one cache context. Handles are cheap clones of the
//! same context, and everything runs on a single thread: entries live in a
//! `RefCell` and no borrow is ever held across an await.
//!
//! Reads are deduplicated through a shared in-flight future per key. A
//! cached value stays fresh until it is invalidated; there is no TTL and no
//! polling. Invalidation detaches any fetch still in flight for the key, so
//! its late result can never overwrite the invalidation.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::future::{FutureExt, LocalBoxFuture, Shared, join_all};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError, unbounded_channel};

use super::keys::QueryKey;
use crate::error::ApiError;

type CachedValue = Rc<dyn Any>;
type FetchResult = Result<CachedValue, ApiError>;
type SharedFetch = Shared<LocalBoxFuture<'static, FetchResult>>;
type Fetcher = Rc<dyn Fn() -> LocalBoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Fetching,
}

/// Notification delivered to subscribers of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Invalidated(QueryKey),
    Updated(QueryKey),
    Failed(QueryKey, ApiError),
}

struct InFlight {
    id: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct Entry {
    value: Option<CachedValue>,
    stale: bool,
    in_flight: Option<InFlight>,
    fetcher: Option<Fetcher>,
    subscribers: Vec<(u64, UnboundedSender<CacheEvent>)>,
}

impl Entry {
    fn fresh_value(&self) -> Option<CachedValue> {
        if self.stale || self.in_flight.is_some() {
            return None;
        }
        self.value.clone()
    }

    fn freshness(&self) -> Freshness {
        if self.in_flight.is_some() {
            Freshness::Fetching
        } else if self.fresh_value().is_some() {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }

    fn observed(&self) -> bool {
        self.subscribers.iter().any(|(_, tx)| !tx.is_closed())
    }

    fn notify(&mut self, event: CacheEvent) {
        // A closed channel means the view went away; drop it quietly.
        self.subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    next_id: u64,
}

impl CacheState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Join the fetch in flight for `key`, or start one with the stored
    /// fetcher. `None` when there is nothing to run.
    fn join_or_start(&mut self, key: &QueryKey) -> Option<(u64, SharedFetch)> {
        let id = self.next_id + 1;
        let entry = self.entries.get_mut(key)?;
        if let Some(in_flight) = &entry.in_flight {
            return Some((in_flight.id, in_flight.future.clone()));
        }
        let fetcher = entry.fetcher.clone()?;
        let future = fetcher().shared();
        entry.in_flight = Some(InFlight {
            id,
            future: future.clone(),
        });
        self.next_id = id;
        log::debug!("Fetching {}", key);
        Some((id, future))
    }
}

#[derive(Clone, Default)]
pub struct QueryClient {
    state: Rc<RefCell<CacheState>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key`, fetching only when there is no fresh value. Concurrent
    /// reads of the same key share one fetch.
    ///
    /// `fetcher` is kept so the key can be refreshed after invalidation. It
    /// must not touch this cache synchronously.
    pub async fn read<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Rc<T>, ApiError>
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let fetcher = erase(fetcher);
        let (id, future) = {
            let mut state = self.state.borrow_mut();
            let entry = state.entries.entry(key.clone()).or_default();
            entry.fetcher = Some(fetcher);
            if let Some(value) = entry.fresh_value() {
                log::debug!("Cache hit {}", key);
                return downcast(key, value);
            }
            match state.join_or_start(key) {
                Some(fetch) => fetch,
                None => return Err(ApiError::unreachable(format!("No fetcher for {}", key))),
            }
        };
        let value = self.settle_after(key, id, future).await?;
        downcast(key, value)
    }

    /// Like `read`, but a disabled read returns `Ok(None)` without creating
    /// an entry or touching the network.
    pub async fn read_if<T, F, Fut>(
        &self,
        key: &QueryKey,
        enabled: bool,
        fetcher: F,
    ) -> Result<Option<Rc<T>>, ApiError>
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        if !enabled {
            return Ok(None);
        }
        self.read(key, fetcher).await.map(Some)
    }

    /// Whatever is cached for `key`, fresh or stale. Never fetches.
    pub fn peek<T: 'static>(&self, key: &QueryKey) -> Option<Rc<T>> {
        let state = self.state.borrow();
        let value = state.entries.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    pub fn freshness(&self, key: &QueryKey) -> Option<Freshness> {
        self.state.borrow().entries.get(key).map(Entry::freshness)
    }

    /// Mark every key under `prefix` stale. Returns how many keys were hit.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.state.borrow_mut();
        let mut hit = 0;
        for (key, entry) in state.entries.iter_mut() {
            if !key.starts_with(prefix) {
                continue;
            }
            entry.stale = true;
            entry.in_flight = None;
            entry.notify(CacheEvent::Invalidated(key.clone()));
            hit += 1;
        }
        log::debug!("Invalidated {} ({} keys)", prefix, hit);
        hit
    }

    /// Refresh every non-fresh key under `prefix` that somebody is
    /// subscribed to. Subscribers learn the outcome through their events.
    pub async fn refetch_active(&self, prefix: &QueryKey) {
        let pending: Vec<(QueryKey, u64, SharedFetch)> = {
            let mut state = self.state.borrow_mut();
            let keys: Vec<QueryKey> = state
                .entries
                .iter()
                .filter(|(key, entry)| {
                    key.starts_with(prefix) && entry.observed() && entry.freshness() != Freshness::Fresh
                })
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| state.join_or_start(&key).map(|(id, f)| (key, id, f)))
                .collect()
        };

        if pending.is_empty() {
            return;
        }
        log::debug!("Refetching {} active keys under {}", pending.len(), prefix);
        join_all(
            pending
                .into_iter()
                .map(|(key, id, future)| async move { self.settle_after(&key, id, future).await }),
        )
        .await;
    }

    /// Run `mutation`; on success invalidate every key in `affected` and
    /// refresh the ones being watched. A failed mutation changes nothing.
    pub async fn mutate<R, Fut>(&self, mutation: Fut, affected: &[QueryKey]) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let result = mutation.await;
        match &result {
            Ok(_) => {
                for key in affected {
                    self.invalidate(key);
                }
                for key in affected {
                    self.refetch_active(key).await;
                }
            }
            Err(e) => log::warn!("Mutation failed, cache left as is: {}", e),
        }
        result
    }

    /// Register interest in `key`. The entry is created if needed but
    /// nothing is fetched.
    pub fn subscribe(&self, key: &QueryKey) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state
            .entries
            .entry(key.clone())
            .or_default()
            .subscribers
            .push((id, tx));
        Subscription {
            key: key.clone(),
            id,
            events: rx,
            cache: Rc::downgrade(&self.state),
        }
    }

    /// Subscribe and store `fetcher`, so invalidation of `key` can be
    /// followed by a refresh even before the first read.
    pub fn subscribe_with<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Subscription
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let subscription = self.subscribe(key);
        if let Some(entry) = self.state.borrow_mut().entries.get_mut(key) {
            entry.fetcher = Some(erase(fetcher));
        }
        subscription
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.state
            .borrow()
            .entries
            .get(key)
            .map(|e| e.subscribers.iter().filter(|(_, tx)| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Drop entries nobody watches that hold no fresh value and are not
    /// being fetched. Returns how many were evicted. Long-running front
    /// ends call this between pages; a one-shot command never needs to.
    pub fn collect_garbage(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, e| e.observed() || e.freshness() != Freshness::Stale);
        let evicted = before - state.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {} cache entries", evicted);
        }
        evicted
    }

    async fn settle_after(&self, key: &QueryKey, id: u64, future: SharedFetch) -> FetchResult {
        let result = future.await;
        self.settle(key, id, &result);
        result
    }

    /// Store a finished fetch. Only the fetch currently attached to the
    /// entry may write; a detached or already-settled one is ignored.
    fn settle(&self, key: &QueryKey, id: u64, result: &FetchResult) {
        let mut state = self.state.borrow_mut();
        let Some(entry) = state.entries.get_mut(key) else {
            return;
        };
        if entry.in_flight.as_ref().map(|f| f.id) != Some(id) {
            return;
        }
        entry.in_flight = None;

        let event = match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.stale = false;
                log::debug!("Fetched {}", key);
                CacheEvent::Updated(key.clone())
            }
            Err(e) => {
                entry.stale = true;
                log::warn!("Fetching {} failed: {}", key, e);
                CacheEvent::Failed(key.clone(), e.clone())
            }
        };
        entry.notify(event);
    }
}

fn erase<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    Rc::new(move || {
        fetcher()
            .map(|result| result.map(|value| Rc::new(value) as CachedValue))
            .boxed_local()
    })
}

fn downcast<T: 'static>(key: &QueryKey, value: CachedValue) -> Result<Rc<T>, ApiError> {
    value.downcast::<T>().map_err(|_| {
        ApiError::unreachable(format!("Cached value for {} has an unexpected type", key))
    })
}

/// A view's interest in one key. Dropping it unregisters the view.
pub struct Subscription {
    key: QueryKey,
    id: u64,
    events: UnboundedReceiver<CacheEvent>,
    cache: Weak<RefCell<CacheState>>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The cached value if it is fresh right now.
    pub fn current<T: 'static>(&self) -> Option<Rc<T>> {
        let cache = self.cache.upgrade()?;
        let state = cache.borrow();
        let value = state.entries.get(&self.key)?.fresh_value()?;
        value.downcast::<T>().ok()
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<CacheEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next event. `None` once the cache context is gone.
    pub async fn next(&mut self) -> Option<CacheEvent> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        if let Ok(mut state) = cache.try_borrow_mut() {
            if let Some(entry) = state.entries.get_mut(&self.key) {
                entry.subscribers.retain(|(id, _)| *id != self.id);
            }
        };
    }
}
