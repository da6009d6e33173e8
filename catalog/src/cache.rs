use crate::model::{Product, ProductId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, OnceCell};

/// A key-addressed cache of fetched values.
///
/// Concurrent reads of one key share a single fetch. A value stays cached
/// until its key is invalidated; failed fetches are never cached.
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        QueryCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, running `fetch` when there is none.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> crate::Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<V>>,
    {
        let cell = self
            .entries()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(value) = cell.get() {
            log::debug!("Cache hit: {:?}", key);
            return Ok(value.clone());
        }

        let value = cell
            .get_or_try_init(|| {
                log::debug!("Cache fetch: {:?}", key);
                fetch()
            })
            .await?;

        Ok(value.clone())
    }

    /// Drops the entry for `key`. Returns whether a value was cached.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries()
            .remove(key)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// Whether a value is cached for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.entries()
            .get(key)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, Arc<OnceCell<V>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Which products a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListScope {
    ActiveOnly,
    All,
}

impl ListScope {
    pub const EVERY: [ListScope; 2] = [ListScope::ActiveOnly, ListScope::All];

    pub fn from_show_inactive(show_inactive: bool) -> Self {
        if show_inactive {
            ListScope::All
        } else {
            ListScope::ActiveOnly
        }
    }
}

/// Address of a cached products query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductsKey {
    List(ListScope),
    Detail(ProductId),
}

impl fmt::Display for ProductsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductsKey::List(ListScope::ActiveOnly) => write!(f, "products:active"),
            ProductsKey::List(ListScope::All) => write!(f, "products:all"),
            ProductsKey::Detail(id) => write!(f, "products:detail:{}", id),
        }
    }
}

struct Inner {
    lists: QueryCache<ListScope, Arc<Vec<Product>>>,
    details: QueryCache<ProductId, Option<Product>>,
    invalidations: broadcast::Sender<ProductsKey>,
}

/// The cache behind the products queries. Every invalidation is announced to
/// subscribers.
#[derive(Clone)]
pub struct ProductsCache {
    inner: Arc<Inner>,
}

impl ProductsCache {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(64);

        ProductsCache {
            inner: Arc::new(Inner {
                lists: QueryCache::new(),
                details: QueryCache::new(),
                invalidations,
            }),
        }
    }

    pub async fn list<F, Fut>(&self, scope: ListScope, fetch: F) -> crate::Result<Arc<Vec<Product>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<Vec<Product>>>,
    {
        self.inner
            .lists
            .get_or_fetch(scope, || async move { fetch().await.map(Arc::new) })
            .await
    }

    pub async fn detail<F, Fut>(&self, id: ProductId, fetch: F) -> crate::Result<Option<Product>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<Option<Product>>>,
    {
        self.inner.details.get_or_fetch(id, fetch).await
    }

    pub fn invalidate(&self, key: ProductsKey) {
        let was_cached = match key {
            ProductsKey::List(scope) => self.inner.lists.invalidate(&scope),
            ProductsKey::Detail(id) => self.inner.details.invalidate(&id),
        };

        log::debug!("Invalidated {} (cached: {})", key, was_cached);

        // Nobody listening is fine.
        let _ = self.inner.invalidations.send(key);
    }

    /// Invalidates the active-only and the full listing.
    pub fn invalidate_lists(&self) {
        for scope in ListScope::EVERY {
            self.invalidate(ProductsKey::List(scope));
        }
    }

    pub fn is_cached(&self, key: &ProductsKey) -> bool {
        match key {
            ProductsKey::List(scope) => self.inner.lists.contains(scope),
            ProductsKey::Detail(id) => self.inner.details.contains(id),
        }
    }

    /// Receives every key invalidated from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProductsKey> {
        self.inner.invalidations.subscribe()
    }
}

impl Default for ProductsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProductsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductsCache")
            .field("subscribers", &self.inner.invalidations.receiver_count())
            .finish()
    }
}
