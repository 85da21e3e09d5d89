//! Cache/Service Registry.
//!
//! A process-wide table of named entries, each backed by a factory:
//!
//! - **Services** ([`EntryScope::Process`]) are singletons, built on first
//!   request and kept for the life of the process.
//! - **Caches** ([`EntryScope::Guild`]) build a [`ScopedCache`], which holds
//!   one lazily-loaded value per scope key (guild id). Values stay until
//!   explicitly invalidated.
//!
//! Entries declare their dependencies by name. [`RegistryBuilder::build`]
//! rejects unknown dependencies and cycles, so a factory can only ever ask
//! for entries that are already constructible. A factory that requests an
//! entry it did not declare fails with
//! [`ConfigurationError::UndeclaredDependency`].

use super::dashmap_ext::DashMapExt;
use crate::error::{ActionError, ConfigurationError};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Scope key of a cache slot. Guild ids in practice.
pub type ScopeKey = u64;

/// Lifetime category of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryScope {
    /// One instance per process.
    Process,
    /// One value per scope key, held by a [`ScopedCache`].
    Guild,
}

impl EntryScope {
    fn kind(self) -> &'static str {
        match self {
            Self::Process => "service",
            Self::Guild => "cache",
        }
    }
}

// ============================================================================
// Scoped caches
// ============================================================================

/// Computes the value of a cache slot.
#[async_trait]
pub trait CacheLoader<T>: Send + Sync {
    async fn load(&self, key: ScopeKey) -> Result<T, ActionError>;
}

type Slot<T> = Arc<tokio::sync::Mutex<Option<Arc<T>>>>;

/// Values keyed by scope, loaded on demand.
///
/// Every access to one key goes through that key's async mutex, so a value
/// is loaded at most once per invalidation and readers never see a slot
/// mid-update. Distinct keys never contend.
pub struct ScopedCache<T> {
    name: String,
    loader: Arc<dyn CacheLoader<T>>,
    slots: DashMap<ScopeKey, Slot<T>>,
}

impl<T: Send + Sync + 'static> ScopedCache<T> {
    pub fn new(name: impl Into<String>, loader: Arc<dyn CacheLoader<T>>) -> Self {
        Self {
            name: name.into(),
            loader,
            slots: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value for `key`, loading it if the slot is empty.
    ///
    /// A failed load is returned to the caller and leaves the slot empty.
    pub async fn get(&self, key: ScopeKey) -> Result<Arc<T>, ActionError> {
        let slot = self.slots.get_or_default_cloned(key);
        let mut guard = slot.lock().await;
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }

        let loaded = self.loader.load(key).await;
        crate::metrics::record_cache_load(&self.name, loaded.is_ok());
        let value = Arc::new(loaded?);
        *guard = Some(value.clone());
        debug!(cache = %self.name, key, "Cache slot loaded");
        Ok(value)
    }

    /// The value for `key` if loaded, without triggering a load.
    pub async fn peek(&self, key: ScopeKey) -> Option<Arc<T>> {
        let slot = self.slots.get_cloned(&key)?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Empty the slot for `key`; the next `get` reloads.
    pub async fn invalidate(&self, key: ScopeKey) {
        if let Some(slot) = self.slots.get_cloned(&key) {
            *slot.lock().await = None;
            debug!(cache = %self.name, key, "Cache slot invalidated");
        }
    }

    /// Empty every slot.
    pub async fn invalidate_all(&self) {
        for slot in self.slots.values_cloned() {
            *slot.lock().await = None;
        }
        debug!(cache = %self.name, "Cache invalidated");
    }
}

/// Type-erased view of a `ScopedCache<T>`, for invalidation by name.
#[async_trait]
trait ErasedCache: Send + Sync {
    async fn invalidate(&self, key: ScopeKey);
    async fn invalidate_all(&self);
}

#[async_trait]
impl<T: Send + Sync + 'static> ErasedCache for ScopedCache<T> {
    async fn invalidate(&self, key: ScopeKey) {
        ScopedCache::invalidate(self, key).await
    }

    async fn invalidate_all(&self) {
        ScopedCache::invalidate_all(self).await
    }
}

// ============================================================================
// Entries
// ============================================================================

type AnyArc = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Built {
    instance: AnyArc,
    cache: Option<Arc<dyn ErasedCache>>,
}

type Factory = Box<dyn Fn(&Registry) -> Result<Built, ConfigurationError> + Send + Sync>;

struct Entry {
    name: String,
    scope: EntryScope,
    depends_on: Vec<String>,
    factory: Factory,
    built: Mutex<Option<Built>>,
}

thread_local! {
    /// Entries whose factory is running on this thread, innermost last.
    static CONSTRUCTING: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Pops the construction stack even if a factory panics.
struct ConstructionGuard;

impl ConstructionGuard {
    fn enter(name: &str) -> Self {
        CONSTRUCTING.with(|s| s.borrow_mut().push(name.to_string()));
        Self
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTING.with(|s| {
            s.borrow_mut().pop();
        });
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects entries during module loading.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    errors: Vec<ConfigurationError>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process-wide service.
    pub fn service<T, F>(&mut self, name: &str, depends_on: &[&str], factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<T, ConfigurationError> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |registry| {
            let instance: AnyArc = Arc::new(factory(registry)?);
            Ok(Built {
                instance,
                cache: None,
            })
        });
        self.push(name, EntryScope::Process, depends_on, factory)
    }

    /// Register a guild-scoped cache.
    pub fn cache<T, F>(&mut self, name: &str, depends_on: &[&str], factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Registry) -> Result<ScopedCache<T>, ConfigurationError> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |registry| {
            let cache = Arc::new(factory(registry)?);
            Ok(Built {
                instance: cache.clone(),
                cache: Some(cache),
            })
        });
        self.push(name, EntryScope::Guild, depends_on, factory)
    }

    fn push(
        &mut self,
        name: &str,
        scope: EntryScope,
        depends_on: &[&str],
        factory: Factory,
    ) -> &mut Self {
        if self.entries.iter().any(|e| e.name == name) {
            self.errors
                .push(ConfigurationError::DuplicateEntry(name.to_string()));
            return self;
        }
        self.entries.push(Entry {
            name: name.to_string(),
            scope,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            factory,
            built: Mutex::new(None),
        });
        self
    }

    /// Validate the dependency graph and freeze the registry.
    pub fn build(mut self) -> Result<Registry, ConfigurationError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        let registry = Registry {
            entries: self.entries,
            index,
        };
        registry.validate()?;
        Ok(registry)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Frozen set of entries. Shared via `Arc` once built.
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Registry {
    fn entry(&self, name: &str) -> Result<&Entry, ConfigurationError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ConfigurationError::UnknownEntry(name.to_string()))
    }

    /// Check that every dependency exists and the graph is acyclic.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for entry in &self.entries {
            for dep in &entry.depends_on {
                if !self.index.contains_key(dep) {
                    return Err(ConfigurationError::UnknownDependency {
                        entry: entry.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        fn visit(
            registry: &Registry,
            i: usize,
            marks: &mut [Mark],
            path: &mut Vec<usize>,
        ) -> Result<(), ConfigurationError> {
            match marks[i] {
                Mark::Done => return Ok(()),
                Mark::Active => {
                    let start = path.iter().position(|&p| p == i).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..]
                        .iter()
                        .map(|&p| registry.entries[p].name.clone())
                        .collect();
                    cycle.push(registry.entries[i].name.clone());
                    return Err(ConfigurationError::CyclicDependency { cycle });
                }
                Mark::New => {}
            }

            marks[i] = Mark::Active;
            path.push(i);
            for dep in &registry.entries[i].depends_on {
                visit(registry, registry.index[dep], marks, path)?;
            }
            path.pop();
            marks[i] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::New; self.entries.len()];
        let mut path = Vec::new();
        for i in 0..self.entries.len() {
            visit(self, i, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// Names of all entries, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    fn built(&self, name: &str, scope: EntryScope) -> Result<Built, ConfigurationError> {
        let entry = self.entry(name)?;

        let parent = CONSTRUCTING.with(|s| s.borrow().last().cloned());
        if let Some(parent) = parent {
            let declared = self
                .entry(&parent)
                .map(|p| p.depends_on.iter().any(|d| d == name))
                .unwrap_or(false);
            if !declared {
                return Err(ConfigurationError::UndeclaredDependency {
                    entry: parent,
                    dependency: name.to_string(),
                });
            }
        }

        if entry.scope != scope {
            return Err(ConfigurationError::EntryTypeMismatch {
                entry: name.to_string(),
                expected: scope.kind(),
            });
        }

        let mut slot = entry.built.lock();
        if let Some(built) = slot.as_ref() {
            return Ok(built.clone());
        }

        let built = {
            let _guard = ConstructionGuard::enter(name);
            (entry.factory)(self)?
        };
        debug!(entry = %name, kind = scope.kind(), "Registry entry constructed");
        *slot = Some(built.clone());
        Ok(built)
    }

    /// The process-wide instance of service `name`.
    pub fn service<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ConfigurationError> {
        self.built(name, EntryScope::Process)?
            .instance
            .downcast::<T>()
            .map_err(|_| ConfigurationError::EntryTypeMismatch {
                entry: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// The cache object behind entry `name`.
    pub fn cache<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<ScopedCache<T>>, ConfigurationError> {
        self.built(name, EntryScope::Guild)?
            .instance
            .downcast::<ScopedCache<T>>()
            .map_err(|_| ConfigurationError::EntryTypeMismatch {
                entry: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Value of cache `name` for `key`.
    pub async fn get<T: Send + Sync + 'static>(
        &self,
        name: &str,
        key: ScopeKey,
    ) -> Result<Arc<T>, ActionError> {
        let cache = self.cache::<T>(name)?;
        cache.get(key).await
    }

    /// Invalidate one key of cache `name`.
    pub async fn invalidate(&self, name: &str, key: ScopeKey) -> Result<(), ConfigurationError> {
        if let Some(cache) = self.built(name, EntryScope::Guild)?.cache {
            cache.invalidate(key).await;
        }
        Ok(())
    }

    /// Empty every constructed cache.
    pub async fn invalidate_all(&self) {
        let caches: Vec<_> = self
            .entries
            .iter()
            .filter_map(|e| e.built.lock().as_ref().and_then(|b| b.cache.clone()))
            .collect();
        for cache in caches {
            cache.invalidate_all().await;
        }
    }
}
