use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Helpers for `DashMap` that never hold a shard guard across `.await`.
///
/// Guards returned by `get()`, `entry()` and `iter()` hold a shard lock;
/// these helpers clone what they need and drop the guard before returning.
pub trait DashMapExt<K, V> {
    /// Clone the value for `key`.
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Clone the value for `key`, inserting `V::default()` first if absent.
    fn get_or_default_cloned(&self, key: K) -> V
    where
        V: Default + Clone;

    /// Snapshot of all values.
    fn values_cloned(&self) -> Vec<V>
    where
        V: Clone;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|r| r.value().clone())
    }

    fn get_or_default_cloned(&self, key: K) -> V
    where
        V: Default + Clone,
    {
        self.entry(key).or_default().value().clone()
    }

    fn values_cloned(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|e| e.value().clone()).collect()
    }
}
