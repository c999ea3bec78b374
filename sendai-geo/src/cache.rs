//! Division lookup and read-through caching
//!
//! Division rows are reference data, effectively immutable within a running
//! process, and the matcher looks the same handful of divisions up for every
//! record it filters. The cache is an explicit injected object rather than a
//! module-level map, so tests control and reset it deterministically.

use sendai_core::{Division, RefId, SendaiResult, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Source of division rows. Implemented by the store; the matcher only ever
/// reads through this trait.
pub trait DivisionProvider: Send + Sync {
    /// Fetch a division by id. Absence is `Ok(None)`, not an error.
    fn division_by_id(&self, id: RefId) -> SendaiResult<Option<Division>>;
}

impl<T: DivisionProvider + ?Sized> DivisionProvider for &T {
    fn division_by_id(&self, id: RefId) -> SendaiResult<Option<Division>> {
        (**self).division_by_id(id)
    }
}

/// Configuration for the division cache.
#[derive(Debug, Clone)]
pub struct DivisionCacheConfig {
    /// Maximum number of cached divisions. Inserts are dropped once full;
    /// division sets are small enough that eviction churn is not worth it.
    pub max_entries: usize,
}

impl Default for DivisionCacheConfig {
    fn default() -> Self {
        Self { max_entries: 4096 }
    }
}

impl DivisionCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached divisions.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

/// Hit/miss counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Read-through cache over a `DivisionProvider`.
///
/// Populated on first miss, never invalidated implicitly; call `clear` after
/// administrative edits to division reference data. Only present rows are
/// cached, so a division inserted later is still found.
pub struct DivisionCache<P: DivisionProvider> {
    provider: P,
    config: DivisionCacheConfig,
    entries: RwLock<HashMap<RefId, Division>>,
    stats: RwLock<CacheStats>,
}

impl<P: DivisionProvider> DivisionCache<P> {
    pub fn new(provider: P, config: DivisionCacheConfig) -> Self {
        Self {
            provider,
            config,
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn with_defaults(provider: P) -> Self {
        Self::new(provider, DivisionCacheConfig::default())
    }

    /// Drop every cached entry and reset the counters.
    pub fn clear(&self) -> SendaiResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        *self.stats.write().map_err(|_| StoreError::LockPoisoned)? = CacheStats::default();
        Ok(())
    }

    pub fn stats(&self) -> SendaiResult<CacheStats> {
        Ok(*self.stats.read().map_err(|_| StoreError::LockPoisoned)?)
    }

    pub fn len(&self) -> SendaiResult<usize> {
        Ok(self.entries.read().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    pub fn is_empty(&self) -> SendaiResult<bool> {
        Ok(self.len()? == 0)
    }

    fn record_hit(&self) -> SendaiResult<()> {
        self.stats.write().map_err(|_| StoreError::LockPoisoned)?.hits += 1;
        Ok(())
    }

    fn record_miss(&self) -> SendaiResult<()> {
        self.stats.write().map_err(|_| StoreError::LockPoisoned)?.misses += 1;
        Ok(())
    }
}

impl<P: DivisionProvider> DivisionProvider for DivisionCache<P> {
    fn division_by_id(&self, id: RefId) -> SendaiResult<Option<Division>> {
        {
            let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(division) = entries.get(&id) {
                let division = division.clone();
                drop(entries);
                self.record_hit()?;
                return Ok(Some(division));
            }
        }
        self.record_miss()?;
        let fetched = self.provider.division_by_id(id)?;
        if let Some(division) = &fetched {
            let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
            if entries.len() < self.config.max_entries {
                entries.insert(id, division.clone());
            }
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingProvider {
        divisions: StdHashMap<RefId, Division>,
        fetches: AtomicU64,
    }

    impl CountingProvider {
        fn with_division(id: RefId) -> Self {
            let mut names = StdHashMap::new();
            names.insert("en".to_string(), format!("Division {id}"));
            let mut divisions = StdHashMap::new();
            divisions.insert(
                id,
                Division {
                    id,
                    parent_id: None,
                    level: 1,
                    names,
                    geometry: None,
                },
            );
            Self {
                divisions,
                fetches: AtomicU64::new(0),
            }
        }

        fn fetch_count(&self) -> u64 {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl DivisionProvider for CountingProvider {
        fn division_by_id(&self, id: RefId) -> SendaiResult<Option<Division>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.divisions.get(&id).cloned())
        }
    }

    #[test]
    fn test_second_read_is_served_from_cache() {
        let provider = CountingProvider::with_division(7);
        let cache = DivisionCache::with_defaults(&provider);

        assert!(cache.division_by_id(7).unwrap().is_some());
        assert!(cache.division_by_id(7).unwrap().is_some());

        assert_eq!(provider.fetch_count(), 1);
        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_absent_division_is_not_negatively_cached() {
        let provider = CountingProvider::with_division(7);
        let cache = DivisionCache::with_defaults(&provider);

        assert!(cache.division_by_id(99).unwrap().is_none());
        assert!(cache.division_by_id(99).unwrap().is_none());

        // Both reads hit the provider: absence is never cached.
        assert_eq!(provider.fetch_count(), 2);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_clear_resets_entries_and_stats() {
        let provider = CountingProvider::with_division(7);
        let cache = DivisionCache::with_defaults(&provider);

        cache.division_by_id(7).unwrap();
        assert_eq!(cache.len().unwrap(), 1);

        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.stats().unwrap(), CacheStats::default());

        cache.division_by_id(7).unwrap();
        assert_eq!(provider.fetch_count(), 2);
    }

    #[test]
    fn test_full_cache_drops_new_inserts_but_still_serves_reads() {
        let mut provider = CountingProvider::with_division(1);
        let two = Division {
            id: 2,
            parent_id: None,
            level: 1,
            names: StdHashMap::new(),
            geometry: None,
        };
        provider.divisions.insert(2, two);
        let cache = DivisionCache::new(&provider, DivisionCacheConfig::new().with_max_entries(1));

        assert!(cache.division_by_id(1).unwrap().is_some());
        assert!(cache.division_by_id(2).unwrap().is_some());
        assert_eq!(cache.len().unwrap(), 1);

        // Reads past capacity keep working, read-through each time.
        assert!(cache.division_by_id(2).unwrap().is_some());
        assert_eq!(provider.fetch_count(), 3);
    }
}
