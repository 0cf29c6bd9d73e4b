use crate::domain::model::CodeRecord;
use crate::domain::ports::TaxonomyProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Read-through cache in front of a [`TaxonomyProvider`].
///
/// Entries expire after `ttl`. Failed lookups are never cached, and a
/// zero TTL turns the cache into a pass-through.
pub struct CachedTaxonomy<P: TaxonomyProvider> {
    inner: P,
    ttl: Duration,
    categories: RwLock<Option<Entry<BTreeSet<String>>>>,
    records: RwLock<HashMap<String, Entry<Vec<CodeRecord>>>>,
}

impl<P: TaxonomyProvider> CachedTaxonomy<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            categories: RwLock::new(None),
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn invalidate(&self) {
        *self.categories.write().await = None;
        self.records.write().await.clear();
        tracing::debug!("Taxonomy cache invalidated");
    }

    fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

#[async_trait]
impl<P: TaxonomyProvider> TaxonomyProvider for CachedTaxonomy<P> {
    async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
        if !self.enabled() {
            return self.inner.distinct_categories().await;
        }

        if let Some(entry) = self.categories.read().await.as_ref() {
            if entry.is_fresh(self.ttl) {
                return Ok(entry.value.clone());
            }
        }

        let categories = self.inner.distinct_categories().await?;
        *self.categories.write().await = Some(Entry::new(categories.clone()));
        tracing::debug!("Cached {} taxonomy categories", categories.len());
        Ok(categories)
    }

    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        if !self.enabled() {
            return self.inner.find_records(categories).await;
        }

        let mut records = Vec::new();
        let mut missing = BTreeSet::new();
        {
            let cache = self.records.read().await;
            for category in categories {
                match cache.get(category) {
                    Some(entry) if entry.is_fresh(self.ttl) => {
                        records.extend(entry.value.iter().cloned())
                    }
                    _ => {
                        missing.insert(category.clone());
                    }
                }
            }
        }

        if missing.is_empty() {
            return Ok(records);
        }

        tracing::debug!("Taxonomy cache miss for {} categories", missing.len());
        let fetched = self.inner.find_records(&missing).await?;

        let mut grouped: HashMap<String, Vec<CodeRecord>> = missing
            .iter()
            .map(|category| (category.clone(), Vec::new()))
            .collect();
        for record in &fetched {
            if let Some(bucket) = grouped.get_mut(&record.category) {
                bucket.push(record.clone());
            }
        }

        let mut cache = self.records.write().await;
        for (category, bucket) in grouped {
            cache.insert(category, Entry::new(bucket));
        }
        drop(cache);

        records.extend(fetched);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MatchError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTaxonomy {
        records: Vec<CodeRecord>,
        category_calls: AtomicUsize,
        record_calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingTaxonomy {
        fn new() -> Self {
            Self {
                records: vec![
                    CodeRecord::new("Food", "Fruits", "Fresh apples and pears", "10000100"),
                    CodeRecord::new(
                        "Beverage",
                        "Soft Drinks",
                        "Carbonated cola drinks",
                        "20000100",
                    ),
                ],
                category_calls: AtomicUsize::new(0),
                record_calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl TaxonomyProvider for CountingTaxonomy {
        async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
            self.category_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(MatchError::ProviderError {
                    message: "offline".to_string(),
                });
            }
            Ok(self.records.iter().map(|r| r.category.clone()).collect())
        }

        async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
            self.record_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .records
                .iter()
                .filter(|r| categories.contains(&r.category))
                .cloned()
                .collect())
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_categories_are_served_from_cache() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::from_secs(60));

        let first = cache.distinct_categories().await.unwrap();
        let second = cache.distinct_categories().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_only_missing_categories_are_fetched() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::from_secs(60));

        let food = cache.find_records(&set(&["Food"])).await.unwrap();
        assert_eq!(food.len(), 1);

        let both = cache.find_records(&set(&["Food", "Beverage"])).await.unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(cache.inner().record_calls.load(Ordering::SeqCst), 2);

        cache.find_records(&set(&["Beverage", "Food"])).await.unwrap();
        assert_eq!(cache.inner().record_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_categories_are_cached() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::from_secs(60));

        assert!(cache.find_records(&set(&["Tobacco"])).await.unwrap().is_empty());
        assert!(cache.find_records(&set(&["Tobacco"])).await.unwrap().is_empty());
        assert_eq!(cache.inner().record_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::from_millis(20));

        cache.distinct_categories().await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.distinct_categories().await.unwrap();

        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_passes_through() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::ZERO);

        cache.distinct_categories().await.unwrap();
        cache.distinct_categories().await.unwrap();
        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached_and_invalidate_clears() {
        let cache = CachedTaxonomy::new(CountingTaxonomy::new(), Duration::from_secs(60));

        cache.inner().fail.store(true, Ordering::SeqCst);
        assert!(cache.distinct_categories().await.is_err());

        cache.inner().fail.store(false, Ordering::SeqCst);
        assert!(cache.distinct_categories().await.is_ok());
        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 2);

        cache.invalidate().await;
        cache.distinct_categories().await.unwrap();
        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_cache() {
        let cache = Arc::new(CachedTaxonomy::new(
            CountingTaxonomy::new(),
            Duration::from_secs(60),
        ));
        cache.distinct_categories().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.distinct_categories().await.unwrap().len()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 2);
        }
        assert_eq!(cache.inner().category_calls.load(Ordering::SeqCst), 1);
    }
}
