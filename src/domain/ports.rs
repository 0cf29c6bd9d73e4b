use crate::domain::model::CodeRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Lookup service over the classification taxonomy.
///
/// Neither operation guarantees an ordering of its results.
#[async_trait]
pub trait TaxonomyProvider: Send + Sync {
    /// All known category labels.
    async fn distinct_categories(&self) -> Result<BTreeSet<String>>;

    /// All records whose category is in `categories`.
    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>>;
}

#[async_trait]
impl<P: TaxonomyProvider + ?Sized> TaxonomyProvider for Arc<P> {
    async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
        (**self).distinct_categories().await
    }

    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        (**self).find_records(categories).await
    }
}
