use crate::adapters::{HttpTaxonomyProvider, LocalStorage, StoredTaxonomy};
use crate::config::{TaxonomySource, TomlConfig};
use crate::core::cache::CachedTaxonomy;
use crate::core::matcher::Matcher;
use crate::core::TaxonomyProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

pub type SharedTaxonomy = Arc<dyn TaxonomyProvider>;

pub fn provider_from_source(source: &TaxonomySource) -> Result<SharedTaxonomy> {
    let provider: SharedTaxonomy = match source {
        TaxonomySource::Http {
            endpoint,
            headers,
            timeout,
        } => {
            tracing::info!("🌐 Using taxonomy service at: {}", endpoint);
            let mut provider =
                HttpTaxonomyProvider::new(endpoint.clone()).with_headers(headers.clone());
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(*timeout);
            }
            Arc::new(provider)
        }
        TaxonomySource::File { path } => {
            tracing::info!("📁 Using taxonomy snapshot: {}", path);
            Arc::new(StoredTaxonomy::new(
                LocalStorage::new(".".to_string()),
                path.clone(),
            )?)
        }
    };
    Ok(provider)
}

/// Builds a matcher from a validated configuration, with the cache in
/// front of the provider when one is configured.
pub fn build_matcher(config: &TomlConfig) -> Result<Matcher<SharedTaxonomy>> {
    config.validate()?;

    let mut provider = provider_from_source(&config.taxonomy_source()?)?;
    if let Some(ttl) = config.cache_ttl() {
        tracing::info!("🗃️ Taxonomy cache enabled (ttl {:?})", ttl);
        provider = Arc::new(CachedTaxonomy::new(provider, ttl));
    }

    Ok(Matcher::new(provider, config.matcher_settings()?))
}
