use crate::adapters::memory::StaticTaxonomy;
use crate::core::{CodeRecord, Storage, TaxonomyProvider};
use crate::utils::error::{MatchError, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;

/// 快照檔案格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Header row `category,code,codeDescription,codeDefinition` (any order).
    Csv,
    /// Array of `{category, code, codeDescription, codeDefinition}` objects.
    Json,
}

impl SnapshotFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(SnapshotFormat::Csv),
            Some("json") => Ok(SnapshotFormat::Json),
            _ => Err(MatchError::InvalidConfigValueError {
                field: "taxonomy.path".to_string(),
                value: path.to_string(),
                reason: "Unsupported taxonomy file. Valid extensions: csv, json".to_string(),
            }),
        }
    }

    pub fn parse(&self, data: &[u8]) -> Result<Vec<CodeRecord>> {
        let records: Vec<CodeRecord> = match self {
            SnapshotFormat::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .trim(csv::Trim::All)
                    .from_reader(data);
                reader
                    .deserialize::<CodeRecord>()
                    .collect::<std::result::Result<_, _>>()?
            }
            SnapshotFormat::Json => serde_json::from_slice(data)?,
        };

        let total = records.len();
        let records: Vec<CodeRecord> = records
            .into_iter()
            .filter(|r| !r.category.trim().is_empty() && !r.code.trim().is_empty())
            .collect();
        if records.len() < total {
            tracing::warn!(
                "Skipped {} taxonomy rows without a category or code",
                total - records.len()
            );
        }
        Ok(records)
    }
}

/// Taxonomy provider backed by a snapshot file in a [`Storage`].
///
/// The snapshot is read on every call; wrap it in a
/// [`CachedTaxonomy`](crate::core::cache::CachedTaxonomy) to avoid that.
pub struct StoredTaxonomy<S: Storage> {
    storage: S,
    path: String,
    format: SnapshotFormat,
}

impl<S: Storage> StoredTaxonomy<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path)?;
        Ok(Self {
            storage,
            path,
            format,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn load(&self) -> Result<StaticTaxonomy> {
        tracing::debug!("Loading taxonomy snapshot from: {}", self.path);
        let data = self.storage.read_file(&self.path).await?;
        let records = self.format.parse(&data)?;
        tracing::debug!("Loaded {} taxonomy records", records.len());
        Ok(StaticTaxonomy::new(records))
    }
}

#[async_trait]
impl<S: Storage> TaxonomyProvider for StoredTaxonomy<S> {
    async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
        Ok(self.load().await?.categories())
    }

    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        Ok(self.load().await?.records_in(categories))
    }
}
