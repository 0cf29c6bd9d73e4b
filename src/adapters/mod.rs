// Adapters layer: concrete implementations for external systems (taxonomy sources, storage).

pub mod http;
pub mod memory;
pub mod storage;
pub mod stored;

pub use http::HttpTaxonomyProvider;
pub use memory::StaticTaxonomy;
pub use storage::LocalStorage;
pub use stored::{SnapshotFormat, StoredTaxonomy};

#[cfg(feature = "lambda")]
pub use storage::S3Storage;
