pub mod cache;
pub mod matcher;
pub mod scoring;

pub use crate::domain::model::{CodeRecord, ScoredMatch};
pub use crate::domain::ports::{Storage, TaxonomyProvider};
pub use crate::utils::error::Result;
