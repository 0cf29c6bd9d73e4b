pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use adapters::{HttpTaxonomyProvider, LocalStorage, StaticTaxonomy, StoredTaxonomy};
pub use app::{MatchRequest, MatchResponse, MatchService};
pub use crate::core::cache::CachedTaxonomy;
pub use crate::core::matcher::{Matcher, MatcherSettings};
pub use domain::model::{CodeRecord, ScoredMatch};
pub use domain::ports::TaxonomyProvider;
pub use utils::error::{MatchError, Result};
