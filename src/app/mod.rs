pub mod bootstrap;
pub mod service;

pub use bootstrap::{build_matcher, provider_from_source, SharedTaxonomy};
pub use service::{ErrorResponse, MatchRequest, MatchResponse, MatchService, Reply};
