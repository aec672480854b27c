//! Care discovery and ranking pipeline.
//!
//! classify symptoms → geocode the home address → discover candidate
//! facilities with adaptive radius expansion → rank by driving distance.

pub mod discovery;
pub mod error;
pub mod filter;
pub mod finder;
pub mod rank;

pub use discovery::{Discovery, DiscoveryConfig, DiscoveryEngine, SearchScope};
pub use error::PipelineError;
pub use filter::{accept_results, dedup_candidates};
pub use finder::{CareFinder, Recommendation};
pub use rank::{rank, rank_with_legs};
