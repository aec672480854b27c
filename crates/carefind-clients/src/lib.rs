//! HTTP clients for the external services the care-discovery pipeline composes:
//! the provider registry, the zip-radius lookup, the geocoder, and the routing
//! distance matrix.

pub mod error;
pub mod geocoder;
mod http;
pub mod radius;
pub mod rate_limit;
pub mod registry;
pub mod routing;
pub mod types;

pub use error::ClientError;
pub use geocoder::{Geocoder, ResolvedAddress};
pub use radius::RadiusClient;
pub use rate_limit::{RequestGate, RetryPolicy};
pub use registry::RegistryClient;
pub use routing::{RouteLeg, RoutingClient};
pub use types::{ProviderAddress, ProviderBasic, ProviderResult, ProviderTaxonomy};
