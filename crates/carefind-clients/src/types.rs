//! Wire types for the external services.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Provider registry
// ---------------------------------------------------------------------------

/// Registry search response.
///
/// The registry reports request problems with HTTP 200 and an `Errors` array
/// instead of `result_count`/`results`.
#[derive(Debug, Deserialize)]
pub struct RegistryResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<ProviderResult>,
    #[serde(default, rename = "Errors")]
    pub errors: Vec<RegistryErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryErrorEntry {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

/// One organization returned by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResult {
    pub basic: ProviderBasic,
    #[serde(default)]
    pub addresses: Vec<ProviderAddress>,
    #[serde(default)]
    pub taxonomies: Vec<ProviderTaxonomy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderBasic {
    #[serde(default)]
    pub organization_name: Option<String>,
    /// `"YYYY-MM-DD"`.
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderAddress {
    /// `"LOCATION"` for the physical site, `"MAILING"` otherwise.
    #[serde(default)]
    pub address_purpose: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Often ZIP+4 without a hyphen, e.g. `"100033019"`.
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub telephone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTaxonomy {
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub primary: bool,
}

// ---------------------------------------------------------------------------
// Zip radius lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RadiusResponse {
    #[serde(default)]
    pub responses: Vec<RadiusEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RadiusEntry {
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub zip_codes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

/// One search hit. Coordinates arrive as decimal strings.
#[derive(Debug, Deserialize)]
pub struct GeocodePlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Option<GeocodeAddressParts>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeAddressParts {
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

// ---------------------------------------------------------------------------
// Routing distance matrix
// ---------------------------------------------------------------------------

/// Matrix response. Cells are `null` when no route exists.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub distances: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub durations: Vec<Vec<Option<f64>>>,
}
