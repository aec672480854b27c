//! Domain types shared by the clients, the discovery pipeline, and the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format::{format_duration, meters_to_miles};
use crate::InputError;

/// Level of care a set of symptoms calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareTier {
    UrgentCare,
    EmergencyRoom,
}

impl CareTier {
    /// Taxonomy description the provider registry files this tier under.
    ///
    /// Emergency rooms are registered as "Emergency Medicine", not by the
    /// user-facing name.
    #[must_use]
    pub fn registry_description(self) -> &'static str {
        match self {
            CareTier::UrgentCare => "Urgent Care",
            CareTier::EmergencyRoom => "Emergency Medicine",
        }
    }
}

impl std::fmt::Display for CareTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CareTier::UrgentCare => write!(f, "Urgent Care"),
            CareTier::EmergencyRoom => write!(f, "Emergency Room"),
        }
    }
}

/// The single metropolitan area this deployment serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub city: String,
    pub state: String,
}

impl ServiceArea {
    #[must_use]
    pub fn new(city: &str, state: &str) -> Self {
        Self {
            city: city.trim().to_owned(),
            state: state.trim().to_uppercase(),
        }
    }

    /// Case-insensitive city match; the registry reports cities upper-cased.
    #[must_use]
    pub fn contains_city(&self, city: &str) -> bool {
        self.city.eq_ignore_ascii_case(city.trim())
    }
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self::new("New York", "NY")
    }
}

/// A structured postal address.
///
/// The postal code is always the 5-digit form; constructors reject anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl Address {
    /// Builds an address, trimming every field.
    ///
    /// `postal_code` may be a ZIP+4 value (`100033019` or `10003-3019`); only
    /// the leading five digits are kept.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyStreet`] for a blank street and
    /// [`InputError::InvalidPostalCode`] when the code does not start with five digits.
    pub fn new(
        street: &str,
        city: &str,
        state: &str,
        postal_code: &str,
    ) -> Result<Self, InputError> {
        let street = street.trim();
        if street.is_empty() {
            return Err(InputError::EmptyStreet);
        }
        let postal_code = normalize_postal_code(postal_code)
            .ok_or_else(|| InputError::InvalidPostalCode(postal_code.trim().to_owned()))?;

        Ok(Self {
            street: street.to_owned(),
            city: city.trim().to_owned(),
            state: state.trim().to_owned(),
            postal_code,
        })
    }

    /// Builds an address inside `area`, ignoring whatever city/state the caller had.
    ///
    /// # Errors
    ///
    /// Same as [`Address::new`].
    pub fn in_area(street: &str, postal_code: &str, area: &ServiceArea) -> Result<Self, InputError> {
        Self::new(street, &area.city, &area.state, postal_code)
    }

    /// Single-line form used for geocoder queries.
    #[must_use]
    pub fn query_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.postal_code
        )
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.street, self.city, self.state, self.postal_code
        )
    }
}

/// Returns the 5-digit prefix of a US postal code, or `None` if it has none.
#[must_use]
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let prefix: String = raw.trim().chars().take(5).collect();
    if prefix.len() == 5 && prefix.chars().all(|c| c.is_ascii_digit()) {
        Some(prefix)
    } else {
        None
    }
}

/// Decimal-degree coordinates. Only a successful geocode produces one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A facility the registry reports as offering the requested tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub care_tier: CareTier,
    pub organization_name: String,
    pub address: Address,
    pub phone: Option<String>,
    pub last_updated: NaiveDate,
    /// `None` until geocoded; candidates that stay `None` are dropped.
    pub geo: Option<GeoPoint>,
}

impl Candidate {
    /// Uniqueness key used by deduplication.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, Option<&str>) {
        (self.address.street.as_str(), self.phone.as_deref())
    }

    #[must_use]
    pub fn with_geo(mut self, geo: GeoPoint) -> Self {
        self.geo = Some(geo);
        self
    }
}

/// A geocoded candidate with its driving distance and time from the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Distance in miles rounded to two decimals; the sort key.
    pub distance_miles: f64,
}

impl RankedCandidate {
    #[must_use]
    pub fn new(candidate: Candidate, distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            candidate,
            distance_meters,
            duration_seconds,
            distance_miles: meters_to_miles(distance_meters),
        }
    }

    #[must_use]
    pub fn distance_label(&self) -> String {
        format!("{:.2} miles", self.distance_miles)
    }

    #[must_use]
    pub fn duration_label(&self) -> String {
        format_duration(self.duration_seconds)
    }
}
