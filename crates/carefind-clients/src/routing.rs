//! HTTP client for the routing distance-matrix API (Mapbox Matrix).
//!
//! One request covers the origin and every destination. The origin is the
//! only source, so the response holds a single row whose first column is the
//! origin's distance to itself.

use reqwest::{Client, Url};

use carefind_core::GeoPoint;

use crate::error::ClientError;
use crate::http;
use crate::types::MatrixResponse;

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";
const DEFAULT_PROFILE: &str = "mapbox/driving";
/// Origin plus destinations; the service rejects more coordinates than this.
pub const MAX_COORDINATES: usize = 25;

/// Driving distance and time from the origin to one destination.
///
/// `None` when the service found no route to that destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
}

pub struct RoutingClient {
    client: Client,
    base_url: Url,
    access_token: String,
    profile: String,
}

impl RoutingClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(access_token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token, timeout_secs, user_agent)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
            access_token: access_token.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
        })
    }

    /// Fetches driving distance and duration from `origin` to each destination
    /// in a single request. The result is aligned with `destinations`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidResponse`] if there are too many destinations,
    ///   or the matrix row does not line up with them.
    /// - [`ClientError::Api`] if the service reports a non-`Ok` code.
    /// - [`ClientError::Http`] on network failure or non-2xx status.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn distance_matrix(
        &self,
        origin: GeoPoint,
        destinations: &[GeoPoint],
    ) -> Result<Vec<RouteLeg>, ClientError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }
        if destinations.len() + 1 > MAX_COORDINATES {
            return Err(ClientError::InvalidResponse {
                context: "distance matrix request".to_owned(),
                reason: format!(
                    "{} destinations exceed the {} coordinate limit",
                    destinations.len(),
                    MAX_COORDINATES
                ),
            });
        }

        let url = self.matrix_url(origin, destinations)?;
        tracing::debug!(
            destinations = destinations.len(),
            "requesting distance matrix"
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: MatrixResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("distance matrix (HTTP {status})"),
                source: e,
            })?;

        if !status.is_success() || parsed.code != "Ok" {
            return Err(ClientError::Api {
                service: "routing",
                message: format!(
                    "{} (HTTP {}): {}",
                    parsed.code,
                    status.as_u16(),
                    parsed.message.as_deref().unwrap_or("no message")
                ),
            });
        }

        legs_from_matrix(&parsed, destinations.len())
    }

    fn matrix_url(&self, origin: GeoPoint, destinations: &[GeoPoint]) -> Result<Url, ClientError> {
        let coordinates = std::iter::once(origin)
            .chain(destinations.iter().copied())
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = http::join(
            &self.base_url,
            &format!("directions-matrix/v1/{}/{coordinates}", self.profile),
        )?;
        url.query_pairs_mut()
            .append_pair("sources", "0")
            .append_pair("annotations", "distance,duration")
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

/// Takes row 0 of both matrices, skips the origin's self column, and zips
/// distances with durations.
fn legs_from_matrix(matrix: &MatrixResponse, expected: usize) -> Result<Vec<RouteLeg>, ClientError> {
    let row = |name: &str, rows: &[Vec<Option<f64>>]| -> Result<Vec<Option<f64>>, ClientError> {
        let first = rows.first().ok_or_else(|| ClientError::InvalidResponse {
            context: "distance matrix".to_owned(),
            reason: format!("missing {name} row"),
        })?;
        if first.len() != expected + 1 {
            return Err(ClientError::InvalidResponse {
                context: "distance matrix".to_owned(),
                reason: format!(
                    "{name} row has {} columns, expected {}",
                    first.len(),
                    expected + 1
                ),
            });
        }
        Ok(first[1..].to_vec())
    };

    let distances = row("distances", &matrix.distances)?;
    let durations = row("durations", &matrix.durations)?;

    Ok(distances
        .into_iter()
        .zip(durations)
        .map(|(distance_meters, duration_seconds)| RouteLeg {
            distance_meters,
            duration_seconds,
        })
        .collect())
}
