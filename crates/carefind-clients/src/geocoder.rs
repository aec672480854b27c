//! Rate-limited client for the geocoding (Nominatim search) API.
//!
//! Every request passes through the shared [`RequestGate`], so calls are
//! serialized and spaced no closer than the gate's minimum gap, including
//! retries. A search with no hit is `Ok(None)`, not an error.

use std::sync::Arc;

use reqwest::{Client, Url};
use serde::Serialize;

use carefind_core::{Address, GeoPoint};

use crate::error::ClientError;
use crate::http;
use crate::rate_limit::{retry_with_backoff, RequestGate, RetryPolicy};
use crate::types::{GeocodeAddressParts, GeocodePlace};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// A free-text query resolved to its structured parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub postcode: Option<String>,
    pub point: GeoPoint,
}

impl ResolvedAddress {
    /// `"<house number> <road>"`, skipping whichever part is missing.
    #[must_use]
    pub fn street(&self) -> String {
        [self.house_number.as_deref(), self.road.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct Geocoder {
    client: Client,
    base_url: Url,
    gate: Arc<RequestGate>,
    retry: RetryPolicy,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        gate: Arc<RequestGate>,
        retry: RetryPolicy,
    ) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent, gate, retry)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        gate: Arc<RequestGate>,
        retry: RetryPolicy,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
            gate,
            retry,
        })
    }

    /// Geocodes a structured address. `Ok(None)` means the service had no match.
    ///
    /// # Errors
    ///
    /// Returns the last [`ClientError`] once transient failures have exhausted
    /// the retry policy, or immediately for non-retriable ones.
    pub async fn geocode(&self, address: &Address) -> Result<Option<GeoPoint>, ClientError> {
        let query = address.query_line();
        let place = self.search(&query, false).await?;
        place.map(|p| parse_point(&p, &query)).transpose()
    }

    /// Resolves free text to house number, road, postcode, and coordinates.
    ///
    /// # Errors
    ///
    /// Same as [`Geocoder::geocode`].
    pub async fn resolve(&self, query: &str) -> Result<Option<ResolvedAddress>, ClientError> {
        let Some(place) = self.search(query, true).await? else {
            return Ok(None);
        };
        let point = parse_point(&place, query)?;
        let GeocodeAddressParts {
            house_number,
            road,
            postcode,
        } = place.address.unwrap_or_default();
        Ok(Some(ResolvedAddress {
            house_number,
            road,
            postcode,
            point,
        }))
    }

    async fn search(
        &self,
        query: &str,
        address_details: bool,
    ) -> Result<Option<GeocodePlace>, ClientError> {
        let url = self.search_url(query, address_details)?;
        retry_with_backoff(self.retry, || {
            let url = url.clone();
            async move {
                let _slot = self.gate.acquire().await;
                tracing::debug!(query, "geocoding");
                let response = self.client.get(url).send().await?;
                let places: Vec<GeocodePlace> =
                    http::read_json(response, &format!("geocode(q={query})")).await?;
                Ok(places.into_iter().next())
            }
        })
        .await
    }

    fn search_url(&self, query: &str, address_details: bool) -> Result<Url, ClientError> {
        let mut url = http::join(&self.base_url, "search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("format", "jsonv2");
            pairs.append_pair("limit", "1");
            pairs.append_pair("addressdetails", if address_details { "1" } else { "0" });
        }
        Ok(url)
    }
}

fn parse_point(place: &GeocodePlace, query: &str) -> Result<GeoPoint, ClientError> {
    let parse = |raw: &str, axis: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| ClientError::InvalidResponse {
                context: format!("geocode(q={query})"),
                reason: format!("{axis} \"{raw}\" is not a number: {e}"),
            })
    };
    Ok(GeoPoint::new(parse(&place.lon, "lon")?, parse(&place.lat, "lat")?))
}
