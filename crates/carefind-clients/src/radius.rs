//! HTTP client for the zip-code radius lookup service.

use std::collections::HashSet;

use reqwest::{Client, Url};

use crate::error::ClientError;
use crate::http;
use crate::types::RadiusResponse;

const DEFAULT_BASE_URL: &str = "https://www.zipcodeapi.com/rest/";

/// Looks up postal codes within a radius of another postal code.
///
/// The API key is a path segment, so request URLs are never logged.
pub struct RadiusClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RadiusClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout_secs, user_agent)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
            api_key: api_key.to_owned(),
        })
    }

    /// Returns every postal code within `radius_miles` of `postal_code`,
    /// always including `postal_code` itself.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx status.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn expand_radius(
        &self,
        postal_code: &str,
        radius_miles: u32,
    ) -> Result<HashSet<String>, ClientError> {
        let url = http::join(
            &self.base_url,
            &format!("{}/multi-radius.json/{radius_miles}/mile", self.api_key),
        )?;
        tracing::debug!(postal_code, radius_miles, "querying zip radius service");

        let response = self
            .client
            .post(url)
            .form(&[("zip_codes", postal_code)])
            .send()
            .await?;
        let parsed: RadiusResponse = http::read_json(
            response,
            &format!("radius lookup(postal_code={postal_code}, radius={radius_miles})"),
        )
        .await?;

        let mut codes: HashSet<String> = parsed
            .responses
            .into_iter()
            .flat_map(|entry| entry.zip_codes)
            .collect();
        codes.insert(postal_code.to_owned());

        tracing::debug!(
            postal_code,
            radius_miles,
            nearby = codes.len(),
            "zip radius lookup complete"
        );
        Ok(codes)
    }
}
