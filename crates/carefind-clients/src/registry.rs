//! HTTP client for the provider registry (NPI) search API.
//!
//! One call is one page: results beyond `result_limit` are not fetched. A
//! response with zero matches is a normal, empty result; transport failures
//! and registry-reported errors are returned to the caller, which treats them
//! as fatal. There is no retry at this layer.

use reqwest::{Client, Url};

use carefind_core::ServiceArea;

use crate::error::ClientError;
use crate::http;
use crate::types::{ProviderResult, RegistryResponse};

const DEFAULT_BASE_URL: &str = "https://npiregistry.cms.hhs.gov/api/";
const API_VERSION: &str = "2.1";
/// Organizations only; individual practitioners are `NPI-1`.
const ENUMERATION_TYPE: &str = "NPI-2";

pub struct RegistryClient {
    client: Client,
    base_url: Url,
    area: ServiceArea,
    result_limit: u32,
}

impl RegistryClient {
    /// Creates a client pointed at the production registry.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        area: ServiceArea,
        result_limit: u32,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, area, result_limit, timeout_secs, user_agent)
    }

    /// Creates a client with a custom base URL (config override or wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        area: ServiceArea,
        result_limit: u32,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
            area,
            result_limit,
        })
    }

    #[must_use]
    pub fn area(&self) -> &ServiceArea {
        &self.area
    }

    /// Searches organizations in the service area whose taxonomy matches
    /// `taxonomy_description`, optionally restricted to one postal code.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx status.
    /// - [`ClientError::Api`] if the registry answers with an `Errors` array.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn query_providers(
        &self,
        taxonomy_description: &str,
        postal_code: Option<&str>,
    ) -> Result<Vec<ProviderResult>, ClientError> {
        let url = self.build_url(taxonomy_description, postal_code);
        tracing::debug!(
            taxonomy = taxonomy_description,
            postal_code = postal_code.unwrap_or("<citywide>"),
            "querying provider registry"
        );

        let response = self.client.get(url).send().await?;
        let parsed: RegistryResponse = http::read_json(
            response,
            &format!(
                "registry search(taxonomy={taxonomy_description}, postal_code={})",
                postal_code.unwrap_or("")
            ),
        )
        .await?;

        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .iter()
                .map(|e| match (&e.field, &e.description) {
                    (Some(field), Some(desc)) => format!("{field}: {desc}"),
                    (None, Some(desc)) => desc.clone(),
                    (Some(field), None) => field.clone(),
                    (None, None) => "unknown error".to_owned(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ClientError::Api {
                service: "provider registry",
                message,
            });
        }

        if parsed.result_count as usize > parsed.results.len() {
            tracing::debug!(
                result_count = parsed.result_count,
                returned = parsed.results.len(),
                "registry reported more matches than one page holds"
            );
        }

        Ok(parsed.results)
    }

    fn build_url(&self, taxonomy_description: &str, postal_code: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("version", API_VERSION);
            pairs.append_pair("enumeration_type", ENUMERATION_TYPE);
            pairs.append_pair("taxonomy_description", taxonomy_description);
            pairs.append_pair("address_purpose", "LOCATION");
            pairs.append_pair("city", &self.area.city);
            pairs.append_pair("state", &self.area.state);
            if let Some(code) = postal_code {
                pairs.append_pair("postal_code", code);
            }
            pairs.append_pair("limit", &self.result_limit.to_string());
        }
        url
    }
}
