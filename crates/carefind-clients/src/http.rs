//! Shared `reqwest` plumbing for the service clients.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ClientError;

/// Builds a `reqwest::Client` with the given overall timeout and `User-Agent`.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url`, ensuring it ends with exactly one slash so that
/// [`Url::join`] appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Joins a relative path onto a normalised base URL.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidBaseUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}

/// Asserts a 2xx status and parses the body as `T`.
///
/// `context` labels deserialization errors; it must not contain secrets.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, ClientError> {
    let response = response.error_for_status()?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://npiregistry.cms.hhs.gov/api").unwrap();
        assert_eq!(url.as_str(), "https://npiregistry.cms.hhs.gov/api/");
    }

    #[test]
    fn parse_base_url_collapses_repeated_slashes() {
        let url = parse_base_url("https://api.mapbox.com///").unwrap();
        assert_eq!(url.as_str(), "https://api.mapbox.com/");
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn join_appends_below_base_path() {
        let base = parse_base_url("https://www.zipcodeapi.com/rest").unwrap();
        let url = join(&base, "key/multi-radius.json/1/mile").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.zipcodeapi.com/rest/key/multi-radius.json/1/mile"
        );
    }
}
