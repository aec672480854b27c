//! Integration tests for `RegistryClient` using wiremock HTTP mocks.

use carefind_clients::{ClientError, RegistryClient};
use carefind_core::ServiceArea;
use serde_json::json;
use wiremock::matchers::{method, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RegistryClient {
    RegistryClient::with_base_url(base_url, ServiceArea::default(), 100, 5, "carefind-test/0.1")
        .expect("client construction should not fail")
}

fn one_provider() -> serde_json::Value {
    json!({
        "result_count": 1,
        "results": [{
            "basic": {
                "organization_name": "CITY URGENT CARE PC",
                "last_updated": "2024-06-12"
            },
            "addresses": [
                {
                    "address_purpose": "MAILING",
                    "address_1": "PO BOX 1",
                    "city": "NEW YORK",
                    "state": "NY",
                    "postal_code": "100010000"
                },
                {
                    "address_purpose": "LOCATION",
                    "address_1": "85 5TH AVE",
                    "city": "NEW YORK",
                    "state": "NY",
                    "postal_code": "100033019",
                    "telephone_number": "212-993-7809"
                }
            ],
            "taxonomies": [
                { "desc": "Clinic/Center, Urgent Care", "primary": true }
            ]
        }]
    })
}

#[tokio::test]
async fn query_providers_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("taxonomy_description", "Urgent Care"))
        .and(query_param("postal_code", "10003"))
        .and(query_param("city", "New York"))
        .and(query_param("state", "NY"))
        .and(query_param("limit", "100"))
        .and(query_param("enumeration_type", "NPI-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_provider()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client
        .query_providers("Urgent Care", Some("10003"))
        .await
        .expect("should parse registry results");

    assert_eq!(results.len(), 1);
    let provider = &results[0];
    assert_eq!(
        provider.basic.organization_name.as_deref(),
        Some("CITY URGENT CARE PC")
    );
    assert_eq!(provider.addresses.len(), 2);
    assert_eq!(provider.addresses[1].address_purpose, "LOCATION");
    assert_eq!(
        provider.addresses[1].telephone_number.as_deref(),
        Some("212-993-7809")
    );
    assert!(provider.taxonomies[0].primary);
}

#[tokio::test]
async fn citywide_query_omits_postal_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param_is_missing("postal_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_provider()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client.query_providers("Urgent Care", None).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn zero_matches_is_empty_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result_count": 0, "results": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client
        .query_providers("Emergency Medicine", Some("10003"))
        .await
        .expect("zero matches should be Ok");
    assert!(results.is_empty());
}

#[tokio::test]
async fn errors_envelope_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Errors": [{
                "description": "Field postal_code requires at least 2 characters",
                "field": "postal_code",
                "number": "04"
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .query_providers("Urgent Care", Some("1"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { service, message } => {
            assert_eq!(service, "provider registry");
            assert!(message.contains("postal_code"), "message: {message}");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .query_providers("Urgent Care", Some("10003"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .query_providers("Urgent Care", Some("10003"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }), "got {err:?}");
}
