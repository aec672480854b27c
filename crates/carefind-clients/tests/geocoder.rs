//! Integration tests for the rate-limited `Geocoder`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use carefind_clients::{ClientError, Geocoder, RequestGate, RetryPolicy};
use carefind_core::{Address, ServiceArea};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_geocoder(base_url: &str, gate_ms: u64, retry: RetryPolicy) -> Geocoder {
    Geocoder::with_base_url(
        base_url,
        5,
        "carefind-test/0.1",
        Arc::new(RequestGate::from_millis(gate_ms)),
        retry,
    )
    .expect("geocoder construction should not fail")
}

fn address() -> Address {
    Address::in_area("85 5TH AVE", "10003", &ServiceArea::default()).unwrap()
}

fn hit() -> serde_json::Value {
    json!([{
        "lat": "40.7383463",
        "lon": "-73.9824559",
        "address": {
            "house_number": "85",
            "road": "5th Avenue",
            "postcode": "10003"
        }
    }])
}

#[tokio::test]
async fn geocode_returns_point() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "85 5TH AVE, New York, NY 10003"))
        .and(query_param("format", "jsonv2"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit()))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server.uri(), 0, RetryPolicy::none());
    let point = geocoder
        .geocode(&address())
        .await
        .expect("geocode should succeed")
        .expect("should find a point");

    assert!((point.latitude - 40.738_346_3).abs() < 1e-9);
    assert!((point.longitude + 73.982_455_9).abs() < 1e-9);
}

#[tokio::test]
async fn geocode_miss_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server.uri(), 0, RetryPolicy::none());
    let result = geocoder.geocode(&address()).await.expect("miss is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn resolve_returns_structured_parts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("addressdetails", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit()))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server.uri(), 0, RetryPolicy::none());
    let resolved = geocoder
        .resolve("85 fifth ave manhattan")
        .await
        .unwrap()
        .expect("should resolve");

    assert_eq!(resolved.street(), "85 5th Avenue");
    assert_eq!(resolved.postcode.as_deref(), Some("10003"));
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit()))
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 0,
    };
    let geocoder = test_geocoder(&server.uri(), 0, retry);
    let point = geocoder.geocode(&address()).await.unwrap();
    assert!(point.is_some());
}

#[tokio::test]
async fn persistent_failure_surfaces_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 2,
        backoff_base_ms: 0,
    };
    let geocoder = test_geocoder(&server.uri(), 0, retry);
    let err = geocoder.geocode(&address()).await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn consecutive_calls_respect_minimum_gap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit()))
        .expect(3)
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server.uri(), 100, RetryPolicy::none());
    let started = Instant::now();
    for _ in 0..3 {
        geocoder.geocode(&address()).await.unwrap();
    }
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "three calls with a 100ms gap took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn non_numeric_coordinates_are_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "lat": "n/a", "lon": "n/a" }])),
        )
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server.uri(), 0, RetryPolicy::none());
    let err = geocoder.geocode(&address()).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}
