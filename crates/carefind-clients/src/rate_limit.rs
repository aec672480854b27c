//! Request pacing and retry for the geocoder.
//!
//! The geocoding service throttles clients, so every call goes through a
//! single [`RequestGate`] that spaces calls by a fixed minimum gap and lets
//! only one request be in flight at a time. The gate is created once per
//! process and handed to the [`Geocoder`](crate::Geocoder) explicitly.
//!
//! [`retry_with_backoff`] retries transient failures (timeouts, connection
//! errors, 429/5xx, malformed bodies). The registry, radius, and routing
//! clients do not retry; their failures are fatal to the run.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::error::ClientError;

/// Serializes calls and spaces their start times by at least `min_gap`.
#[derive(Debug)]
pub struct RequestGate {
    min_gap: Duration,
    last_start: Mutex<Option<Instant>>,
}

/// Held for the duration of one request; the next caller waits on it.
#[must_use = "the slot is released as soon as it is dropped"]
pub struct RequestSlot<'a> {
    _guard: MutexGuard<'a, Option<Instant>>,
}

impl RequestGate {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_start: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn from_millis(min_gap_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_gap_ms))
    }

    #[must_use]
    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Waits until the previous request has finished and `min_gap` has
    /// elapsed since it started, then claims the next slot.
    pub async fn acquire(&self) -> RequestSlot<'_> {
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
        RequestSlot { _guard: last }
    }
}

/// How many times to retry a transient failure and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `base * 2^(n-1)` ± 25 % jitter.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Retriable: timeouts, connection failures, HTTP 429 and 5xx, and bodies
/// that fail to deserialize (truncated responses under load).
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_body()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        ClientError::Deserialize { .. } => true,
        ClientError::Api { .. }
        | ClientError::InvalidResponse { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient errors up to `policy.max_retries` times.
///
/// Delay is capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "geocoder transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
