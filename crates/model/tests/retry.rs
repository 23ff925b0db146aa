//! Retry policy classification and backoff timing.
//!
//! Runs under a paused tokio clock, so the backoff sleeps advance virtual
//! time and the elapsed assertions are exact.

use orca_model::{CallError, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn http(status: u16, body: &str) -> CallError {
    CallError::Http {
        status,
        body: body.to_owned(),
    }
}

#[tokio::test(start_paused = true)]
async fn rate_limit_retries_then_succeeds() {
    let policy = RetryPolicy::default();
    let attempts = AtomicUsize::new(0);
    let started = Instant::now();
    let value = policy
        .run(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(http(429, ""))
                } else {
                    Ok(7u32)
                }
            }
        })
        .await
        .unwrap();
    assert_eq!(value, 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_exhausts_the_budget() {
    let policy = RetryPolicy::default();
    let attempts = AtomicUsize::new(0);
    let started = Instant::now();
    let err = policy
        .run(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(http(429, "")) }
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    // Initial attempt plus three retries at 1s, 2s, 4s.
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(started.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn unavailable_is_retried() {
    let policy = RetryPolicy::default();
    let attempts = AtomicUsize::new(0);
    let value = policy
        .run(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(http(503, ""))
                } else {
                    Ok("up")
                }
            }
        })
        .await
        .unwrap();
    assert_eq!(value, "up");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn network_failure_is_retried() {
    let policy = RetryPolicy::default();
    let attempts = AtomicUsize::new(0);
    let value = policy
        .run(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(CallError::Network("connection reset".into()))
                } else {
                    Ok(1u8)
                }
            }
        })
        .await
        .unwrap();
    assert_eq!(value, 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_fails_immediately() {
    let policy = RetryPolicy::default();
    let attempts = AtomicUsize::new(0);
    let started = Instant::now();
    let err = policy
        .run(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(http(401, "")) }
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("invalid API credentials"));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn provider_error_message_is_surfaced() {
    let policy = RetryPolicy::default();
    let err = policy
        .run(|| async {
            Err::<(), _>(http(
                400,
                r#"{"error": {"message": "max_tokens is too large"}}"#,
            ))
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("max_tokens is too large"));
}

#[tokio::test(start_paused = true)]
async fn unparsable_error_body_falls_back_to_the_status() {
    let policy = RetryPolicy::default();
    let err = policy
        .run(|| async { Err::<(), _>(http(500, "<html>oops</html>")) })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}
