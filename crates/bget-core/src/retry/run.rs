//! Retry loop: run a fetch closure until success or the policy says stop.

use std::time::Duration;

use super::classify::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the policy declines a further attempt, then
/// returns the last error. Retryable failures sleep for the (jittered)
/// backoff duration first.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    std::thread::sleep(with_jitter(d));
                    attempt += 1;
                }
            },
        }
    }
}

/// 50-100% of the computed delay, spreading simultaneous retries apart.
fn with_jitter(d: Duration) -> Duration {
    d.mul_f64(0.5 + rand::random::<f64>() * 0.5)
}
