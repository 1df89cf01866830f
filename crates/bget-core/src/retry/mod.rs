//! Bounded retry with exponential backoff.
//!
//! Classifies transport and HTTP failures, decides whether (and when) to
//! retry, and caps the attempt count so a dead server surfaces as a typed
//! per-block failure instead of spinning forever.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
