//! Typed error for a single block fetch attempt.

use thiserror::Error;

/// Error from one range request (transport failure or bad status). Carried
/// through the retry loop so it can be classified, and surfaced unchanged
/// once the attempt cap is reached.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (timeout, connection reset, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The response had a non-success status.
    #[error("HTTP {0}")]
    Http(u32),
}
