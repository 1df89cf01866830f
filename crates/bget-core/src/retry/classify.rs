//! Map curl errors and HTTP statuses onto retry error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify a fetch error into an [`ErrorKind`].
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
    }
}

/// Classify an HTTP status code. Throttling statuses are separated from
/// other 5xx so an adaptive caller could slow down rather than just retry.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error: timeouts and transport-level failures retry,
/// everything else (bad URL, unsupported protocol, ...) is terminal.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_statuses() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(matches!(classify_http_status(500), ErrorKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), ErrorKind::Http5xx(502)));
    }

    #[test]
    fn client_errors_are_terminal() {
        assert_eq!(classify_http_status(403), ErrorKind::Other);
        assert_eq!(classify_http_status(404), ErrorKind::Other);
        assert_eq!(classify_http_status(416), ErrorKind::Other);
    }

    #[test]
    fn http_fetch_errors_classify_by_status() {
        assert_eq!(classify(&FetchError::Http(503)), ErrorKind::Throttled);
        assert_eq!(classify(&FetchError::Http(404)), ErrorKind::Other);
    }
}
