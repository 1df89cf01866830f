//! Single block fetch: one HTTP Range GET returning the body bytes.

use std::time::Duration;

use crate::planner::ByteRange;
use crate::retry::FetchError;

/// Fetches one byte range with a fixed per-attempt timeout.
///
/// Returns exactly the bytes the server sent for the range; callers must not
/// assume the length equals the block size (the last block is shorter, and
/// open-ended ranges return the rest of the file). Retry/backoff is the
/// caller's concern via [`crate::retry::run_with_retry`].
pub fn fetch_range(url: &str, range: &ByteRange, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.timeout(timeout)?;
    easy.range(&range.to_string())?;

    let mut body = Vec::with_capacity(range.len_hint().unwrap_or(0) as usize);
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()? as u32;
    // An open-ended range starting exactly at end-of-file is 416: the final
    // block's off-by-one slack. That tail block is simply empty.
    if code == 416 {
        return Ok(Vec::new());
    }
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(body)
}
