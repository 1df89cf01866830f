//! Total-size discovery.
//!
//! Issues a tiny ranged GET (`Range: bytes=0-10`) and reads the full size
//! from the `Content-Range` response header's `/total` suffix. Servers that
//! omit the header (no range support) or fail the request make the job
//! terminally unprobeable; callers record it and move on.

mod parse;

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

/// Performs the probe request and returns the file's total size in bytes.
pub fn probe_size(url: &str) -> Result<u64> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(10))?;
    easy.timeout(Duration::from_secs(10))?;
    easy.range("0-10")?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        // The 11-byte body is probe waste; swallow it.
        transfer.write_function(|data| Ok(data.len()))?;
        transfer.perform().context("probe request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("probe of {} returned HTTP {}", url, code);
    }

    parse::content_range_total(&headers)
        .with_context(|| format!("{} sent no usable Content-Range header", url))
}
