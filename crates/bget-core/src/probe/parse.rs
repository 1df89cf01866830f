//! Extract the total size from collected response header lines.

/// Finds the `Content-Range` header and parses the total after the slash
/// (`bytes 0-10/4096` → 4096). Returns `None` when the header is missing or
/// the total is unknown (`*`).
pub(crate) fn content_range_total(lines: &[String]) -> Option<u64> {
    for line in lines {
        let (name, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => continue,
        };
        if !name.trim().eq_ignore_ascii_case("content-range") {
            continue;
        }
        let total = value.rsplit('/').next()?.trim();
        return total.parse().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_total_after_slash() {
        let headers = lines(&[
            "HTTP/1.1 206 Partial Content",
            "Content-Range: bytes 0-10/4096",
        ]);
        assert_eq!(content_range_total(&headers), Some(4096));
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let headers = lines(&["content-range: bytes 0-10/123"]);
        assert_eq!(content_range_total(&headers), Some(123));
    }

    #[test]
    fn missing_header_is_none() {
        let headers = lines(&["HTTP/1.1 200 OK", "Content-Length: 4096"]);
        assert_eq!(content_range_total(&headers), None);
    }

    #[test]
    fn unknown_total_is_none() {
        let headers = lines(&["Content-Range: bytes 0-10/*"]);
        assert_eq!(content_range_total(&headers), None);
    }
}
