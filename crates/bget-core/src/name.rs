//! Display-name derivation for a download.

/// Output filename for a job without an explicit name: the URL's last
/// non-empty path segment, or a fixed fallback for root/opaque URLs.
pub fn display_name(url: &str) -> String {
    from_url_path(url).unwrap_or_else(|| "download.bin".to_string())
}

fn from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_wins() {
        assert_eq!(
            display_name("https://example.com/pub/iso/disk.img"),
            "disk.img"
        );
        assert_eq!(display_name("https://example.com/one"), "one");
    }

    #[test]
    fn query_is_not_part_of_the_name() {
        assert_eq!(
            display_name("https://example.com/file.zip?token=abc"),
            "file.zip"
        );
    }

    #[test]
    fn root_and_unparseable_fall_back() {
        assert_eq!(display_name("https://example.com/"), "download.bin");
        assert_eq!(display_name("https://example.com"), "download.bin");
        assert_eq!(display_name("not a url"), "download.bin");
    }
}
