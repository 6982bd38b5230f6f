//! Target URL normalization.

use crate::error_handling::ScanError;

/// Maximum accepted target length.
const MAX_URL_LENGTH: usize = 2048;

/// Normalizes a scan target into a base URL ending in exactly one slash.
///
/// Adds `https://` when the scheme is missing and converts IDN hostnames to
/// their ASCII form. Query and fragment are dropped, since probe paths are
/// appended to the result.
///
/// # Errors
///
/// Returns `ScanError::InvalidTarget` for unparsable URLs, URLs without a
/// host, schemes other than http/https and URLs longer than 2048 characters.
pub fn normalize_target(raw: &str) -> Result<String, ScanError> {
    let raw = raw.trim();
    if raw.len() > MAX_URL_LENGTH {
        return Err(ScanError::InvalidTarget(format!(
            "URL exceeds {} characters",
            MAX_URL_LENGTH
        )));
    }

    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut parsed = url::Url::parse(&with_scheme)
        .map_err(|e| ScanError::InvalidTarget(format!("{raw}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScanError::InvalidTarget(format!(
            "unsupported scheme {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScanError::InvalidTarget(format!("{raw}: missing host")));
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    let base = parsed.as_str().trim_end_matches('/');
    Ok(format!("{base}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_adds_https_and_slash() {
        assert_eq!(
            normalize_target("example.org").expect("valid"),
            "https://example.org/"
        );
    }

    #[test]
    fn test_normalize_keeps_http_and_path() {
        assert_eq!(
            normalize_target("http://example.org/blog").expect("valid"),
            "http://example.org/blog/"
        );
    }

    #[test]
    fn test_normalize_collapses_trailing_slashes() {
        assert_eq!(
            normalize_target("https://example.org/blog///").expect("valid"),
            "https://example.org/blog/"
        );
    }

    #[test]
    fn test_normalize_converts_idn_host() {
        assert_eq!(
            normalize_target("https://münchen.de").expect("valid"),
            "https://xn--mnchen-3ya.de/"
        );
    }

    #[test]
    fn test_normalize_drops_query_and_fragment() {
        assert_eq!(
            normalize_target("example.org:8080/site?x=1#top").expect("valid"),
            "https://example.org:8080/site/"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_target("not a url at all!!!"),
            Err(ScanError::InvalidTarget(_))
        ));
        assert!(normalize_target("").is_err());
    }

    #[test]
    fn test_normalize_rejects_too_long_url() {
        let url = format!("https://example.org/{}", "a".repeat(2100));
        assert!(normalize_target(&url).is_err());
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(domain in "[a-z]{3,20}\\.[a-z]{2,5}", path in "(/[a-z]{1,8}){0,3}") {
            let first = normalize_target(&format!("{}{}", domain, path)).expect("valid");
            let second = normalize_target(&first).expect("valid");
            prop_assert!(first.ends_with('/'));
            prop_assert!(!first.ends_with("//"));
            prop_assert_eq!(first, second);
        }
    }
}
