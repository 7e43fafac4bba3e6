//! HTTP cache validation module
//!
//! `ETag` / `Last-Modified` generation and conditional GET evaluation.

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// IMF-fixdate, the format HTTP uses for `Last-Modified`
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate a quoted `ETag` from file content
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a single tag, a comma-separated list, or `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(|e| e.trim().trim_start_matches("W/"))
            .any(|e| e == etag || e == "*")
    })
}

/// Format a modification time as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE).to_string()
}

/// True when `If-Modified-Since` is at or after `modified` (second precision).
/// An unparseable header never matches.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(|v| DateTime::parse_from_rfc2822(v.trim()).ok())
    else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

/// Decide whether a conditional GET can be answered with 304.
/// `If-None-Match` takes precedence over `If-Modified-Since` when both are sent.
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: Option<SystemTime>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }
    modified.is_some_and(|m| not_modified_since(if_modified_since, m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_etag_stable_and_content_sensitive() {
        assert_eq!(generate_etag(b"abc"), generate_etag(b"abc"));
        assert_ne!(generate_etag(b"abc"), generate_etag(b"abd"));
    }

    #[test]
    fn test_etag_match_variants() {
        let etag = generate_etag(b"asset");
        assert!(check_etag_match(Some(&etag), &etag));
        assert!(check_etag_match(Some(&format!("\"x\", {etag}")), &etag));
        assert!(check_etag_match(Some(&format!("W/{etag}")), &etag));
        assert!(check_etag_match(Some("*"), &etag));
        assert!(!check_etag_match(Some("\"other\""), &etag));
        assert!(!check_etag_match(None, &etag));
    }

    #[test]
    fn test_http_date_format() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_if_modified_since() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert!(not_modified_since(Some("Sun, 06 Nov 1994 08:49:37 GMT"), modified));
        assert!(not_modified_since(Some("Mon, 07 Nov 1994 08:49:37 GMT"), modified));
        assert!(!not_modified_since(Some("Sat, 05 Nov 1994 08:49:37 GMT"), modified));
        assert!(!not_modified_since(Some("yesterday"), modified));
        assert!(!not_modified_since(None, modified));
    }

    #[test]
    fn test_if_none_match_takes_precedence() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        let date = "Mon, 07 Nov 1994 08:49:37 GMT";
        assert!(!is_not_modified(Some("\"stale\""), Some(date), "\"fresh\"", Some(modified)));
        assert!(is_not_modified(None, Some(date), "\"fresh\"", Some(modified)));
    }
}
