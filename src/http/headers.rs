//! Response finalization
//!
//! Headers added to every response on its way out, whatever produced it.

use hyper::header::{HeaderName, HeaderValue, SERVER};
use hyper::Response;

use crate::config::HttpConfig;

pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");

/// Apply `Server` and, when enabled, the cross-origin isolation pair
pub fn finalize<B>(response: &mut Response<B>, http: &HttpConfig) {
    let headers = response.headers_mut();

    if let Ok(name) = HeaderValue::from_str(&http.server_name) {
        headers.insert(SERVER, name);
    }

    if http.inject_coop_headers {
        headers.insert(
            CROSS_ORIGIN_OPENER_POLICY,
            HeaderValue::from_static("same-origin"),
        );
        headers.insert(
            CROSS_ORIGIN_EMBEDDER_POLICY,
            HeaderValue::from_static("require-corp"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_config(inject: bool) -> HttpConfig {
        HttpConfig {
            server_name: "devserve/test".to_string(),
            max_body_size: 1024,
            inject_coop_headers: inject,
        }
    }

    #[test]
    fn test_isolation_headers_when_enabled() {
        let mut resp = Response::new(());
        finalize(&mut resp, &http_config(true));
        assert_eq!(resp.headers()[CROSS_ORIGIN_OPENER_POLICY], "same-origin");
        assert_eq!(resp.headers()[CROSS_ORIGIN_EMBEDDER_POLICY], "require-corp");
        assert_eq!(resp.headers()[SERVER], "devserve/test");
    }

    #[test]
    fn test_no_isolation_headers_by_default() {
        let mut resp = Response::new(());
        finalize(&mut resp, &http_config(false));
        assert!(!resp.headers().contains_key(CROSS_ORIGIN_OPENER_POLICY));
        assert!(!resp.headers().contains_key(CROSS_ORIGIN_EMBEDDER_POLICY));
    }
}
