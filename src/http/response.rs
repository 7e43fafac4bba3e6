//! HTTP response building module
//!
//! Builders for the status codes the server produces, decoupled from request handling.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED, LOCATION};
use hyper::{Response, StatusCode};
use std::path::Path;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD, PUT";

/// Build a plain-text response with the given status
pub fn build_text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let body = body.into();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 201 Created response confirming an upload
pub fn build_201_response(saved: &Path) -> Response<Full<Bytes>> {
    build_text_response(
        StatusCode::CREATED,
        format!("Saved \"{}\"\n", saved.display()),
    )
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_301_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::MOVED_PERMANENTLY, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(lm) = last_modified {
        builder = builder.header(LAST_MODIFIED, lm);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error(StatusCode::NOT_MODIFIED, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found\n")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let body = Bytes::from_static(b"405 Method Not Allowed\n");
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, body.len())
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::METHOD_NOT_ALLOWED, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build an HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 200 file response carrying cache validators
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, "no-cache");
    if let Some(lm) = last_modified {
        builder = builder.header(LAST_MODIFIED, lm);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(StatusCode::OK, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_201_body_is_exact() {
        let resp = build_201_response(Path::new("/srv/www/a.txt"));
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Saved \"/srv/www/a.txt\"\n");
    }

    #[test]
    fn test_405_lists_methods() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_head_file_keeps_length() {
        let resp = build_file_response(Bytes::from_static(b"hello"), "text/plain", "\"1\"", None, true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "5");
        assert!(!resp.headers().contains_key(LAST_MODIFIED));
    }
}
