//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, response
//! finalization and access logging. Every failure is turned into a response
//! here, so nothing propagates to the connection.

use crate::config::AppState;
use crate::handler::{static_files, upload};
use crate::http::{self, headers};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for GET/HEAD serving
pub struct RequestContext<'a> {
    /// Raw (percent-encoded) URL path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, remote_addr));

    let (parts, body) = req.into_parts();
    let mut response = match parts.method {
        Method::GET | Method::HEAD => {
            let response = serve_static(&parts, &state).await;
            if state.config.logging.show_headers && parts.method == Method::GET {
                logger::log_request_headers(&parts.headers);
            }
            response
        }
        Method::PUT => upload::handle_put(Request::from_parts(parts, body), &state).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", parts.method));
            http::build_405_response()
        }
    };

    headers::finalize(&mut response, &state.config.http);

    if let Some(mut entry) = access {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn serve_static(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    let ctx = RequestContext {
        path: parts.uri.path(),
        query: parts.uri.query(),
        is_head: parts.method == Method::HEAD,
        if_none_match: header_str(&parts.headers, &IF_NONE_MATCH),
        if_modified_since: header_str(&parts.headers, &IF_MODIFIED_SINCE),
    };
    static_files::serve(&ctx, state).await
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_str(req.headers(), &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), &USER_AGENT).map(ToString::to_string);
    entry
}
