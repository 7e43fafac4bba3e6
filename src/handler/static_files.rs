//! Static file serving module
//!
//! GET/HEAD: files, index files, generated directory listings, conditional requests.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::path;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::Metadata;
use std::path::Path;
use tokio::fs;

/// Serve a GET or HEAD request from the root directory
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let target = match path::resolve(&state.root, ctx.path, true) {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!("GET {} blocked: {e}", ctx.path));
            return http::build_404_response();
        }
    };

    let Ok(meta) = fs::metadata(&target).await else {
        return http::build_404_response();
    };

    if meta.is_dir() {
        return serve_directory(ctx, state, &target).await;
    }
    serve_file(ctx, &target, &meta).await
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &Path,
) -> Response<Full<Bytes>> {
    if !ctx.path.ends_with('/') {
        // a leading `//` would make the Location protocol-relative
        let path = format!("/{}", ctx.path.trim_start_matches('/'));
        let location = match ctx.query {
            Some(q) => format!("{path}/?{q}"),
            None => format!("{path}/"),
        };
        return http::build_301_response(&location);
    }

    for index_file in &state.config.routes.index_files {
        let index_path = dir.join(index_file);
        if let Ok(meta) = fs::metadata(&index_path).await {
            if meta.is_file() {
                return serve_file(ctx, &index_path, &meta).await;
            }
        }
    }

    if !state.config.routes.directory_listing {
        return http::build_404_response();
    }

    match listing::read_entries(dir).await {
        Ok(entries) => {
            http::response::build_html_response(listing::render(ctx.path, &entries), ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!("Cannot list '{}': {e}", dir.display()));
            http::build_404_response()
        }
    }
}

async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path, meta: &Metadata) -> Response<Full<Bytes>> {
    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    let modified = meta.modified().ok();
    let last_modified = modified.map(cache::http_date);

    if cache::is_not_modified(ctx.if_none_match, ctx.if_modified_since, &etag, modified) {
        return http::build_304_response(&etag, last_modified.as_deref());
    }

    http::response::build_file_response(
        Bytes::from(content),
        mime::content_type_for(file_path),
        &etag,
        last_modified.as_deref(),
        ctx.is_head,
    )
}
