//! Upload (PUT) handler
//!
//! Writes the request body verbatim to the file at the mapped path, replacing
//! any previous content. Parent directories are never created.

use crate::config::AppState;
use crate::handler::path::{self, ResolveError};
use crate::http;
use crate::hook;
use crate::logger;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Request, Response, StatusCode};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Every way an upload can fail, each mapped to one response status
#[derive(Debug)]
pub enum UploadError {
    Resolve(ResolveError),
    NoFileName,
    MissingContentLength,
    InvalidContentLength(String),
    TooLarge { declared: u64, max: u64 },
    LengthMismatch { declared: u64, received: usize },
    Body(String),
    ParentMissing(PathBuf),
    IsDirectory(PathBuf),
    PermissionDenied(PathBuf),
    Io(io::Error),
}

impl UploadError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Resolve(ResolveError::Escape) | Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Resolve(ResolveError::Undecodable)
            | Self::NoFileName
            | Self::MissingContentLength
            | Self::InvalidContentLength(_)
            | Self::LengthMismatch { .. }
            | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ParentMissing(_) => StatusCode::NOT_FOUND,
            Self::IsDirectory(_) => StatusCode::CONFLICT,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        http::build_text_response(status, format!("{} {reason}: {self}\n", status.as_u16()))
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve(e) => write!(f, "{e}"),
            Self::NoFileName => write!(f, "upload path names a directory, not a file"),
            Self::MissingContentLength => write!(f, "Content-Length header is required"),
            Self::InvalidContentLength(v) => write!(f, "invalid Content-Length '{v}'"),
            Self::TooLarge { declared, max } => {
                write!(f, "body of {declared} bytes exceeds the {max} byte limit")
            }
            Self::LengthMismatch { declared, received } => write!(
                f,
                "Content-Length announced {declared} bytes but {received} were received"
            ),
            Self::Body(e) => write!(f, "failed to read request body: {e}"),
            Self::ParentMissing(p) => {
                write!(f, "parent directory of \"{}\" does not exist", p.display())
            }
            Self::IsDirectory(p) => write!(f, "\"{}\" is a directory", p.display()),
            Self::PermissionDenied(p) => write!(f, "permission denied writing \"{}\"", p.display()),
            Self::Io(e) => write!(f, "write failed: {e}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResolveError> for UploadError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

/// Handle a PUT request; never fails, errors become 4xx/5xx responses
pub async fn handle_put<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let url_path = req.uri().path().to_string();
    match save_upload(req, state).await {
        Ok((saved, bytes)) => {
            logger::log_upload_saved(&state.root, &saved, bytes);
            if let Some(command) = &state.config.upload.post_upload_hook {
                hook::spawn_post_upload(command.clone(), state.root.clone(), saved.clone());
            }
            http::build_201_response(&saved)
        }
        Err(e) => {
            logger::log_upload_rejected(&url_path, &e);
            e.into_response()
        }
    }
}

async fn save_upload<B>(req: Request<B>, state: &AppState) -> Result<(PathBuf, usize), UploadError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let url_path = req.uri().path();
    let target = path::resolve(&state.root, url_path, state.config.upload.enforce_root)?;
    if url_path.ends_with('/') || target == state.root {
        return Err(UploadError::NoFileName);
    }

    let declared = content_length(req.headers())?;
    let max = state.config.http.max_body_size;
    if declared > max {
        return Err(UploadError::TooLarge { declared, max });
    }

    let limit = usize::try_from(max).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                UploadError::TooLarge { declared, max }
            } else {
                UploadError::Body(e.to_string())
            }
        })?
        .to_bytes();

    if u64::try_from(body.len()).map_or(true, |n| n != declared) {
        return Err(UploadError::LengthMismatch {
            declared,
            received: body.len(),
        });
    }

    write_file(&target, &body).await?;
    Ok((target, body.len()))
}

/// Parse `Content-Length`; absent or non-numeric values are client errors
pub fn content_length(headers: &HeaderMap) -> Result<u64, UploadError> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or(UploadError::MissingContentLength)?;
    let text = value.to_str().map_err(|_| {
        UploadError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
    })?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| UploadError::InvalidContentLength(text.to_string()))
}

/// Create or truncate `target` and write `data` in one call
async fn write_file(target: &Path, data: &[u8]) -> Result<(), UploadError> {
    if tokio::fs::metadata(target).await.is_ok_and(|m| m.is_dir()) {
        return Err(UploadError::IsDirectory(target.to_path_buf()));
    }
    tokio::fs::write(target, data).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => UploadError::ParentMissing(target.to_path_buf()),
        io::ErrorKind::PermissionDenied => UploadError::PermissionDenied(target.to_path_buf()),
        _ => UploadError::Io(e),
    })
}
