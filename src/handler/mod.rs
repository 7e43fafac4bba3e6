//! Request handler module
//!
//! Method dispatch plus the two behaviors the server has: static serving
//! (GET/HEAD) and uploads (PUT).

pub mod listing;
pub mod path;
pub mod router;
pub mod static_files;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
