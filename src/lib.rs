//! devserve: a development HTTP server.
//!
//! GET/HEAD serve files and directory listings from a root directory; PUT
//! writes the request body to the file at the request path. Optional
//! cross-origin isolation headers and a post-upload command are configured
//! through [`config::Config`].

pub mod cli;
pub mod config;
pub mod handler;
pub mod hook;
pub mod http;
pub mod logger;
pub mod server;
