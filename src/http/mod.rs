//! HTTP protocol layer module
//!
//! Protocol helpers shared by the GET and PUT handlers: response builders,
//! MIME detection, cache validators and response finalization.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

pub use response::{
    build_201_response, build_301_response, build_304_response,
    build_404_response, build_405_response, build_text_response,
};
