//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache validators shared by the
//! todo API and static file handlers.

pub mod cache;
pub mod mime;
pub mod response;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Every handler answers with a fully buffered body
pub type HttpResponse = Response<Full<Bytes>>;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_options_response, empty_response, json_created, json_error, json_response,
};
