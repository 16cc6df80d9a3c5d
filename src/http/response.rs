//! HTTP response building module
//!
//! Builders for the status codes the server emits. Builder failures are
//! logged and fall back to an empty response instead of panicking.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LOCATION};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::HttpResponse;
use crate::logger;

const JSON: &str = "application/json";

fn finish(builder: hyper::http::response::Builder, body: Bytes, what: &str) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build {what} response: {e}"));
        Response::new(Full::new(Bytes::new()))
    })
}

/// Serialize `body` as JSON with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(json) => finish(
            Response::builder()
                .status(status)
                .header(CONTENT_TYPE, JSON)
                .header(CONTENT_LENGTH, json.len()),
            Bytes::from(json),
            status.as_str(),
        ),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            json_error(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// 201 Created with a `Location` header
pub fn json_created<T: Serialize>(location: &str, body: &T) -> HttpResponse {
    let mut resp = json_response(StatusCode::CREATED, body);
    if resp.status() == StatusCode::CREATED {
        if let Ok(value) = location.parse() {
            resp.headers_mut().insert(LOCATION, value);
        }
    }
    resp
}

/// `{"error": "<reason phrase>"}` with no further detail
pub fn json_error(status: StatusCode) -> HttpResponse {
    let body = serde_json::json!({
        "error": status.canonical_reason().unwrap_or("Error"),
    })
    .to_string();

    finish(
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, JSON),
        Bytes::from(body),
        status.as_str(),
    )
}

/// Status line and headers only
pub fn empty_response(status: StatusCode) -> HttpResponse {
    finish(
        Response::builder()
            .status(status)
            .header(CONTENT_LENGTH, 0),
        Bytes::new(),
        status.as_str(),
    )
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(ETAG, etag)
            .header(CACHE_CONTROL, "public, max-age=3600"),
        Bytes::new(),
        "304",
    )
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, "text/plain"),
        Bytes::from("404 Not Found"),
        "404",
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(CONTENT_TYPE, "text/plain")
            .header(ALLOW, allow),
        Bytes::from("405 Method Not Allowed"),
        "405",
    )
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(allow: &str, enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, allow);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", allow)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    finish(builder, Bytes::new(), "OPTIONS")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::PAYLOAD_TOO_LARGE)
            .header(CONTENT_TYPE, "text/plain"),
        Bytes::from("413 Payload Too Large"),
        "413",
    )
}

/// Build static file response with cache validators
pub fn build_cached_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .header(ETAG, etag)
            .header(CACHE_CONTROL, "public, max-age=3600"),
        body,
        "200",
    )
}
