//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body size validation, route
//! matching, dispatch to the todo API or static files, and access logging.

use crate::config::AppState;
use crate::handler::{static_files, todos};
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::model::{NewTodo, TodoPatch};
use crate::routing::{self, RouteMatch, TodoRoute};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_LENGTH, IF_NONE_MATCH, SERVER, USER_AGENT};
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const STATIC_METHODS: &str = "GET, HEAD, OPTIONS";

/// Request details needed by the static file handler
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state.access_log().then(|| start_access_entry(&req, remote_addr));

    let mut response = route_request(req, &state).await;

    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        headers.insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn start_access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}

const fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    let path = req.uri().path().to_string();
    match routing::match_route(&path) {
        RouteMatch::Todos(route) => dispatch_todo(req, route, state).await,
        RouteMatch::UnknownTodo => http::build_404_response(),
        RouteMatch::Static => serve_static(req, state).await,
    }
}

/// Reject requests whose declared Content-Length exceeds the limit
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()?;

    (declared > max_body_size).then(|| {
        logger::log_warning(&format!(
            "Request body too large: {declared} bytes (max: {max_body_size})"
        ));
        http::build_413_response()
    })
}

/// The todo dispatch table
async fn dispatch_todo<B>(req: Request<B>, route: TodoRoute<'_>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let store = state.store.as_ref();
    let limit = state.config.http.max_body_size;
    let method = req.method().clone();

    match (&method, route) {
        (&Method::POST, TodoRoute::Collection) => {
            match todos::decode_json::<NewTodo, _>(req, limit).await {
                Ok(input) => todos::create(store, input).await,
                Err(resp) => resp,
            }
        }
        (&Method::GET | &Method::HEAD, TodoRoute::Collection) => todos::list(store).await,
        (&Method::DELETE, TodoRoute::Collection) => todos::delete_all(store).await,
        (&Method::GET | &Method::HEAD, TodoRoute::Item(id)) => todos::find(store, id).await,
        (&Method::PUT | &Method::PATCH, TodoRoute::Item(id)) => {
            match todos::decode_json::<TodoPatch, _>(req, limit).await {
                Ok(patch) => todos::update(store, id, patch).await,
                Err(resp) => resp,
            }
        }
        (&Method::DELETE, TodoRoute::Item(id)) => todos::delete(store, id).await,
        (&Method::OPTIONS, route) => {
            http::build_options_response(route.allowed_methods(), state.config.http.enable_cors)
        }
        (method, route) => {
            logger::log_warning(&format!("Method not allowed on todo route: {method}"));
            http::build_405_response(route.allowed_methods())
        }
    }
}

async fn serve_static<B>(req: Request<B>, state: &AppState) -> HttpResponse {
    match req.method() {
        &Method::GET | &Method::HEAD => {}
        &Method::OPTIONS => {
            return http::build_options_response(STATIC_METHODS, state.config.http.enable_cors)
        }
        method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_405_response(STATIC_METHODS);
        }
    }

    let ctx = RequestContext {
        path: req.uri().path(),
        is_head: req.method() == Method::HEAD,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    static_files::serve(&ctx, &state.config.static_files).await
}
