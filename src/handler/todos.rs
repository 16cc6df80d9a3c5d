//! Todo API handlers
//!
//! Each handler calls one `TodoStore` operation and renders the outcome.
//! `NotFound` becomes 404; every other store failure is logged and answered
//! with a bare 500.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Request, StatusCode};
use serde::de::DeserializeOwned;

use crate::http::{self, HttpResponse};
use crate::logger;
use crate::model::{NewTodo, TodoPatch};
use crate::repository::{StoreError, TodoStore};

/// Read at most `limit` bytes of the body and decode them as JSON.
///
/// Oversized bodies get 413, unreadable or malformed ones 400.
pub async fn decode_json<T, B>(req: Request<B>, limit: u64) -> Result<T, HttpResponse>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeds {limit} bytes"));
            return Err(http::build_413_response());
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(http::json_error(StatusCode::BAD_REQUEST));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        logger::log_warning(&format!("Malformed JSON body: {e}"));
        http::json_error(StatusCode::BAD_REQUEST)
    })
}

fn store_error(err: &StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound => http::json_error(StatusCode::NOT_FOUND),
        other => {
            logger::log_error(&format!("Todo store failure: {other}"));
            http::json_error(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn create(store: &dyn TodoStore, input: NewTodo) -> HttpResponse {
    match store.create(input).await {
        Ok(todo) => {
            logger::log_debug(&format!("Created todo {}", todo.id));
            http::json_created(&todo.location(), &todo)
        }
        Err(e) => store_error(&e),
    }
}

pub async fn list(store: &dyn TodoStore) -> HttpResponse {
    match store.list().await {
        Ok(todos) => http::json_response(StatusCode::OK, &todos),
        Err(e) => store_error(&e),
    }
}

pub async fn find(store: &dyn TodoStore, id: &str) -> HttpResponse {
    match store.find_by_id(id).await {
        Ok(todo) => http::json_response(StatusCode::OK, &todo),
        Err(e) => store_error(&e),
    }
}

pub async fn update(store: &dyn TodoStore, id: &str, patch: TodoPatch) -> HttpResponse {
    match store.update(id, patch).await {
        Ok(todo) => http::json_response(StatusCode::OK, &todo),
        Err(e) => store_error(&e),
    }
}

pub async fn delete(store: &dyn TodoStore, id: &str) -> HttpResponse {
    match store.delete_by_id(id).await {
        Ok(()) => http::empty_response(StatusCode::OK),
        Err(e) => store_error(&e),
    }
}

pub async fn delete_all(store: &dyn TodoStore) -> HttpResponse {
    match store.delete_all().await {
        Ok(()) => http::empty_response(StatusCode::OK),
        Err(e) => store_error(&e),
    }
}
