//! Request handler module
//!
//! Routes requests to the todo API handlers or to static file serving.

pub mod router;
pub mod static_files;
pub mod todos;

// Re-export main entry point
pub use router::handle_request;
