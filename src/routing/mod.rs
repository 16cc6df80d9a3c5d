//! Routing module
//!
//! Maps request paths onto the todo collection and item routes.

mod matcher;

pub use matcher::{match_route, RouteMatch, TodoRoute};
