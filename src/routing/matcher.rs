//! Route matching module
//!
//! Classifies a request path as the todo collection, a todo item, or
//! anything else (served as a static file).

use crate::model::TODOS_PATH;

/// A path addressing the todo resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoRoute<'a> {
    /// `/todos`
    Collection,
    /// `/todos/{id}`
    Item(&'a str),
}

impl TodoRoute<'_> {
    /// Methods accepted on this route, for the `Allow` header
    pub const fn allowed_methods(self) -> &'static str {
        match self {
            Self::Collection => "GET, HEAD, POST, DELETE, OPTIONS",
            Self::Item(_) => "GET, HEAD, PUT, PATCH, DELETE, OPTIONS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Todos(TodoRoute<'a>),
    /// Under `/todos/` but not a valid identifier
    UnknownTodo,
    Static,
}

/// Match a request path against the collection and item patterns
pub fn match_route(path: &str) -> RouteMatch<'_> {
    let Some(rest) = path.strip_prefix(TODOS_PATH) else {
        return RouteMatch::Static;
    };

    match rest {
        "" | "/" => RouteMatch::Todos(TodoRoute::Collection),
        _ => match rest.strip_prefix('/') {
            Some(id) if is_valid_id(id) => RouteMatch::Todos(TodoRoute::Item(id)),
            Some(_) => RouteMatch::UnknownTodo,
            // e.g. "/todosfoo"
            None => RouteMatch::Static,
        },
    }
}

/// Lowercase alphanumeric segments joined by single hyphens, as in a UUID
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_path() {
        assert_eq!(match_route("/todos"), RouteMatch::Todos(TodoRoute::Collection));
        assert_eq!(match_route("/todos/"), RouteMatch::Todos(TodoRoute::Collection));
    }

    #[test]
    fn test_item_path() {
        let id = "3f2b8c1e-9a4d-4e7f-b6a1-0c5d2e8f9a7b";
        assert_eq!(
            match_route(&format!("/todos/{id}")),
            RouteMatch::Todos(TodoRoute::Item(id))
        );
        assert_eq!(
            match_route("/todos/abc123"),
            RouteMatch::Todos(TodoRoute::Item("abc123"))
        );
    }

    #[test]
    fn test_invalid_item_tokens() {
        assert_eq!(match_route("/todos/ABC"), RouteMatch::UnknownTodo);
        assert_eq!(match_route("/todos/a--b"), RouteMatch::UnknownTodo);
        assert_eq!(match_route("/todos/-a"), RouteMatch::UnknownTodo);
        assert_eq!(match_route("/todos/a-"), RouteMatch::UnknownTodo);
        assert_eq!(match_route("/todos/a/b"), RouteMatch::UnknownTodo);
        assert_eq!(match_route("/todos/a_b"), RouteMatch::UnknownTodo);
    }

    #[test]
    fn test_static_paths() {
        assert_eq!(match_route("/"), RouteMatch::Static);
        assert_eq!(match_route("/index.html"), RouteMatch::Static);
        assert_eq!(match_route("/todosx"), RouteMatch::Static);
        assert_eq!(match_route("/css/todos.css"), RouteMatch::Static);
    }

    #[test]
    fn test_allowed_methods() {
        assert!(TodoRoute::Collection.allowed_methods().contains("POST"));
        assert!(!TodoRoute::Collection.allowed_methods().contains("PUT"));
        assert!(TodoRoute::Item("a").allowed_methods().contains("PATCH"));
    }
}
