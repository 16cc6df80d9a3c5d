//! Todo domain types
//!
//! `Todo` is the stored record. `NewTodo` and `TodoPatch` are the decoded
//! request bodies for create and update; their optional fields keep
//! "absent" distinct from any concrete value.

use serde::{Deserialize, Serialize};

/// Path prefix shared by the collection and item routes
pub const TODOS_PATH: &str = "/todos";

/// A persisted todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "order_number")]
    pub order: i32,
    /// Derived `/todos/{id}`, never stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Todo {
    /// Location of this todo on the item route
    pub fn location(&self) -> String {
        todo_url(&self.id)
    }

    /// Return the record with `url` filled in
    #[must_use]
    pub fn with_url(mut self) -> Self {
        self.url = Some(self.location());
        self
    }

    /// Merge the present fields of `patch` onto this record
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = patch.title.as_deref().filter(|t| !t.trim().is_empty()) {
            self.title = title.to_string();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}

pub fn todo_url(id: &str) -> String {
    format!("{TODOS_PATH}/{id}")
}

/// Body of a create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, rename = "order_number", alias = "order")]
    pub order: Option<i32>,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Resolve defaults: a fresh UUID when the id is missing or empty,
    /// `false` and `0` for the optional fields.
    pub fn into_todo(self) -> Todo {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };
        Todo {
            id,
            title: self.title,
            completed: self.completed.unwrap_or(false),
            order: self.order.unwrap_or(0),
            url: None,
        }
    }
}

/// Body of an update request, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, rename = "order_number", alias = "order")]
    pub order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo {
            id: "abc-123".to_string(),
            title: "buy milk".to_string(),
            completed: false,
            order: 3,
            url: None,
        }
    }

    #[test]
    fn test_generates_id_when_missing() {
        let a = NewTodo::titled("a").into_todo();
        let b = NewTodo::titled("b").into_todo();
        assert_eq!(a.id.len(), 36);
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert_eq!(a.order, 0);
    }

    #[test]
    fn test_empty_id_is_replaced() {
        let input = NewTodo {
            id: Some(String::new()),
            ..NewTodo::titled("x")
        };
        assert!(!input.into_todo().id.is_empty());
    }

    #[test]
    fn test_keeps_supplied_id() {
        let input: NewTodo =
            serde_json::from_str(r#"{"id":"my-id","title":"t","completed":true,"order":7}"#)
                .unwrap();
        let todo = input.into_todo();
        assert_eq!(todo.id, "my-id");
        assert!(todo.completed);
        assert_eq!(todo.order, 7);
    }

    #[test]
    fn test_serializes_order_number_and_url() {
        let json = serde_json::to_value(sample().with_url()).unwrap();
        assert_eq!(json["order_number"], 3);
        assert_eq!(json["url"], "/todos/abc-123");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_url_omitted_when_unset() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_patch_title_only() {
        let mut todo = sample();
        let patch: TodoPatch = serde_json::from_str(r#"{"title":"oat milk"}"#).unwrap();
        todo.apply(&patch);
        assert_eq!(todo.title, "oat milk");
        assert!(!todo.completed);
        assert_eq!(todo.order, 3);
    }

    #[test]
    fn test_patch_blank_title_and_nulls_are_absent() {
        let mut todo = sample();
        let patch: TodoPatch =
            serde_json::from_str(r#"{"title":"  ","completed":null,"order_number":9}"#).unwrap();
        todo.apply(&patch);
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.order, 9);
    }

    #[test]
    fn test_patch_rejects_wrong_types() {
        assert!(serde_json::from_str::<TodoPatch>(r#"{"completed":"yes"}"#).is_err());
    }
}
