//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of todo items that can be loaded from
//! the backend, created, edited, toggled, removed and cleared.

use crate::error::TodoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a todo item
///
/// Ids are opaque strings generated client-side. Uniqueness is not enforced.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a `TodoId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Free text; blank titles are allowed
    pub title: String,
    /// Whether the todo is done
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Creates a new, not completed todo
    #[must_use]
    pub fn new(id: impl Into<TodoId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Returns the todo with its completed flag set
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Shallow-merges the fields present in `patch`
    ///
    /// The patch id is not checked; callers select the todo to patch.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Partial update of a todo, identified by id
///
/// Absent fields are left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// Todo to update
    pub id: TodoId,
    /// New title, if changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completed flag, if changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Creates an empty patch for `id`
    #[must_use]
    pub fn new(id: impl Into<TodoId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            completed: None,
        }
    }

    /// Sets the new title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the new completed flag
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// True when the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Visibility filter of the list view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Todos not completed yet
    Active,
    /// Completed todos
    Completed,
}

impl Filter {
    /// Whether `todo` is visible under this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(TodoError::UnknownFilter(other.to_string())),
        }
    }
}

/// State of the todo list
///
/// `todos` is ordered: insertion order is display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// All todos, in display order
    pub todos: Vec<Todo>,
    /// Current visibility filter
    #[serde(default)]
    pub filter: Filter,
}

impl TodoState {
    /// Creates a state holding `todos` with the default filter
    #[must_use]
    pub const fn new(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            filter: Filter::All,
        }
    }

    /// Returns the state with `filter` applied
    #[must_use]
    pub const fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the first todo with `id`
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }
}

/// Every input the todo reducer accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    /// Replace the whole list with the todos fetched from the backend
    Load {
        /// Todos, in display order
        todos: Vec<Todo>,
    },

    /// Append a new todo and create it remotely
    Create {
        /// Title of the todo
        title: String,
    },

    /// Merge fields into the todo with matching id
    Update {
        /// Fields to change
        values: TodoPatch,
    },

    /// Drop the todo with matching id and delete it remotely
    Remove {
        /// Todo to remove
        id: TodoId,
    },

    /// Complete every todo, or reopen all of them if every todo is already completed
    CompleteAll,

    /// Drop every completed todo
    ClearCompleted,

    /// Change the visibility filter
    SetFilter {
        /// New filter
        filter: Filter,
    },
}
