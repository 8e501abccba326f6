use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoId(pub Uuid);

impl Default for TodoId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagId(pub Uuid);

impl Default for TagId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub tag_id: Option<TagId>,
    /// Joined from the tag on read; never written back.
    pub tag_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn is_completed(&self) -> bool { self.completed_at.is_some() }
}

/// Input accepted by the application layer.
#[derive(Debug, Clone, Default)]
pub struct CreateTodo {
    pub title: String,
    pub tag: Option<String>,
}

/// Input accepted by a repository once the title is validated and the tag resolved.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub tag: Option<Tag>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("todo title must not be empty")]
    EmptyTitle,
}
