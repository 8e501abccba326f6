use async_trait::async_trait;

use super::filter::Filter;
use super::todo::{NewTodo, Tag, Todo, TodoId};

/// The reads and writes an interactive session needs.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn count_by_filter(&self, filter: Filter) -> anyhow::Result<usize>;
    /// Ordered by `updated_at` descending.
    async fn read_page(&self, filter: Filter, limit: usize, offset: usize) -> anyhow::Result<Vec<Todo>>;
    /// Upserts the whole record and refreshes `updated_at`.
    async fn save_todo(&self, todo: &Todo) -> anyhow::Result<Todo>;
}

#[async_trait]
pub trait TodoRepository: TodoStore {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: NewTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: &TodoId) -> anyhow::Result<Option<Todo>>;
    async fn find_tag(&self, name: &str) -> anyhow::Result<Option<Tag>>;
    async fn create_tag(&self, name: &str) -> anyhow::Result<Tag>;
}
