use crate::domain::filter::Filter;
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, NewTodo, Tag, Todo, TodoError};
use anyhow::Result;
use async_trait::async_trait;

pub const DEFAULT_TAG: &str = "me";

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> Result<Todo>;
    async fn count(&self, filter: Filter) -> Result<usize>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
    default_tag: String,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo, default_tag: DEFAULT_TAG.to_string() } }

    /// Tag assigned when a todo is created without one.
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    async fn resolve_tag(&self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.repo.find_tag(name).await? {
            return Ok(tag);
        }
        let tag = self.repo.create_tag(name).await?;
        tracing::debug!(tag = %tag.name, "created tag");
        Ok(tag)
    }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle.into());
        }
        let name = match input.tag.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.default_tag.as_str(),
        };
        let tag = self.resolve_tag(name).await?;
        self.repo.create(NewTodo { title: title.to_string(), tag: Some(tag) }).await
    }

    async fn count(&self, filter: Filter) -> Result<usize> { self.repo.count_by_filter(filter).await }
}
