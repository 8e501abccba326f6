use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    filter::Filter,
    repository::{TodoRepository, TodoStore},
    todo::{NewTodo, Tag, TagId, Todo, TodoId},
};

#[derive(Default)]
struct State {
    todos: Vec<Todo>,
    tags: Vec<Tag>,
    last_tick: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing, so two writes never share an `updated_at`.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_tick {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.last_tick = Some(at);
        at
    }

    fn sorted(&self, filter: Filter) -> Vec<&Todo> {
        let mut todos: Vec<&Todo> = self.todos.iter().filter(|t| filter.matches(t)).collect();
        todos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        todos
    }
}

/// Process-local store with switches that make reads or writes fail.
#[derive(Clone, Default)]
pub struct MemoryTodoRepository {
    state: Arc<Mutex<State>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryTodoRepository {
    pub fn new() -> Self { Self::default() }

    pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }

    pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("simulated read failure");
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("simulated write failure");
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryTodoRepository {
    async fn count_by_filter(&self, filter: Filter) -> Result<usize> {
        self.check_read()?;
        Ok(self.lock()?.todos.iter().filter(|t| filter.matches(t)).count())
    }

    async fn read_page(&self, filter: Filter, limit: usize, offset: usize) -> Result<Vec<Todo>> {
        self.check_read()?;
        let state = self.lock()?;
        Ok(state.sorted(filter).into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn save_todo(&self, todo: &Todo) -> Result<Todo> {
        self.check_write()?;
        let mut state = self.lock()?;
        let mut saved = todo.clone();
        saved.updated_at = state.tick();
        saved.tag_name = saved
            .tag_id
            .as_ref()
            .and_then(|id| state.tags.iter().find(|t| &t.id == id))
            .map(|t| t.name.clone());
        match state.todos.iter().position(|t| t.id == saved.id) {
            Some(i) => state.todos[i] = saved.clone(),
            None => state.todos.push(saved.clone()),
        }
        Ok(saved)
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn create(&self, input: NewTodo) -> Result<Todo> {
        self.check_write()?;
        let mut state = self.lock()?;
        let now = state.tick();
        let todo = Todo {
            id: TodoId(Uuid::new_v4()),
            title: input.title,
            completed_at: None,
            tag_id: input.tag.as_ref().map(|t| t.id.clone()),
            tag_name: input.tag.map(|t| t.name),
            created_at: now,
            updated_at: now,
        };
        state.todos.push(todo.clone());
        Ok(todo)
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>> {
        self.check_read()?;
        Ok(self.lock()?.todos.iter().find(|t| &t.id == id).cloned())
    }

    async fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        self.check_read()?;
        Ok(self.lock()?.tags.iter().find(|t| t.name == name).cloned())
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        self.check_write()?;
        let mut state = self.lock()?;
        if state.tags.iter().any(|t| t.name == name) {
            bail!("tag `{name}` already exists");
        }
        let tag = Tag { id: TagId(Uuid::new_v4()), name: name.to_string(), created_at: state.tick() };
        state.tags.push(tag.clone());
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_newest_first_under_filter() {
        let repo = MemoryTodoRepository::new();
        for i in 0..5 {
            repo.create(NewTodo { title: format!("t{i}"), tag: None }).await.unwrap();
        }
        let page = repo.read_page(Filter::All, 2, 0).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["t4", "t3"]);

        let mut done = page[1].clone();
        done.completed_at = Some(Utc::now());
        repo.save_todo(&done).await.unwrap();

        assert_eq!(repo.count_by_filter(Filter::Finished).await.unwrap(), 1);
        assert_eq!(repo.count_by_filter(Filter::Unfinished).await.unwrap(), 4);
        let first = repo.read_page(Filter::All, 1, 0).await.unwrap();
        assert_eq!(first[0].title, "t3", "save refreshes updated_at");
    }

    #[tokio::test]
    async fn failure_switches() {
        let repo = MemoryTodoRepository::new();
        repo.fail_reads(true);
        assert!(repo.count_by_filter(Filter::All).await.is_err());
        repo.fail_reads(false);
        repo.fail_writes(true);
        assert!(repo.create(NewTodo { title: "x".into(), tag: None }).await.is_err());
        assert_eq!(repo.count_by_filter(Filter::All).await.unwrap(), 0);
    }
}
