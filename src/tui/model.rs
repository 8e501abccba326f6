use chrono::{DateTime, Utc};

use crate::domain::{
    filter::Filter,
    repository::TodoStore,
    todo::{Todo, TodoId},
};

use super::pagination::Paginator;
use super::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub page_size: usize,
    pub default_filter: Filter,
}

/// Input to [`ListModel::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Toggle,
    Commit,
    Quit,
    PrevPage,
    NextPage,
    ShowFilter(Filter),
    NextFilter,
    PrevFilter,
    CursorUp,
    CursorDown,
    CursorFirst,
    CursorLast,
    Resize(u16, u16),
}

/// How a session ended.
#[derive(Debug)]
pub enum Exit {
    Quit,
    NothingSelected,
    Saved(Todo),
    SaveFailed { id: TodoId, error: anyhow::Error },
}

/// A todo on the current page plus the completion state last read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    todo: Todo,
    stored_completed_at: Option<DateTime<Utc>>,
}

impl Row {
    fn new(todo: Todo) -> Self {
        Self { stored_completed_at: todo.completed_at, todo }
    }

    pub fn todo(&self) -> &Todo { &self.todo }

    /// True when the row differs from what storage holds.
    pub fn is_dirty(&self) -> bool { self.todo.completed_at != self.stored_completed_at }

    fn toggle(&mut self, now: DateTime<Utc>) {
        self.todo.completed_at = match self.todo.completed_at {
            Some(_) => None,
            None => Some(self.stored_completed_at.unwrap_or(now)),
        };
    }
}

/// Interactive state of the todo list. Storage is only touched on load,
/// page or filter changes, and on commit.
pub struct ListModel<S: TodoStore> {
    store: S,
    filter: Filter,
    pager: Paginator,
    rows: Vec<Row>,
    selected: usize,
    width: u16,
    fresh: Option<TodoId>,
    notice: Option<String>,
    exit: Option<Exit>,
}

impl<S: TodoStore> ListModel<S> {
    /// Loads page 0 of the default filter. Any read failure aborts the session.
    pub async fn load(store: S, settings: SessionSettings, fresh: Option<TodoId>) -> Result<Self, SessionError> {
        let filter = settings.default_filter;
        let mut pager = Paginator::new(settings.page_size);
        let count = store.count_by_filter(filter).await.map_err(SessionError::Load)?;
        pager.set_total_items(count);
        let todos = store.read_page(filter, pager.per_page(), 0).await.map_err(SessionError::Load)?;
        tracing::debug!(%filter, count, pages = pager.total_pages(), "session loaded");

        Ok(Self {
            store,
            filter,
            pager,
            rows: todos.into_iter().map(Row::new).collect(),
            selected: 0,
            width: 0,
            fresh,
            notice: None,
            exit: None,
        })
    }

    pub fn filter(&self) -> Filter { self.filter }

    pub fn current_page(&self) -> usize { self.pager.page() }

    pub fn total_pages(&self) -> usize { self.pager.total_pages() }

    pub fn rows(&self) -> &[Row] { &self.rows }

    pub fn selected(&self) -> usize { self.selected }

    pub fn width(&self) -> u16 { self.width }

    pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

    /// Whether `todo` was created by this invocation.
    pub fn is_fresh(&self, todo: &Todo) -> bool { self.fresh.as_ref() == Some(&todo.id) }

    pub fn is_exiting(&self) -> bool { self.exit.is_some() }

    pub fn take_exit(&mut self) -> Option<Exit> { self.exit.take() }

    pub async fn update(&mut self, msg: Msg) {
        if self.exit.is_some() {
            return;
        }
        match msg {
            Msg::Toggle => self.toggle_selected(),
            Msg::Commit => self.commit_selected().await,
            Msg::Quit => self.exit = Some(Exit::Quit),
            Msg::PrevPage => {
                if let Some(page) = self.pager.prev_page() {
                    self.go_to_page(page).await;
                }
            }
            Msg::NextPage => {
                if let Some(page) = self.pager.next_page() {
                    self.go_to_page(page).await;
                }
            }
            Msg::ShowFilter(filter) => self.switch_filter(filter).await,
            Msg::NextFilter => self.switch_filter(self.filter.next()).await,
            Msg::PrevFilter => self.switch_filter(self.filter.prev()).await,
            Msg::CursorUp => self.selected = self.selected.saturating_sub(1),
            Msg::CursorDown => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            Msg::CursorFirst => self.selected = 0,
            Msg::CursorLast => self.selected = self.rows.len().saturating_sub(1),
            Msg::Resize(width, _) => self.width = width,
        }
    }

    fn toggle_selected(&mut self) {
        let Some(row) = self.rows.get_mut(self.selected) else { return };
        row.toggle(Utc::now());
    }

    async fn commit_selected(&mut self) {
        let exit = match self.rows.get(self.selected) {
            None => Exit::NothingSelected,
            Some(row) => match self.store.save_todo(&row.todo).await {
                Ok(saved) => Exit::Saved(saved),
                Err(error) => {
                    tracing::error!(kind = "write", id = %row.todo.id, error = %error, "failed to save todo");
                    Exit::SaveFailed { id: row.todo.id.clone(), error }
                }
            },
        };
        self.exit = Some(exit);
    }

    async fn go_to_page(&mut self, page: usize) {
        let mut pager = self.pager;
        pager.set_page(page);
        match self.store.read_page(self.filter, pager.per_page(), pager.offset()).await {
            Ok(todos) => {
                self.pager = pager;
                self.replace_rows(todos);
            }
            Err(error) => self.recover_read(error, "failed to load page"),
        }
    }

    async fn switch_filter(&mut self, filter: Filter) {
        if filter == self.filter {
            return;
        }
        let mut pager = Paginator::new(self.pager.per_page());
        match self.first_page(filter, &mut pager).await {
            Ok(todos) => {
                self.filter = filter;
                self.pager = pager;
                self.replace_rows(todos);
            }
            Err(error) => self.recover_read(error, "failed to switch filter"),
        }
    }

    async fn first_page(&self, filter: Filter, pager: &mut Paginator) -> anyhow::Result<Vec<Todo>> {
        let count = self.store.count_by_filter(filter).await?;
        pager.set_total_items(count);
        self.store.read_page(filter, pager.per_page(), 0).await
    }

    fn replace_rows(&mut self, todos: Vec<Todo>) {
        self.rows = todos.into_iter().map(Row::new).collect();
        self.selected = 0;
        self.notice = None;
    }

    fn recover_read(&mut self, error: anyhow::Error, what: &str) {
        tracing::warn!(kind = "read", filter = %self.filter, page = self.pager.page(), error = %error, "{what}");
        self.notice = Some(format!("{what}: {error}"));
    }
}
