use anyhow::Result;
use clap::Parser;

use crate::application::todo_service::{TodoService, TodoServiceImpl};
use crate::config::{parse_page_size, Config};
use crate::domain::{filter::Filter, repository::TodoRepository, todo::CreateTodo};
use crate::infrastructure::sqlite_repo::SqliteTodoRepository;
use crate::logging;
use crate::tui::{self, model::{Exit, SessionSettings}, view::Renderer};

pub const EMPTY_LIST_HINT: &str = "Todo list is empty. Create one with --create <description>.";

#[derive(Debug, Parser)]
#[command(name = "todo")]
#[command(about = "The Todo CLI app", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Create a new todo with the given description
    #[arg(short = 'c', long = "create", value_name = "DESCRIPTION")]
    pub create: Option<String>,

    /// Optional tag for categorizing the new todo
    #[arg(short = 't', long = "tag", requires = "create")]
    pub tag: Option<String>,

    /// Filter shown when the list opens (all, unfinished, finished)
    #[arg(long)]
    pub filter: Option<Filter>,

    /// Overrides DATABASE_URL
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Overrides TODO_PAGE_SIZE
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<usize>,
}

impl Cli {
    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(filter) = self.filter {
            config.default_filter = filter;
        }
        config
    }
}

/// Exit status for a failed parse: 0 for `--help`/`--version`, 1 for usage errors.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.apply(Config::from_env()?);
    logging::init(&config.log_path())?;

    let repo = SqliteTodoRepository::connect(&config.database_url).await?;
    repo.init().await?;
    let service = TodoServiceImpl::new(repo.clone()).with_default_tag(config.default_tag.clone());

    let mut fresh = None;
    if let Some(title) = cli.create {
        let todo = service.create(CreateTodo { title, tag: cli.tag }).await?;
        tracing::info!(id = %todo.id, tag = todo.tag_name.as_deref().unwrap_or_default(), "created todo");
        fresh = Some(todo.id);
    }

    if service.count(Filter::All).await? == 0 {
        tracing::info!("list is empty");
        println!("{EMPTY_LIST_HINT}");
        return Ok(());
    }

    let settings = SessionSettings { page_size: config.page_size, default_filter: config.default_filter };
    match tui::run(repo, settings, Renderer::default(), fresh).await? {
        Exit::Saved(todo) => {
            tracing::info!(id = %todo.id, completed = todo.is_completed(), "saved todo")
        }
        // Already logged by the session; the terminal is restored by now.
        Exit::SaveFailed { id, error } => eprintln!("Error: todo {id} was not saved: {error:#}"),
        Exit::Quit | Exit::NothingSelected => tracing::debug!("session closed"),
    }
    Ok(())
}
