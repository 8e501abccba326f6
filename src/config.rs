use std::path::{Path, PathBuf};

use crate::application::todo_service::DEFAULT_TAG;
use crate::domain::filter::{Filter, ParseFilterError};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOG_FILE: &str = "todo.log";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TODO_PAGE_SIZE must be a positive integer, got `{0}`")]
    PageSize(String),
    #[error("TODO_DEFAULT_FILTER: {0}")]
    Filter(#[from] ParseFilterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub page_size: usize,
    pub default_tag: String,
    pub default_filter: Filter,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            default_tag: DEFAULT_TAG.to_string(),
            default_filter: Filter::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads `.env` (when present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_size = match non_empty("TODO_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => defaults.page_size,
        };
        let default_filter = match non_empty("TODO_DEFAULT_FILTER") {
            Some(raw) => raw.parse()?,
            None => defaults.default_filter,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            page_size,
            default_tag: non_empty("TODO_DEFAULT_TAG").map(|t| t.trim().to_string()).unwrap_or(defaults.default_tag),
            default_filter,
            log_file: non_empty("TODO_LOG_FILE").map(PathBuf::from),
        })
    }
}

impl Config {
    /// `TODO_LOG_FILE`, or `todo.log` beside the database file.
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        match database_path(&self.database_url).as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(DEFAULT_LOG_FILE),
            None => PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// File behind a `sqlite:` URL; `None` for in-memory databases and other schemes.
pub fn database_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") {
        return None;
    }
    let path = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    // On Windows, absolute paths may look like /C:/path
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    (!path.is_empty()).then(|| PathBuf::from(path))
}

pub fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::PageSize(raw.to_string())),
    }
}
