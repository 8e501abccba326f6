use std::fmt;
use std::str::FromStr;

use super::todo::Todo;

/// Completion predicate selecting which todos are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    All,
    #[default]
    Unfinished,
    Finished,
}

impl Filter {
    /// Tab order.
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Unfinished, Filter::Finished];

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Unfinished => "Unfinished",
            Filter::Finished => "Finished",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Filter::All => Filter::Unfinished,
            Filter::Unfinished => Filter::Finished,
            Filter::Finished => Filter::All,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Filter::All => Filter::Finished,
            Filter::Unfinished => Filter::All,
            Filter::Finished => Filter::Unfinished,
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Unfinished => !todo.is_completed(),
            Filter::Finished => todo.is_completed(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Filter::All => "all",
            Filter::Unfinished => "unfinished",
            Filter::Finished => "finished",
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown filter `{0}` (expected all, unfinished or finished)")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "unfinished" => Ok(Filter::Unfinished),
            "finished" => Ok(Filter::Finished),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}
