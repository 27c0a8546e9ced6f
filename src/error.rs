use thiserror::Error;

use crate::catalog::League;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// The table markup could not be tokenized into rows/columns, usually
    /// because the upstream page layout changed.
    #[error("table parse error: {0}")]
    Parse(String),

    /// The table the participation threshold is read from lacks a column.
    #[error("reference table is missing threshold column `{column}`")]
    MissingReference { column: String },

    #[error("no data could be loaded for any league")]
    NoData,

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("unknown {kind} `{value}`")]
    UnknownKey { kind: &'static str, value: String },

    #[error("player `{player}` not found")]
    PlayerNotFound { player: String },
}

impl StatsError {
    pub fn parse(msg: impl Into<String>) -> Self {
        StatsError::Parse(msg.into())
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        StatsError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// A league that was left out of an aggregate, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLeague {
    pub league: League,
    pub error: StatsError,
}
