use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Longest context prefix quoted back in a diagnostic.
const CONTEXT_PREVIEW_CHARS: usize = 80;

/// Failures of either pipeline stage. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("malformed record on line {line} ({fields} tab fields): {reason}")]
    MalformedRecord {
        line: usize,
        fields: usize,
        reason: &'static str,
    },
    #[error("{}: line {line} is not valid UTF-8", .path.display())]
    Encoding { path: PathBuf, line: usize },
    #[error("malformed pair row {row}: {source}")]
    MalformedRow {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("no row with a different context for pair row {row} (context: {context:?})")]
    EmptyCandidateSet { row: usize, context: String },
    #[error(
        "pair row {row} has {available} rows with a different context, {requested} distractors requested (context: {context:?})"
    )]
    InsufficientCandidates {
        row: usize,
        context: String,
        available: usize,
        requested: usize,
    },
    #[error("configuration error: {0}")]
    InvalidConfig(String),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DatasetError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Shortened copy of a context string for error messages.
pub(crate) fn preview(context: &str) -> String {
    match context.char_indices().nth(CONTEXT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &context[..cut]),
        None => context.to_owned(),
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
