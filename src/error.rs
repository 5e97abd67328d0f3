use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection error: {0}")]
    AsyncDatabase(#[from] tokio_rusqlite::Error),

    #[error("Failed to write {table} row {id}: {reason}")]
    Storage {
        table: &'static str,
        id: String,
        reason: String,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Which kind of feed record a [`RecordError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Game,
    GameTeam,
    Player,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Game => "game",
            RecordKind::GameTeam => "game team",
            RecordKind::Player => "player",
        };
        f.write_str(name)
    }
}

/// A single feed record that could not be normalized. The rest of the
/// snapshot is still applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed {kind} record {record}: {reason}")]
pub struct RecordError {
    pub kind: RecordKind,
    pub record: String,
    pub reason: String,
}

impl RecordError {
    pub fn new(kind: RecordKind, record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised inside a storage transaction, carrying the table and row
/// that failed so it survives the trip through `tokio_rusqlite`.
#[derive(Error, Debug)]
#[error("{table} row {id}: {source}")]
pub struct RowWriteError {
    pub table: &'static str,
    pub id: String,
    #[source]
    pub source: rusqlite::Error,
}

impl AppError {
    /// Unwraps a failed row-set, surfacing the table and row when the
    /// failure came from a single write.
    pub fn from_row_set(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<RowWriteError>() {
                Ok(row) => AppError::Storage {
                    table: row.table,
                    id: row.id,
                    reason: row.source.to_string(),
                },
                Err(other) => AppError::AsyncDatabase(tokio_rusqlite::Error::Other(other)),
            },
            err => AppError::AsyncDatabase(err),
        }
    }
}
