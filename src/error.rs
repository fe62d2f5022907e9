//! Error types for orq.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for orq operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    StoreClosed,
    SchemaError,
    QueryError,

    // Not Found (exit 3)
    NotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Integrity (exit 5)
    IntegrityError,
    DecodeError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::StoreClosed => "STORE_CLOSED",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::QueryError => "QUERY_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::IntegrityError => "INTEGRITY_ERROR",
            Self::DecodeError => "DECODE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::StoreClosed
            | Self::SchemaError
            | Self::QueryError => 2,
            Self::NotFound => 3,
            Self::InvalidArgument => 4,
            Self::IntegrityError | Self::DecodeError => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller may retry the action.
    ///
    /// Query failures are often transient (file lock held by another
    /// process), and argument errors can be corrected. Nothing retries
    /// automatically inside the store.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::QueryError | Self::InvalidArgument)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in orq operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The SQLite library is unusable for this store. Fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A DDL statement failed while creating a new store.
    #[error("Failed to create {table} table: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// An execute/query failed; `step` names what was being attempted.
    #[error("Query failed ({step}): {source}")]
    Query {
        step: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A stored row could not be converted into a typed value.
    #[error("Malformed {table} row: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A referenced row is missing.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Store is closed")]
    Closed,

    #[error("No project file: pass --project or set ORQ_PROJECT")]
    NotInitialized,

    #[error("Project file already exists at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(source: rusqlite::Error) -> Self {
        Self::Query {
            step: "sqlite".to_string(),
            source,
        }
    }
}

impl Error {
    /// Wrap a driver error with the name of the step that failed.
    #[must_use]
    pub fn query(step: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Query {
            step: step.into(),
            source,
        }
    }

    /// Classify a driver error raised while reading a row of `table`.
    ///
    /// Column lookup and type conversion failures are decode errors; anything
    /// else came from the engine and stays a query error.
    #[must_use]
    pub fn from_row(table: &'static str, source: rusqlite::Error) -> Self {
        match source {
            rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => Self::Decode { table, source },
            other => Self::query(format!("read {table}"), other),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Configuration(_) => ErrorCode::ConfigError,
            Self::Schema { .. } => ErrorCode::SchemaError,
            Self::Query { .. } => ErrorCode::QueryError,
            Self::Decode { .. } => ErrorCode::DecodeError,
            Self::Integrity(_) => ErrorCode::IntegrityError,
            Self::Closed => ErrorCode::StoreClosed,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Create one with `orq init <path>` or pass --project <file>".to_string())
            }
            Self::AlreadyInitialized { path } => Some(format!(
                "Open it instead: orq --project {} info",
                path.display()
            )),
            Self::NotFound { kind, .. } => match *kind {
                "Requirement" | "Solution" => {
                    Some("Use `orq item list` to see stored items.".to_string())
                }
                "Label" => Some("Use `orq label list` to see available labels.".to_string()),
                "Project version" => Some(
                    "Use `orq project-version list` to see the project timeline.".to_string(),
                ),
                _ => None,
            },
            Self::InvalidArgument(msg) if msg.contains("color") => {
                Some("Colors are written as #rrggbb, e.g. #3a7bd5".to_string())
            }
            Self::InvalidArgument(msg) if msg.contains("type") => {
                Some("Valid item types: requirement (req), solution (sol)".to_string())
            }
            Self::Configuration(_) => Some(
                "orq needs SQLite 3.35.0 or newer; rebuild with the bundled library".to_string(),
            ),
            Self::Schema { .. }
            | Self::Query { .. }
            | Self::Decode { .. }
            | Self::Integrity(_)
            | Self::Closed
            | Self::InvalidArgument(_)
            | Self::Io(_)
            | Self::Json(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
