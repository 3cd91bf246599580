use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the failures that abort a reconciliation step. Anything
/// recoverable is reported as a [`Warning`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the configuration file is not valid TOML.
    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Network or authentication failure reaching one of the remote services.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// A response body could not be decoded into the expected shape.
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// A name or revision lookup matched nothing.
    #[error("no content matches {0}")]
    NotFound(String),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when configuration values are missing or out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Non-fatal condition surfaced next to a successful value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A lookup matched more than one record; the first one was used.
    AmbiguousMatch { query: String, matches: usize },
    /// A field could not be parsed and its default was used.
    ParseFailure {
        field: String,
        value: String,
        reason: String,
    },
    /// A content page failed; pagination stopped after it.
    PageFailed {
        page: usize,
        offset: usize,
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::AmbiguousMatch { query, matches } => {
                write!(f, "{matches} records match {query}; using the first")
            }
            Warning::ParseFailure {
                field,
                value,
                reason,
            } => write!(f, "could not parse {field} value '{value}': {reason}"),
            Warning::PageFailed {
                page,
                offset,
                reason,
            } => write!(f, "page {page} (offset {offset}) failed: {reason}"),
        }
    }
}

/// A value together with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reported<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Reported<T> {
    /// Wraps a value that produced no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Wraps a value with the warnings collected while building it.
    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Splits into the value and its warnings.
    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }
}
