//! Error types for the name server.
//!
//! Low-level tree failures (`TreeError`) are translated into `NameServerError`
//! at the service boundary, where it is known whether the caller was looking
//! for a scope or a binding. Every variant maps onto one of the coarse
//! `ErrorKind`s that clients switch on, and onto a JSON-RPC error code.

use std::time::Duration;
use thiserror::Error;

/// Main error type for name server operations.
#[derive(Debug, Error)]
pub enum NameServerError {
    // Path syntax
    #[error("Badly formed name server path: {path}")]
    BadPath { path: String },

    // Lookup failures
    #[error("No name server info for path: {path}")]
    NotFound { path: String },

    #[error("Scope not found: {path}")]
    ScopeNotFound { path: String },

    #[error("Binding not found: {path}")]
    BindingNotFound { path: String },

    // Type mismatches
    #[error("Path is not a scope: {path}")]
    NotAScope { path: String },

    #[error("Path is not a binding: {path}")]
    NotABinding { path: String },

    // Structural conflicts
    #[error("A node named '{name}' already exists in scope {parent}")]
    AlreadyExists { parent: String, name: String },

    #[error("The root scope cannot be removed")]
    CantRemoveRoot,

    #[error("Extra value index {index} is invalid for binding {path}, must be 1 to 4")]
    IndexOutOfRange { path: String, index: u32 },

    // Background work
    #[error("Timed out after {0:?} waiting for the name server lock")]
    LockTimeout(Duration),

    // Request decoding
    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Internal name server error: {0}")]
    Internal(String),
}

/// Result type alias for name server operations.
pub type Result<T> = std::result::Result<T, NameServerError>;

/// Coarse classification clients use to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path does not name a node.
    NotFound,
    /// A scope was expected and a binding found, or vice versa.
    WrongType,
    /// Insert-only creation hit an occupied name.
    AlreadyExists,
    /// Bad extra value slot.
    IndexOutOfRange,
    /// The request itself was malformed.
    BadRequest,
    /// Anything unexpected.
    Internal,
}

impl From<serde_json::Error> for NameServerError {
    fn from(err: serde_json::Error) -> Self {
        NameServerError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl NameServerError {
    pub fn bad_path(path: impl Into<String>) -> Self {
        NameServerError::BadPath { path: path.into() }
    }

    /// Classify this error into the client-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NameServerError::NotFound { .. }
            | NameServerError::ScopeNotFound { .. }
            | NameServerError::BindingNotFound { .. } => ErrorKind::NotFound,

            NameServerError::NotAScope { .. } | NameServerError::NotABinding { .. } => {
                ErrorKind::WrongType
            }

            NameServerError::AlreadyExists { .. } => ErrorKind::AlreadyExists,

            NameServerError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,

            NameServerError::BadPath { .. }
            | NameServerError::CantRemoveRoot
            | NameServerError::InvalidParams { .. }
            | NameServerError::Json { .. } => ErrorKind::BadRequest,

            NameServerError::LockTimeout(_) | NameServerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32001: Path not found
    /// - -32002: Wrong node type
    /// - -32003: Already exists
    /// - -32004: Extra value index out of range
    /// - -32005: Bad path or forbidden operation
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            NameServerError::InvalidParams { .. } | NameServerError::Json { .. } => -32602,
            NameServerError::BadPath { .. } | NameServerError::CantRemoveRoot => -32005,
            _ => match self.kind() {
                ErrorKind::NotFound => -32001,
                ErrorKind::WrongType => -32002,
                ErrorKind::AlreadyExists => -32003,
                ErrorKind::IndexOutOfRange => -32004,
                ErrorKind::BadRequest => -32602,
                ErrorKind::Internal => -32603,
            },
        }
    }

    /// Short stable name of the error kind, sent alongside RPC errors.
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::WrongType => "WrongType",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::IndexOutOfRange => "IndexOutOfRange",
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Internal => "Internal",
        }
    }
}
