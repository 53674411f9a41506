//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shown when a single record lookup matches nothing
pub const RECORD_NOT_FOUND: &str = "Sorry! We weren't able to find what you were looking for.";

/// Shown when a collection listing matches nothing
pub const RECORDS_NOT_FOUND: &str = "Uh oh! Looks like there's nothing to see here..";

/// Shown for malformed ids, bodies and query strings
pub const INVALID_INPUT: &str = "Invalid input: incorrect data format.";

/// Body of the catch-all 404 for unknown routes
pub const PAGE_NOT_FOUND: &str = "Oops.. We can't find that page for you";

/// Follow-up paragraph of the catch-all 404
pub const PAGE_NOT_FOUND_PARAGRAPH: &str =
    "We've searched high and low, but couldn't find the page you're looking for. How about we start from home again?";

// ============================================================================
// Structured Database Errors
// ============================================================================

/// Database operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Establishing a database connection
    Connect,
    /// Executing a read query
    Query,
    /// Inserting records
    Insert,
    /// Updating records
    Update,
    /// Deleting records
    Delete,
    /// Creating or dropping tables
    Schema,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Query => write!(f, "query"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Schema => write!(f, "schema"),
        }
    }
}

/// Category of database error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// Failed to establish connection
    ConnectionFailed,
    /// Value rejected by the store (bad text representation, null in a required column)
    InvalidInput,
    /// Foreign key points at a row that does not exist
    ReferenceNotFound,
    /// Unique or check constraint violation
    ConstraintViolation,
    /// Query execution failed
    QueryFailed,
    /// Column value could not be converted
    TypeConversion,
    /// Configuration error
    Configuration,
    /// Operation timed out
    Timeout,
    /// Connection pool exhausted
    PoolExhausted,
    /// Other/unknown error
    Other,
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::ReferenceNotFound => write!(f, "reference_not_found"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::Configuration => write!(f, "configuration"),
            Self::Timeout => write!(f, "timeout"),
            Self::PoolExhausted => write!(f, "pool_exhausted"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured database error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    /// The operation being performed when the error occurred
    pub operation: DatabaseOperation,
    /// The category of error
    pub kind: DatabaseErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional context (e.g., SQLSTATE, table name)
    pub context: Option<String>,
}

impl DatabaseError {
    /// Create a new database error
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new database error with context
    pub fn with_context(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Query,
            DatabaseErrorKind::QueryFailed,
            message,
        )
    }

    /// Create a timeout error
    pub fn timeout(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::Timeout, message)
    }

    /// Create a type conversion error
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Query,
            DatabaseErrorKind::TypeConversion,
            message,
        )
    }

    /// Create a pool exhausted error
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::PoolExhausted,
            message,
        )
    }

    /// Replace the operation, keeping kind and message
    pub fn during(mut self, operation: DatabaseOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed
                | DatabaseErrorKind::Timeout
                | DatabaseErrorKind::PoolExhausted
        )
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref ctx) = self.context {
            write!(f, " [context: {}]", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatabaseError {}

/// Sanitize a database URL by removing credentials
pub fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(scheme_end) = url.find("://") {
            if scheme_end < at_pos {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos + 1..];
                return format!("{}<redacted>@{}", scheme, after_at);
            }
        }
    }
    url.to_string()
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the API
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Structured database error with operation context
    #[error("{0}")]
    Database(DatabaseError),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(Box<axum::http::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The store did not answer in time
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Single-record lookup found nothing
    pub fn record_not_found() -> Self {
        Error::NotFound(RECORD_NOT_FOUND.to_string())
    }

    /// Malformed client input
    pub fn invalid_input() -> Self {
        Error::BadRequest(INVALID_INPUT.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error message
    pub error_message: String,

    /// Optional longer explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_paragraph: Option<String>,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error_message: error.into(),
            error_paragraph: None,
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error_message: error.into(),
            error_paragraph: None,
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }

    /// The generic body for routes that do not exist
    pub fn page_not_found() -> Self {
        Self {
            error_message: PAGE_NOT_FOUND.to_string(),
            error_paragraph: Some(PAGE_NOT_FOUND_PARAGRAPH.to_string()),
            code: Some("PAGE_NOT_FOUND".to_string()),
            status: StatusCode::NOT_FOUND.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_message)
    }
}

fn database_status(kind: DatabaseErrorKind) -> (StatusCode, &'static str) {
    match kind {
        DatabaseErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, INVALID_INPUT),
        DatabaseErrorKind::ReferenceNotFound => (StatusCode::NOT_FOUND, RECORD_NOT_FOUND),
        DatabaseErrorKind::ConstraintViolation => (
            StatusCode::CONFLICT,
            "Operation conflicts with existing data",
        ),
        DatabaseErrorKind::Timeout
        | DatabaseErrorKind::PoolExhausted
        | DatabaseErrorKind::ConnectionFailed => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Database is temporarily unavailable",
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database operation failed",
        ),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIG_ERROR",
                        "Internal server error",
                    ),
                )
            }

            Error::Database(ref e) => {
                let (status, user_message) = database_status(e.kind);
                if status.is_server_error() {
                    tracing::error!(
                        operation = %e.operation,
                        kind = %e.kind,
                        context = ?e.context,
                        retriable = e.is_retriable(),
                        "Database error: {}", e.message
                    );
                } else {
                    tracing::debug!(
                        operation = %e.operation,
                        kind = %e.kind,
                        context = ?e.context,
                        "Store rejected request: {}", e.message
                    );
                }

                let code = format!("DATABASE_{}", e.kind.to_string().to_uppercase());
                (status, ErrorResponse::with_code(status, code, user_message))
            }

            Error::Http(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "HTTP_ERROR", e.to_string()),
            ),

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "IO_ERROR",
                        "I/O operation failed",
                    ),
                )
            }

            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ),

            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
            ),

            Error::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::with_code(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "SERVICE_UNAVAILABLE",
                        "Service temporarily unavailable, please retry later",
                    ),
                )
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<axum::http::Error> for Error {
    fn from(err: axum::http::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

impl From<DatabaseError> for Error {
    fn from(err: DatabaseError) -> Self {
        Error::Database(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(DatabaseError::from(err))
    }
}

/// Classify a Postgres SQLSTATE code
fn kind_for_sqlstate(code: &str) -> DatabaseErrorKind {
    match code {
        // invalid_text_representation, numeric_value_out_of_range,
        // character_not_in_repertoire, not_null_violation, undefined_column
        "22P02" | "22003" | "22021" | "23502" | "42703" => DatabaseErrorKind::InvalidInput,
        // foreign_key_violation
        "23503" => DatabaseErrorKind::ReferenceNotFound,
        // unique_violation, check_violation
        "23505" | "23514" => DatabaseErrorKind::ConstraintViolation,
        // query_canceled (statement_timeout)
        "57014" => DatabaseErrorKind::Timeout,
        _ => DatabaseErrorKind::QueryFailed,
    }
}

// Conversion from sqlx::Error to DatabaseError
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error as E;
        match err {
            E::RowNotFound => Self::new(
                DatabaseOperation::Query,
                DatabaseErrorKind::QueryFailed,
                "Row not found",
            ),
            E::PoolTimedOut => Self::pool_exhausted("Connection pool timed out"),
            E::PoolClosed => Self::connection_failed("Connection pool is closed"),
            E::Protocol(msg) => Self::query_failed(msg),
            E::Configuration(e) => Self::new(
                DatabaseOperation::Connect,
                DatabaseErrorKind::Configuration,
                e.to_string(),
            ),
            E::Io(e) => Self::connection_failed(e.to_string()),
            E::Tls(e) => Self::connection_failed(format!("TLS error: {}", e)),
            E::TypeNotFound { type_name } => {
                Self::type_conversion(format!("Type not found: {}", type_name))
            }
            E::ColumnNotFound(col) => Self::query_failed(format!("Column not found: {}", col)),
            E::ColumnDecode { index, source } => {
                Self::type_conversion(format!("Failed to decode column {}: {}", index, source))
            }
            E::Decode(e) => Self::type_conversion(e.to_string()),
            E::Database(db_err) => match db_err.code() {
                Some(code) => Self::with_context(
                    DatabaseOperation::Query,
                    kind_for_sqlstate(&code),
                    db_err.message(),
                    format!("sqlstate {}", code),
                ),
                None => Self::query_failed(db_err.to_string()),
            },
            E::WorkerCrashed => Self::connection_failed("Database worker crashed"),
            _ => Self::new(
                DatabaseOperation::Query,
                DatabaseErrorKind::Other,
                err.to_string(),
            ),
        }
    }
}
