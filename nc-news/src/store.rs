//! Store execution seam
//!
//! Every query the API issues is rendered into a [`Statement`] (SQL text plus
//! ordered bound values) and handed to a [`StoreExecutor`]. The executor
//! returns [`Rows`]: row mappings of column name to JSON value, decoded into
//! typed records by the caller.
//!
//! ```rust
//! use nc_news::store::{BindValue, Statement};
//!
//! let mut statement = Statement::new("SELECT slug FROM topics WHERE slug = ");
//! statement.push_bind(BindValue::from("mitch"));
//! assert_eq!(statement.sql(), "SELECT slug FROM topics WHERE slug = $1");
//! assert_eq!(statement.binds().len(), 1);
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{DatabaseError, DatabaseOperation};

/// A single row: column name to value
pub type Row = Map<String, Value>;

/// A value passed to the store separately from the statement text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    /// Text parameter
    Text(String),
    /// 64-bit integer parameter
    Integer(i64),
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for BindValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// Parameterized SQL: statement text with `$n` placeholders and their values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    sql: String,
    binds: Vec<BindValue>,
}

impl Statement {
    /// Start a statement from literal SQL text
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    /// Append literal SQL text
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder for `value` and record the value
    pub fn push_bind(&mut self, value: impl Into<BindValue>) -> &mut Self {
        self.binds.push(value.into());
        let placeholder = format!("${}", self.binds.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Builder-style [`push_bind`](Self::push_bind)
    #[must_use]
    pub fn bind(mut self, value: impl Into<BindValue>) -> Self {
        self.push_bind(value);
        self
    }

    /// Builder-style [`push`](Self::push)
    #[must_use]
    pub fn then(mut self, sql: &str) -> Self {
        self.push(sql);
        self
    }

    /// The statement text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound values, in placeholder order
    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.binds.is_empty() {
            let binds: Vec<String> = self.binds.iter().map(ToString::to_string).collect();
            write!(f, " -- [{}]", binds.join(", "))?;
        }
        Ok(())
    }
}

/// Rows returned by the store, plus the row count it reported
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rows {
    rows: Vec<Row>,
    row_count: u64,
}

impl Rows {
    /// Wrap rows; the row count is the number of rows
    pub fn new(rows: Vec<Row>) -> Self {
        let row_count = rows.len() as u64;
        Self { rows, row_count }
    }

    /// Number of rows the store reported
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Check if no rows came back
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the raw row mappings
    pub fn as_slice(&self) -> &[Row] {
        &self.rows
    }

    /// Decode every row into `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>, DatabaseError> {
        self.rows.into_iter().map(decode_row).collect()
    }

    /// Decode the first row into `T`, if any
    pub fn first<T: DeserializeOwned>(self) -> Result<Option<T>, DatabaseError> {
        self.rows.into_iter().next().map(decode_row).transpose()
    }

    /// Read an integer column from the first row
    pub fn scalar_i64(&self, column: &str) -> Result<i64, DatabaseError> {
        self.rows
            .first()
            .and_then(|row| row.get(column))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                DatabaseError::type_conversion(format!(
                    "expected integer column '{}' in first row",
                    column
                ))
            })
    }
}

fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| DatabaseError::type_conversion(format!("Failed to decode row: {}", e)))
}

/// Executes rendered statements against the relational store
///
/// Implementations must not interpret store error codes beyond classifying
/// them into [`DatabaseError`]; mapping to user-facing responses happens at
/// the HTTP boundary.
pub trait StoreExecutor: Send + Sync {
    /// Run `statement` and return all resulting rows
    fn fetch(
        &self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Rows, DatabaseError>> + Send;
}

/// Run a store call under a deadline
///
/// A missed deadline becomes a [`DatabaseErrorKind::Timeout`](crate::error::DatabaseErrorKind::Timeout)
/// error tagged with `operation`.
pub async fn with_timeout<F, T>(
    timeout: Duration,
    operation: DatabaseOperation,
    fut: F,
) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(|e| e.during(operation)),
        Err(_) => Err(DatabaseError::timeout(
            operation,
            format!("Store did not respond within {} ms", timeout.as_millis()),
        )),
    }
}
