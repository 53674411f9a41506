//! PostgreSQL pool management and the [`StoreExecutor`] backed by it

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{sanitize_url, DatabaseError, Result};
use crate::store::{BindValue, Row, Rows, Statement, StoreExecutor};

/// Create a PostgreSQL connection pool with retry logic
///
/// Retries `max_retries` times with exponential backoff starting at
/// `retry_delay_secs`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "Database connection pool created: max={}, min={}",
                        config.max_connections,
                        config.min_connections
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    tracing::error!(
                        url = %sanitize_url(&config.url),
                        "Failed to connect to database after {} attempts: {}",
                        config.max_retries + 1,
                        e
                    );
                    return Err(e.into());
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));
                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, DatabaseError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| {
            DatabaseError::connection_failed(format!(
                "Failed to connect to database at '{}': {}",
                sanitize_url(&config.url),
                e
            ))
        })
}

/// [`StoreExecutor`] over a [`PgPool`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `config`, with retries
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(create_pool(config).await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl StoreExecutor for PgStore {
    async fn fetch(&self, statement: &Statement) -> std::result::Result<Rows, DatabaseError> {
        let mut query = sqlx::query(statement.sql());
        for value in statement.binds() {
            query = match value {
                BindValue::Text(s) => query.bind(s.as_str()),
                BindValue::Integer(n) => query.bind(*n),
            };
        }

        tracing::trace!(statement = %statement, "Executing statement");
        let rows = query.fetch_all(&self.pool).await?;

        let rows = rows
            .iter()
            .map(row_to_map)
            .collect::<std::result::Result<Vec<Row>, sqlx::Error>>()?;
        Ok(Rows::new(rows))
    }
}

fn row_to_map(row: &PgRow) -> std::result::Result<Row, sqlx::Error> {
    let mut map = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column.type_info().name())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn decode_column(
    row: &PgRow,
    index: usize,
    type_name: &str,
) -> std::result::Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "INT2" => Value::from(row.try_get::<i16, _>(index)?),
        "INT4" => Value::from(row.try_get::<i32, _>(index)?),
        "INT8" => Value::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => float(f64::from(row.try_get::<f32, _>(index)?)),
        "FLOAT8" => float(row.try_get::<f64, _>(index)?),
        "BOOL" => Value::from(row.try_get::<bool, _>(index)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
            Value::from(row.try_get::<String, _>(index)?)
        }
        "TIMESTAMP" => {
            let value = row.try_get::<NaiveDateTime, _>(index)?;
            Value::from(value.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        "TIMESTAMPTZ" => {
            let value = row.try_get::<DateTime<Utc>, _>(index)?;
            Value::from(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
        other => {
            return Err(sqlx::Error::ColumnDecode {
                index: index.to_string(),
                source: format!("unsupported column type {}", other).into(),
            })
        }
    };
    Ok(value)
}
