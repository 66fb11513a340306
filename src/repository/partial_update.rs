//! Partial ("set only the present fields") updates
//!
//! Each updatable record declares a static [`UpdateTarget`]: the table, its
//! key column and an allow-list of [`FieldSpec`]s mapping a JSON field to a
//! column and a validator. [`build_update`] walks that allow-list once against
//! the request payload and produces a single parameterized statement whose
//! argument list ends with the primary key. Only identifiers from the
//! allow-list ever reach the SQL text; every value is bound.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use sqlx::{query::Query, Postgres};
use std::str::FromStr;
use thiserror::Error;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};

/// A validated value ready to be bound to a statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(i32),
    Bool(bool),
    Money(Decimal),
    Date(Option<NaiveDate>),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    fn bind_to<'q>(&'q self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Text(v) => query.bind(v.as_deref()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Money(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::Timestamp(v) => query.bind(*v),
        }
    }
}

/// Turns a raw JSON value into a bindable value, or explains why it can't
pub type FieldValidator = fn(&Value) -> Result<SqlValue, String>;

/// One allow-listed field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub column: &'static str,
    pub validate: FieldValidator,
}

impl FieldSpec {
    pub const fn new(field: &'static str, column: &'static str, validate: FieldValidator) -> Self {
        Self { field, column, validate }
    }
}

/// An updatable record type
#[derive(Debug)]
pub struct UpdateTarget {
    /// Name used in "not found" messages
    pub entity: &'static str,
    pub table: &'static str,
    pub key_column: &'static str,
    /// Timestamp column refreshed on every update; never counts as a field
    pub touch_column: Option<&'static str>,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error("no valid fields provided for update")]
    NoFieldsProvided,

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl From<UpdateError> for AppError {
    fn from(e: UpdateError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// A built `UPDATE` statement and its ordered arguments
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    sql: String,
    args: Vec<SqlValue>,
}

impl UpdateStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Query with every argument bound in order
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        self.args
            .iter()
            .fold(sqlx::query(&self.sql), |query, arg| arg.bind_to(query))
    }
}

/// Build the statement for `payload` against the record identified by `key`.
///
/// Validation runs over every present field before anything is returned, so
/// a single bad field yields an error and no statement at all.
pub fn build_update(
    target: &UpdateTarget,
    key: SqlValue,
    payload: &Map<String, Value>,
) -> Result<UpdateStatement, UpdateError> {
    build_update_at(target, key, payload, Utc::now())
}

fn build_update_at(
    target: &UpdateTarget,
    key: SqlValue,
    payload: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<UpdateStatement, UpdateError> {
    let mut sets = Vec::new();
    let mut args = Vec::new();

    for spec in target.fields {
        let Some(raw) = payload.get(spec.field) else {
            continue;
        };
        let value = (spec.validate)(raw).map_err(|reason| UpdateError::InvalidField {
            field: spec.field,
            reason,
        })?;
        args.push(value);
        sets.push(format!("{} = ${}", spec.column, args.len()));
    }

    if sets.is_empty() {
        return Err(UpdateError::NoFieldsProvided);
    }

    if let Some(column) = target.touch_column {
        args.push(SqlValue::Timestamp(now));
        sets.push(format!("{} = ${}", column, args.len()));
    }

    args.push(key);
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        target.table,
        sets.join(", "),
        target.key_column,
        args.len()
    );

    Ok(UpdateStatement { sql, args })
}

/// Something that can run an update and report the affected row count
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateExecutor: Send + Sync {
    async fn execute_update(&self, statement: &UpdateStatement) -> AppResult<u64>;
}

/// Validate, build and execute a partial update.
///
/// Fails with `NotFound` when the key matched no row.
pub async fn apply_update<E>(
    executor: &E,
    target: &UpdateTarget,
    key: SqlValue,
    payload: &Map<String, Value>,
) -> AppResult<()>
where
    E: UpdateExecutor + ?Sized,
{
    let statement = build_update(target, key, payload)?;

    let affected = executor.execute_update(&statement).await?;
    if affected == 0 {
        tracing::debug!(table = target.table, "update matched no rows");
        return Err(AppError::NotFound(format!("{} not found", target.entity)));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

fn as_str(value: &Value) -> Result<&str, String> {
    value.as_str().ok_or_else(|| "must be a string".to_string())
}

/// Non-empty text; surrounding whitespace is trimmed
pub fn required_text(value: &Value) -> Result<SqlValue, String> {
    let text = as_str(value)?.trim();
    if text.is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(SqlValue::Text(Some(text.to_string())))
}

/// Text that may be cleared with `null`
pub fn nullable_text(value: &Value) -> Result<SqlValue, String> {
    if value.is_null() {
        return Ok(SqlValue::Text(None));
    }
    Ok(SqlValue::Text(Some(as_str(value)?.trim().to_string())))
}

pub fn email(value: &Value) -> Result<SqlValue, String> {
    let text = as_str(value)?.trim();
    if !text.validate_email() {
        return Err("invalid email format".to_string());
    }
    Ok(SqlValue::Text(Some(text.to_string())))
}

fn as_i32(value: &Value) -> Result<i32, String> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| "must be an integer".to_string())
}

pub fn positive_int(value: &Value) -> Result<SqlValue, String> {
    match as_i32(value)? {
        n if n > 0 => Ok(SqlValue::Int(n)),
        _ => Err("must be positive".to_string()),
    }
}

pub fn non_negative_int(value: &Value) -> Result<SqlValue, String> {
    match as_i32(value)? {
        n if n >= 0 => Ok(SqlValue::Int(n)),
        _ => Err("must be non-negative".to_string()),
    }
}

pub fn boolean(value: &Value) -> Result<SqlValue, String> {
    value
        .as_bool()
        .map(SqlValue::Bool)
        .ok_or_else(|| "must be a boolean".to_string())
}

/// Parse an amount given either as a JSON number or a decimal string
pub fn parse_money(value: &Value) -> Result<Decimal, String> {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).or_else(|_| Decimal::from_scientific(&n.to_string())),
        Value::String(s) => Decimal::from_str(s.trim()),
        _ => return Err("must be a number".to_string()),
    };
    parsed.map_err(|_| "must be a number".to_string())
}

pub fn non_negative_money(value: &Value) -> Result<SqlValue, String> {
    let amount = parse_money(value)?;
    if amount < Decimal::ZERO {
        return Err("must be non-negative".to_string());
    }
    Ok(SqlValue::Money(amount))
}

pub fn positive_money(value: &Value) -> Result<SqlValue, String> {
    let amount = parse_money(value)?;
    if amount <= Decimal::ZERO {
        return Err("must be positive".to_string());
    }
    Ok(SqlValue::Money(amount))
}

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    let text = as_str(value).map_err(|_| "must be a date in YYYY-MM-DD format".to_string())?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| "must be a date in YYYY-MM-DD format".to_string())
}

pub fn required_date(value: &Value) -> Result<SqlValue, String> {
    parse_date(value).map(|d| SqlValue::Date(Some(d)))
}

/// Date that may be cleared with `null`
pub fn nullable_date(value: &Value) -> Result<SqlValue, String> {
    if value.is_null() {
        return Ok(SqlValue::Date(None));
    }
    parse_date(value).map(|d| SqlValue::Date(Some(d)))
}
