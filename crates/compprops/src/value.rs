//! Bound parameter values.
//!
//! Request values arrive as JSON, so their Postgres type is only known once the
//! server has inferred the type of each placeholder. `SqlValue` defers the
//! encoding decision to that point: numbers bind natively to integer, float and
//! numeric columns and as decimal text to text-like columns, and text is parsed
//! when the column is numeric.

use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

/// A single positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Text value, parsed when bound to a numeric column.
    Text(String),
    /// JSON number.
    Number(serde_json::Number),
    /// Integer identifier.
    Int(i64),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<serde_json::Number> for SqlValue {
    fn from(value: serde_json::Number) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

fn is_text(ty: &Type) -> bool {
    <String as ToSql>::accepts(ty)
}

fn out_of_range(value: impl std::fmt::Display, ty: &Type) -> BoxError {
    format!("value {value} is out of range for type {ty}").into()
}

fn invalid_input(value: &str, ty: &Type) -> BoxError {
    format!("invalid input syntax for type {ty}: \"{value}\"").into()
}

/// Decimal text of a JSON number. Integral floats drop their fraction, so
/// `10.0` renders as `10`.
fn number_text(value: &serde_json::Number) -> String {
    match value.as_f64() {
        Some(v) if value.is_f64() => v.to_string(),
        _ => value.to_string(),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn int_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::INT4 => i32::try_from(value)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::FLOAT4 | Type::FLOAT8 => float_to_sql(value as f64, ty, out),
        Type::NUMERIC => Decimal::from(value).to_sql(ty, out),
        _ if is_text(ty) => value.to_string().to_sql(ty, out),
        _ => Err(Box::new(WrongType::new::<i64>(ty.clone()))),
    }
}

fn float_to_sql(value: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::FLOAT4 {
        (value as f32).to_sql(ty, out)
    } else {
        value.to_sql(ty, out)
    }
}

fn number_to_sql(
    value: &serde_json::Number,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => match value.as_i64() {
            Some(v) => int_to_sql(v, ty, out),
            None => Err(format!("value {value} is not an integer").into()),
        },
        Type::FLOAT4 | Type::FLOAT8 => {
            let v = value.as_f64().ok_or_else(|| out_of_range(value, ty))?;
            float_to_sql(v, ty, out)
        }
        Type::NUMERIC => {
            let raw = value.to_string();
            parse_decimal(&raw)
                .ok_or_else(|| out_of_range(&raw, ty))?
                .to_sql(ty, out)
        }
        _ if is_text(ty) => number_text(value).to_sql(ty, out),
        _ => Err(Box::new(WrongType::new::<f64>(ty.clone()))),
    }
}

fn text_to_sql(value: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let trimmed = value.trim();
    match *ty {
        _ if is_text(ty) => value.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => {
            let v: i64 = trimmed.parse().map_err(|_| invalid_input(value, ty))?;
            int_to_sql(v, ty, out)
        }
        Type::FLOAT4 | Type::FLOAT8 => {
            let v: f64 = trimmed.parse().map_err(|_| invalid_input(value, ty))?;
            float_to_sql(v, ty, out)
        }
        Type::NUMERIC => parse_decimal(trimmed)
            .ok_or_else(|| invalid_input(value, ty))?
            .to_sql(ty, out),
        _ => Err(Box::new(WrongType::new::<String>(ty.clone()))),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Self::Text(v) => text_to_sql(v, ty, out),
            Self::Number(v) => number_to_sql(v, ty, out),
            Self::Int(v) => int_to_sql(*v, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        is_text(ty)
            || matches!(
                *ty,
                Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::NUMERIC
            )
    }

    to_sql_checked!();
}
