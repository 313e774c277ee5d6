//! Row mapping traits and utilities

use crate::error::{PropsError, PropsResult};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// Trait for converting a database row into a Rust value.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> PropsResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value by index, returning PropsError::Decode on failure
    fn try_get_column<'a, T>(&'a self, idx: usize) -> PropsResult<T>
    where
        T: FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<'a, T>(&'a self, idx: usize) -> PropsResult<T>
    where
        T: FromSql<'a>,
    {
        self.try_get(idx).map_err(|e| {
            let name = self
                .columns()
                .get(idx)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| idx.to_string());
            PropsError::decode(name, e.to_string())
        })
    }
}

/// Name of the whole-row JSON column added by [`with_row_json`].
pub const ROW_JSON_COLUMN: &str = "_compprops_row";

/// Wrap a row-returning statement so each row also carries Postgres' own JSON
/// rendering of itself in [`ROW_JSON_COLUMN`].
///
/// Columns without a native decoder (enums, arrays, domains, `bytea`,
/// `interval`, ...) are read from that rendering.
pub fn with_row_json(sql: &str) -> String {
    format!("WITH r AS ({sql}) SELECT r.*, row_to_json(r) AS {ROW_JSON_COLUMN} FROM r")
}

/// A row passed through as a JSON object keyed by column name.
///
/// Columns keep the order the database returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonRow(pub Map<String, Value>);

impl JsonRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }
}

impl From<Map<String, Value>> for JsonRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromRow for JsonRow {
    fn from_row(row: &Row) -> PropsResult<Self> {
        let columns = row.columns();
        let whole = match columns.iter().position(|c| c.name() == ROW_JSON_COLUMN) {
            Some(idx) => row.try_get_column::<Option<Value>>(idx)?,
            None => None,
        };

        let mut map = Map::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if column.name() == ROW_JSON_COLUMN {
                continue;
            }
            let value = match column_to_json(row, idx, column.type_()) {
                Some(decoded) => decoded?,
                None => whole
                    .as_ref()
                    .and_then(|w| w.get(column.name()))
                    .cloned()
                    .ok_or_else(|| {
                        PropsError::decode(
                            column.name(),
                            format!("unsupported column type {}", column.type_()),
                        )
                    })?,
            };
            map.insert(column.name().to_string(), value);
        }
        Ok(Self(map))
    }
}

fn opt_json<'a, T, F>(row: &'a Row, idx: usize, f: F) -> PropsResult<Value>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    Ok(row
        .try_get_column::<Option<T>>(idx)?
        .map(f)
        .unwrap_or(Value::Null))
}

/// Decode a column with a native decoder, `None` when its type has none.
fn column_to_json(row: &Row, idx: usize, ty: &Type) -> Option<PropsResult<Value>> {
    let decoded = match *ty {
        Type::BOOL => opt_json(row, idx, Value::Bool),
        Type::INT2 => opt_json(row, idx, |v: i16| Value::from(v)),
        Type::INT4 => opt_json(row, idx, |v: i32| Value::from(v)),
        Type::INT8 => opt_json(row, idx, |v: i64| Value::from(v)),
        Type::OID => opt_json(row, idx, |v: u32| Value::from(v)),
        Type::FLOAT4 => opt_json(row, idx, |v: f32| Value::from(f64::from(v))),
        Type::FLOAT8 => opt_json(row, idx, |v: f64| Value::from(v)),
        // Rendered as text so no precision is lost.
        Type::NUMERIC => opt_json(row, idx, |v: rust_decimal::Decimal| {
            Value::String(v.to_string())
        }),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            opt_json(row, idx, Value::String)
        }
        Type::JSON | Type::JSONB => opt_json(row, idx, |v: Value| v),
        Type::UUID => opt_json(row, idx, |v: uuid::Uuid| Value::String(v.to_string())),
        Type::DATE => opt_json(row, idx, |v: chrono::NaiveDate| Value::String(v.to_string())),
        Type::TIMESTAMP => opt_json(row, idx, |v: chrono::NaiveDateTime| {
            Value::String(v.and_utc().to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
        }),
        Type::TIMESTAMPTZ => opt_json(row, idx, |v: chrono::DateTime<chrono::Utc>| {
            Value::String(v.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
        }),
        _ => return None,
    };
    Some(decoded)
}
