//! UPDATE statement rendering.

use crate::error::{PropsError, PropsResult};
use crate::param::ParamList;
use crate::value::SqlValue;

/// The result of building a query.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: ParamList,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: impl Into<String>, params: ParamList) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// UPDATE query builder.
///
/// SET columns are rendered first and numbered from `$1`; WHERE parameters
/// continue the numbering after the last SET parameter.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    set_fields: Vec<(String, SqlValue)>,
    where_eq: Vec<(String, SqlValue)>,
    returning_cols: Vec<String>,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_fields: Vec::new(),
            where_eq: Vec::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.set_fields.push((column.to_string(), value.into()));
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.where_eq.push((column.to_string(), value.into()));
        self
    }

    /// Set RETURNING columns (string form).
    pub fn returning(mut self, cols: &str) -> Self {
        self.returning_cols = vec![cols.to_string()];
        self
    }

    /// Number of SET assignments collected so far.
    pub fn set_count(&self) -> usize {
        self.set_fields.len()
    }

    /// Validate builder state before execution.
    pub fn validate(&self) -> PropsResult<()> {
        if self.set_fields.is_empty() {
            return Err(PropsError::NoFieldsSpecified);
        }
        Ok(())
    }

    /// Build the UPDATE SQL and parameters.
    pub fn build(&self) -> PropsResult<BuiltQuery> {
        self.validate()?;

        let mut params = ParamList::new();

        let set_parts: Vec<String> = self
            .set_fields
            .iter()
            .map(|(col, value)| {
                let idx = params.push(value.clone());
                format!("{} = ${}", col, idx)
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));

        if !self.where_eq.is_empty() {
            let where_parts: Vec<String> = self
                .where_eq
                .iter()
                .map(|(col, value)| {
                    let idx = params.push(value.clone());
                    format!("{} = ${}", col, idx)
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        Ok(BuiltQuery::new(sql, params))
    }
}
