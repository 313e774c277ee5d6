//! Ordered positional parameters.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// A collection of parameters that can be built into references.
///
/// Placeholder numbers are handed out by [`ParamList::push`], so the SQL text and
/// the argument list can never disagree on ordering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<SqlValue>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<SqlValue>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The bound values, in placeholder order.
    pub fn values(&self) -> &[SqlValue] {
        &self.params
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}

impl<V: Into<SqlValue>> FromIterator<V> for ParamList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_one_based_index() {
        let mut params = ParamList::new();
        assert!(params.is_empty());
        assert_eq!(params.push("auto"), 1);
        assert_eq!(params.push(42i64), 2);
        assert_eq!(params.len(), 2);
        assert_eq!(
            params.values(),
            &[SqlValue::text("auto"), SqlValue::Int(42)]
        );
        assert_eq!(params.as_refs().len(), 2);
    }
}
