//! Partial updates of a component's sizing properties.
//!
//! A [`PropertiesPatch`] keeps the three states of every field apart:
//!
//! - `None`: the field was absent and is left untouched
//! - `Some(None)`: the field was sent as `null` and is reset to [`AUTO`]
//! - `Some(Some(v))`: the field is set to `v`
//!
//! Turning a patch into SQL happens in two steps. [`PropertiesPatch::assignments`]
//! decides which columns change and to what, in canonical column order.
//! [`PropertiesPatch::to_update`] hands those pairs to [`UpdateQb`], which numbers
//! the placeholders while rendering.

use crate::error::{PropsError, PropsResult};
use crate::update::{BuiltQuery, UpdateQb};
use crate::value::SqlValue;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Table holding one properties row per component.
pub const PROPERTIES_TABLE: &str = "properties";

/// Foreign key column linking a properties row to its component.
pub const COMPONENT_KEY: &str = "component_id";

/// Value stored when a caller clears a field: no explicit size, use automatic layout.
pub const AUTO: &str = "auto";

/// Numeric component identifier taken from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub i64);

impl ComponentId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for ComponentId {
    type Err = PropsError;

    fn from_str(raw: &str) -> PropsResult<Self> {
        raw.trim()
            .parse::<i64>()
            .map(ComponentId)
            .map_err(|_| PropsError::invalid_identifier(raw))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ComponentId> for SqlValue {
    fn from(id: ComponentId) -> Self {
        SqlValue::Int(id.0)
    }
}

/// An updatable sizing column, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    MarginTop,
    MarginBottom,
    MarginLeft,
    MarginRight,
    PaddingTop,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
}

impl Column {
    /// Every column, in the order SET fragments are emitted.
    pub const ALL: [Column; 8] = [
        Column::MarginTop,
        Column::MarginBottom,
        Column::MarginLeft,
        Column::MarginRight,
        Column::PaddingTop,
        Column::PaddingBottom,
        Column::PaddingLeft,
        Column::PaddingRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::MarginTop => "margin_top",
            Column::MarginBottom => "margin_bottom",
            Column::MarginLeft => "margin_left",
            Column::MarginRight => "margin_right",
            Column::PaddingTop => "padding_top",
            Column::PaddingBottom => "padding_bottom",
            Column::PaddingLeft => "padding_left",
            Column::PaddingRight => "padding_right",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete size sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Number(serde_json::Number),
    Text(String),
}

impl From<Dimension> for SqlValue {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Number(n) => SqlValue::Number(n),
            Dimension::Text(s) => SqlValue::Text(s),
        }
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => Ok(Dimension::Number(n)),
            serde_json::Value::String(s) => Ok(Dimension::Text(s)),
            serde_json::Value::Null => Err(D::Error::custom("unexpected null")),
            serde_json::Value::Bool(_) => Err(D::Error::custom(
                "expected a number or a string, found a boolean",
            )),
            serde_json::Value::Array(_) => Err(D::Error::custom(
                "expected a number or a string, found an array",
            )),
            serde_json::Value::Object(_) => Err(D::Error::custom(
                "expected a number or a string, found an object",
            )),
        }
    }
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Dimension>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Dimension>::deserialize(deserializer).map(Some)
}

/// Sparse set of property assignments for one component.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertiesPatch {
    #[serde(default, deserialize_with = "present")]
    pub margin_top: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub margin_bottom: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub margin_left: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub margin_right: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub padding_top: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub padding_bottom: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub padding_left: Option<Option<Dimension>>,
    #[serde(default, deserialize_with = "present")]
    pub padding_right: Option<Option<Dimension>>,
}

impl PropertiesPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a request body. An empty body is an empty patch.
    pub fn from_json_slice(body: &[u8]) -> PropsResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| PropsError::invalid_body(e.to_string()))?;
        if !value.is_object() {
            return Err(PropsError::invalid_body("expected a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| PropsError::invalid_body(e.to_string()))
    }

    fn field(&self, column: Column) -> &Option<Option<Dimension>> {
        match column {
            Column::MarginTop => &self.margin_top,
            Column::MarginBottom => &self.margin_bottom,
            Column::MarginLeft => &self.margin_left,
            Column::MarginRight => &self.margin_right,
            Column::PaddingTop => &self.padding_top,
            Column::PaddingBottom => &self.padding_bottom,
            Column::PaddingLeft => &self.padding_left,
            Column::PaddingRight => &self.padding_right,
        }
    }

    fn field_mut(&mut self, column: Column) -> &mut Option<Option<Dimension>> {
        match column {
            Column::MarginTop => &mut self.margin_top,
            Column::MarginBottom => &mut self.margin_bottom,
            Column::MarginLeft => &mut self.margin_left,
            Column::MarginRight => &mut self.margin_right,
            Column::PaddingTop => &mut self.padding_top,
            Column::PaddingBottom => &mut self.padding_bottom,
            Column::PaddingLeft => &mut self.padding_left,
            Column::PaddingRight => &mut self.padding_right,
        }
    }

    /// Set a column to a concrete value.
    pub fn set(mut self, column: Column, value: Dimension) -> Self {
        *self.field_mut(column) = Some(Some(value));
        self
    }

    /// Mark a column as explicitly null.
    pub fn clear(mut self, column: Column) -> Self {
        *self.field_mut(column) = Some(None);
        self
    }

    /// Whether no recognized field is present.
    pub fn is_empty(&self) -> bool {
        Column::ALL.iter().all(|c| self.field(*c).is_none())
    }

    /// The columns to write and their bound values, in canonical column order.
    ///
    /// Explicit nulls are replaced by [`AUTO`].
    pub fn assignments(&self) -> Vec<(Column, SqlValue)> {
        Column::ALL
            .iter()
            .filter_map(|&column| {
                let value = self.field(column).as_ref()?;
                let bound = match value {
                    Some(v) => SqlValue::from(v.clone()),
                    None => SqlValue::text(AUTO),
                };
                Some((column, bound))
            })
            .collect()
    }

    /// `UPDATE properties SET ... WHERE component_id = $n RETURNING *`
    pub fn to_update(&self, id: ComponentId) -> UpdateQb {
        self.assignments()
            .into_iter()
            .fold(UpdateQb::new(PROPERTIES_TABLE), |qb, (column, value)| {
                qb.set(column.as_str(), value)
            })
            .eq(COMPONENT_KEY, id)
            .returning("*")
    }

    /// Render the update, failing with [`PropsError::NoFieldsSpecified`] when
    /// no field is present.
    pub fn build(&self, id: ComponentId) -> PropsResult<BuiltQuery> {
        self.to_update(id).build()
    }
}

#[cfg(test)]
mod tests;
