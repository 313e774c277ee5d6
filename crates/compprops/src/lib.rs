//! # compprops
//!
//! Storage layer for UI components and their sizing properties.
//!
//! ## Features
//!
//! - **Partial updates**: only the properties a caller sent are written; an
//!   explicit `null` resets a property to `"auto"`
//! - **Deterministic SQL**: SET fragments follow a fixed column order and
//!   placeholders are numbered while rendering
//! - **Pass-through rows**: rows are returned as JSON objects, whatever the
//!   table's shape
//! - **Substitutable backend**: every query goes through the [`Database`] trait
//!
//! ## Partial update
//!
//! ```ignore
//! use compprops::{ComponentId, PropertiesPatch, store};
//!
//! let patch = PropertiesPatch::from_json_slice(br#"{"margin_top": 10, "padding_left": null}"#)?;
//! // UPDATE properties SET margin_top = $1, padding_left = $2 WHERE component_id = $3 RETURNING *
//! let row = store::update_properties(&pool, ComponentId(1), &patch).await?;
//! ```

pub mod client;
pub mod error;
pub mod param;
pub mod patch;
pub mod row;
pub mod store;
pub mod update;
pub mod value;

pub use client::Database;
pub use error::{PropsError, PropsResult};
pub use param::ParamList;
pub use patch::{AUTO, Column, ComponentId, Dimension, PropertiesPatch};
pub use row::{FromRow, JsonRow, RowExt};
pub use update::{BuiltQuery, UpdateQb};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
