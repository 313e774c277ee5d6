//! Database access trait.

use crate::error::PropsResult;
use crate::param::ParamList;
use crate::row::JsonRow;
use std::future::Future;

/// A query-executing capability: SQL text plus positional parameters in,
/// decoded rows out.
///
/// The repository functions in [`crate::store`] only talk to this trait, so a
/// pool, a single connection or a test double can stand behind them.
pub trait Database: Send + Sync {
    /// Execute a statement and return all rows it produced.
    fn fetch_rows(
        &self,
        sql: &str,
        params: &ParamList,
    ) -> impl Future<Output = PropsResult<Vec<JsonRow>>> + Send;
}

#[cfg(feature = "pool")]
mod pooled {
    use super::Database;
    use crate::error::{PropsError, PropsResult};
    use crate::param::ParamList;
    use crate::row::{FromRow, JsonRow, with_row_json};

    impl Database for deadpool_postgres::Pool {
        async fn fetch_rows(&self, sql: &str, params: &ParamList) -> PropsResult<Vec<JsonRow>> {
            let client = self.get().await?;
            let rows = client
                .query(&with_row_json(sql), &params.as_refs())
                .await
                .map_err(PropsError::from_db_error)?;
            rows.iter().map(JsonRow::from_row).collect()
        }
    }
}
