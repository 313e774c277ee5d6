//! Component and properties queries.

use crate::client::Database;
use crate::error::PropsResult;
use crate::param::ParamList;
use crate::patch::{COMPONENT_KEY, ComponentId, PROPERTIES_TABLE, PropertiesPatch};
use crate::row::JsonRow;

/// `SELECT * FROM components`
pub const LIST_COMPONENTS_SQL: &str = "SELECT * FROM components";

/// Statement fetching the properties row of one component.
pub fn find_properties_sql() -> String {
    format!("SELECT * FROM {PROPERTIES_TABLE} WHERE {COMPONENT_KEY} = $1")
}

fn log_sql(tag: &str, sql: &str, params: &ParamList) {
    tracing::debug!(
        target: "compprops.sql",
        tag,
        param_count = params.len(),
        sql = %sql,
    );
}

/// All component rows, in the order the database returns them.
pub async fn list_components<D: Database>(db: &D) -> PropsResult<Vec<JsonRow>> {
    let params = ParamList::new();
    log_sql("list_components", LIST_COMPONENTS_SQL, &params);
    db.fetch_rows(LIST_COMPONENTS_SQL, &params).await
}

/// The properties row of `id`, or `None` when the component has none.
pub async fn find_properties<D: Database>(db: &D, id: ComponentId) -> PropsResult<Option<JsonRow>> {
    let sql = find_properties_sql();
    let params: ParamList = [id].into_iter().collect();
    log_sql("find_properties", &sql, &params);
    let rows = db.fetch_rows(&sql, &params).await?;
    Ok(rows.into_iter().next())
}

/// Apply `patch` to the properties row of `id` and return the updated row.
///
/// Fails with [`crate::PropsError::NoFieldsSpecified`] before touching the
/// database when the patch is empty. Returns `None` when no row matched.
pub async fn update_properties<D: Database>(
    db: &D,
    id: ComponentId,
    patch: &PropertiesPatch,
) -> PropsResult<Option<JsonRow>> {
    let query = patch.build(id)?;
    log_sql("update_properties", &query.sql, &query.params);
    let rows = db.fetch_rows(&query.sql, &query.params).await?;
    Ok(rows.into_iter().next())
}
