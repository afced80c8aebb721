use revision_core_api::{StoreError, ID_FIELD};
use revision_core_db::models::filter::RecordFilter;
use revision_core_db::models::record::RecordModel;
use sqlx::{types::Json, PgConnection, Postgres, QueryBuilder};
use std::error::Error;
use uuid::Uuid;

use crate::utils::TryFromRow;

/// Appends `(f1 OR f2 ...)` where each filter is a conjunction of exact matches.
///
/// Field values compare as JSONB, so composite values compare structurally and a
/// missing field equals `null`. Operator filters are not supported by this store.
pub(crate) fn push_filter_union(
    builder: &mut QueryBuilder<'_, Postgres>,
    filters: &[RecordFilter],
) -> Result<(), StoreError> {
    builder.push("(");
    for (index, filter) in filters.iter().enumerate() {
        if !filter.is_exact() {
            return Err(StoreError::UnsupportedFilter(
                "operator conditions are not supported by the postgres record store".to_string(),
            ));
        }
        if index > 0 {
            builder.push(" OR ");
        }
        builder.push("(TRUE");
        for (name, value) in filter.conditions() {
            if name == ID_FIELD {
                match value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                    Some(id) => {
                        builder.push(" AND id = ");
                        builder.push_bind(id);
                    }
                    None => {
                        builder.push(" AND FALSE");
                    }
                }
            } else {
                builder.push(" AND COALESCE(fields -> ");
                builder.push_bind(name.clone());
                builder.push(", 'null'::jsonb) = ");
                builder.push_bind(Json(value.clone()));
            }
        }
        builder.push(")");
    }
    builder.push(")");
    Ok(())
}

/// Every record of `collection` matching one of `filters`, ordered by id.
pub(crate) async fn fetch_matching(
    conn: &mut PgConnection,
    collection: &str,
    filters: &[RecordFilter],
) -> Result<Vec<RecordModel>, Box<dyn Error + Send + Sync>> {
    if filters.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        QueryBuilder::<Postgres>::new("SELECT id, fields FROM record_document WHERE collection = ");
    builder.push_bind(collection.to_string());
    builder.push(" AND ");
    push_filter_union(&mut builder, filters)?;
    builder.push(" ORDER BY id");

    let rows = builder.build().fetch_all(&mut *conn).await?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(RecordModel::try_from_row(&row)?);
    }
    Ok(records)
}
