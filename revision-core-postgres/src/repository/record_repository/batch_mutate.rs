use async_trait::async_trait;
use revision_core_api::{FieldMap, StoreError, ID_FIELD};
use revision_core_db::models::batch_operation::{BatchOperation, BatchResult};
use revision_core_db::models::filter::RecordFilter;
use revision_core_db::models::record::RecordModel;
use revision_core_db::repository::batch_mutate::BatchMutate;
use revision_core_db::utils::hash_as_i64;
use sqlx::{types::Json, PgConnection};
use std::error::Error;
use tracing::debug;

use super::filter_sql::fetch_matching;
use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    /// Applies the batch under a savepoint of the session transaction.
    ///
    /// A failing operation rolls back to the savepoint, so the batch leaves no trace
    /// and the session transaction stays usable for the caller.
    pub(super) async fn batch_mutate_impl(
        repo: &RecordRepositoryImpl,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        sqlx::query("SAVEPOINT record_batch")
            .execute(&mut **transaction)
            .await?;

        match apply_operations(&mut **transaction, &repo.collection, operations).await {
            Ok(result) => {
                sqlx::query("RELEASE SAVEPOINT record_batch")
                    .execute(&mut **transaction)
                    .await?;
                Ok(result)
            }
            Err(e) => {
                debug!(collection = %repo.collection, error = %e, "batch rolled back");
                sqlx::query("ROLLBACK TO SAVEPOINT record_batch")
                    .execute(&mut **transaction)
                    .await?;
                Err(e)
            }
        }
    }
}

async fn apply_operations(
    conn: &mut PgConnection,
    collection: &str,
    operations: Vec<BatchOperation>,
) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
    let mut result = BatchResult::default();
    for operation in operations {
        match operation {
            BatchOperation::Insert { document } => {
                insert(conn, collection, &document).await?;
                result.inserted += 1;
            }
            BatchOperation::Update { filter, set } => {
                update(conn, collection, &filter, &set, &mut result).await?;
            }
        }
    }
    Ok(result)
}

async fn insert(
    conn: &mut PgConnection,
    collection: &str,
    document: &RecordModel,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let hash = hash_as_i64(&document.fields)?;
    let inserted = sqlx::query(
        r#"
        INSERT INTO record_document (collection, id, fields, hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (collection, id) DO NOTHING
        "#,
    )
    .bind(collection)
    .bind(document.id)
    .bind(Json(&document.fields))
    .bind(hash)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Err(StoreError::DuplicateId(document.id).into());
    }
    Ok(())
}

async fn update(
    conn: &mut PgConnection,
    collection: &str,
    filter: &RecordFilter,
    set: &FieldMap,
    result: &mut BatchResult,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if set.contains_key(ID_FIELD) {
        return Err(StoreError::Rejected("the identifier cannot be updated".to_string()).into());
    }

    let matching = fetch_matching(conn, collection, std::slice::from_ref(filter)).await?;
    for mut record in matching {
        result.matched += 1;
        let previous_hash = hash_as_i64(&record.fields)?;
        for (name, value) in set {
            record.set(name.clone(), value.clone());
        }
        let hash = hash_as_i64(&record.fields)?;
        if hash == previous_hash {
            continue;
        }

        sqlx::query(
            r#"
            UPDATE record_document SET fields = $3, hash = $4
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(record.id)
        .bind(Json(&record.fields))
        .bind(hash)
        .execute(&mut *conn)
        .await?;
        result.modified += 1;
    }
    Ok(())
}

#[async_trait]
impl BatchMutate for RecordRepositoryImpl {
    async fn batch_mutate(
        &self,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn Error + Send + Sync>> {
        Self::batch_mutate_impl(self, operations).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use revision_core_api::{Action, FieldMap, HistoryContext, HistoryOptions};
    use revision_core_db::history::tracker::HistoryTracker;
    use revision_core_db::models::batch_operation::BatchOperation;
    use revision_core_db::models::filter::RecordFilter;
    use revision_core_db::models::record::RecordModel;
    use revision_core_db::repository::batch_mutate::BatchMutate;
    use revision_core_db::repository::load::Load;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn fields(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_batch_insert_and_update() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(ctx) = setup_test_context().await? else {
            return Ok(());
        };
        let repo = ctx.record_repository();
        let a = RecordModel::new(Uuid::new_v4(), fields(json!({"region": "north", "open": false})));
        let b = RecordModel::new(Uuid::new_v4(), fields(json!({"region": "north", "open": true})));

        let result = repo
            .batch_mutate(vec![
                BatchOperation::insert(a.clone()),
                BatchOperation::insert(b.clone()),
                BatchOperation::update(
                    RecordFilter::new().eq("region", json!("north")),
                    fields(json!({"open": true})),
                ),
            ])
            .await?;

        assert_eq!(result.inserted, 2);
        assert_eq!(result.matched, 2);
        assert_eq!(result.modified, 1);
        assert_eq!(repo.load(a.id).await?.unwrap().fields["open"], json!(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_no_trace() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(ctx) = setup_test_context().await? else {
            return Ok(());
        };
        let repo = ctx.record_repository();
        let existing = RecordModel::new(Uuid::new_v4(), fields(json!({"title": "a"})));
        repo.batch_mutate(vec![BatchOperation::insert(existing.clone())]).await?;

        let fresh = RecordModel::new(Uuid::new_v4(), fields(json!({"title": "b"})));
        let result = repo
            .batch_mutate(vec![
                BatchOperation::insert(fresh.clone()),
                BatchOperation::insert(existing.clone()),
            ])
            .await;

        assert!(result.is_err());
        assert!(repo.load(fresh.id).await?.is_none());
        assert_eq!(repo.load(existing.id).await?, Some(existing));
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_history_on_postgres() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(ctx) = setup_test_context().await? else {
            return Ok(());
        };
        let repo = ctx.record_repository();
        let tracker = HistoryTracker::new(repo.clone(), HistoryOptions::new().omit(["updatedAt"]))?;
        let id = Uuid::new_v4();

        tracker
            .with_context(HistoryContext::new().with_reason("feed import"))
            .batch_mutate(vec![
                BatchOperation::insert(RecordModel::new(
                    id,
                    fields(json!({"title": "Reading club", "updatedAt": "t0"})),
                )),
                BatchOperation::update(
                    RecordFilter::by_id(id),
                    fields(json!({"title": "Reading circle", "updatedAt": "t1"})),
                ),
            ])
            .await?;

        let stored = repo.load(id).await?.unwrap();
        let history = tracker.history(&stored)?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action(), Action::Created);
        assert_eq!(history[0].state, fields(json!({"title": "Reading club"})));
        assert_eq!(history[1].action(), Action::Updated);
        assert_eq!(history[1].state, fields(json!({"title": "Reading circle"})));
        assert_eq!(history[1].metadata.context.get("reason"), Some(&json!("feed import")));
        Ok(())
    }
}
