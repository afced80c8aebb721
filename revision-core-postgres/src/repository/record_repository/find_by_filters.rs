use async_trait::async_trait;
use revision_core_db::models::filter::RecordFilter;
use revision_core_db::models::record::RecordModel;
use revision_core_db::repository::find_by_filters::FindByFilters;
use std::error::Error;

use super::filter_sql::fetch_matching;
use super::repo_impl::RecordRepositoryImpl;

#[async_trait]
impl FindByFilters for RecordRepositoryImpl {
    async fn find_by_filters(
        &self,
        filters: &[RecordFilter],
    ) -> Result<Vec<RecordModel>, Box<dyn Error + Send + Sync>> {
        if filters.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        fetch_matching(&mut **transaction, &self.collection, filters).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use revision_core_db::models::filter::RecordFilter;
    use revision_core_db::models::record::RecordModel;
    use revision_core_db::repository::find_by_filters::FindByFilters;
    use revision_core_db::repository::persist::Persist;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn record(value: Value) -> RecordModel {
        RecordModel::new(Uuid::new_v4(), value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_find_by_filters_union() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(ctx) = setup_test_context().await? else {
            return Ok(());
        };
        let repo = ctx.record_repository();

        let online = record(json!({"status": "ONLINE", "address": {"city": "Paris"}}));
        let pending = record(json!({"status": "PENDING"}));
        let other = record(json!({"status": "DELETED"}));
        for r in [&online, &pending, &other] {
            repo.persist(r).await?;
        }

        let found = repo
            .find_by_filters(&[
                RecordFilter::new().eq("address", json!({"city": "Paris"})),
                RecordFilter::by_id(pending.id),
            ])
            .await?;

        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|r| r.id == online.id));
        assert!(found.iter().any(|r| r.id == pending.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_field_matches_null() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(ctx) = setup_test_context().await? else {
            return Ok(());
        };
        let repo = ctx.record_repository();

        let draft = record(json!({"title": "draft"}));
        repo.persist(&draft).await?;

        let found = repo
            .find_by_filters(&[RecordFilter::new().eq("deletedAt", Value::Null)])
            .await?;
        assert_eq!(found, vec![draft]);
        Ok(())
    }
}
