use async_trait::async_trait;
use revision_core_db::models::record::RecordModel;
use revision_core_db::repository::persist::Persist;
use revision_core_db::utils::hash_as_i64;
use sqlx::types::Json;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn persist_impl(
        repo: &RecordRepositoryImpl,
        record: &RecordModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let hash = hash_as_i64(&record.fields)?;

        // Unchanged content leaves the row untouched.
        let query = sqlx::query(
            r#"
            INSERT INTO record_document (collection, id, fields, hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection, id) DO UPDATE
            SET fields = EXCLUDED.fields, hash = EXCLUDED.hash
            WHERE record_document.hash <> EXCLUDED.hash
            "#,
        )
        .bind(repo.collection.as_str())
        .bind(record.id)
        .bind(Json(&record.fields))
        .bind(hash);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        query.execute(&mut **transaction).await?;
        Ok(())
    }
}

#[async_trait]
impl Persist for RecordRepositoryImpl {
    async fn persist(&self, record: &RecordModel) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::persist_impl(self, record).await
    }
}
