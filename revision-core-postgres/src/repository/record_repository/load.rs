use async_trait::async_trait;
use revision_core_db::models::record::RecordModel;
use revision_core_db::repository::load::Load;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::RecordRepositoryImpl;
use crate::utils::TryFromRow;

impl RecordRepositoryImpl {
    pub(super) async fn load_impl(
        repo: &RecordRepositoryImpl,
        id: Uuid,
    ) -> Result<Option<RecordModel>, Box<dyn Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            SELECT id, fields FROM record_document
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(repo.collection.as_str())
        .bind(id);

        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_optional(&mut **transaction).await?
        };

        row.map(|row| RecordModel::try_from_row(&row)).transpose()
    }
}

#[async_trait]
impl Load for RecordRepositoryImpl {
    async fn load(&self, id: Uuid) -> Result<Option<RecordModel>, Box<dyn Error + Send + Sync>> {
        Self::load_impl(self, id).await
    }
}
