use async_trait::async_trait;

use crate::models::record::RecordModel;

/// Repository trait committing a single record's full field state
///
/// Inserts the record when it does not exist yet, replaces its fields otherwise.
#[async_trait]
pub trait Persist: Send + Sync {
    /// Persist the record
    ///
    /// # Arguments
    /// * `record` - The record whose fields, history field included, are written
    ///
    /// # Returns
    /// * `Ok(())` - The write was committed
    /// * `Err` - An error if the write was rejected
    async fn persist(
        &self,
        record: &RecordModel,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
