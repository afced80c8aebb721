use async_trait::async_trait;
use uuid::Uuid;

use crate::models::record::RecordModel;

/// Repository trait for point lookups by identifier
///
/// # Example
/// ```ignore
/// impl Load for ListingStore {
///     async fn load(&self, id: Uuid) -> Result<Option<RecordModel>, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait Load: Send + Sync {
    /// Load a record by its unique identifier
    ///
    /// # Arguments
    /// * `id` - The UUID of the record to load
    ///
    /// # Returns
    /// * `Ok(Some(RecordModel))` - The record if it exists
    /// * `Ok(None)` - If no record has this identifier
    /// * `Err` - An error if the lookup could not be executed
    async fn load(
        &self,
        id: Uuid,
    ) -> Result<Option<RecordModel>, Box<dyn std::error::Error + Send + Sync>>;
}
