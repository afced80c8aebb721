use async_trait::async_trait;

use crate::models::batch_operation::{BatchOperation, BatchResult};

/// Repository trait for the store's native batch mutation
///
/// The batch is all-or-nothing: either every operation is applied or none is.
/// Implementations offer no per-item hook; history for batches is reconstructed
/// around this call by the reconciler.
#[async_trait]
pub trait BatchMutate: Send + Sync {
    /// Apply the operations in order
    ///
    /// # Arguments
    /// * `operations` - Insert and update operations, applied in the given order
    ///
    /// # Returns
    /// * `Ok(BatchResult)` - Counts of inserted, matched and modified records
    /// * `Err` - An error if the batch was rejected; nothing was applied
    async fn batch_mutate(
        &self,
        operations: Vec<BatchOperation>,
    ) -> Result<BatchResult, Box<dyn std::error::Error + Send + Sync>>;
}
