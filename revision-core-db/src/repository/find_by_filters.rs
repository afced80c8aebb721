use async_trait::async_trait;

use crate::models::filter::RecordFilter;
use crate::models::record::RecordModel;

/// Repository trait for multi-filter lookups
///
/// The filters are combined with a logical OR and resolved in a single round trip.
/// Each record is returned at most once, whatever the number of filters it matches.
#[async_trait]
pub trait FindByFilters: Send + Sync {
    /// Find every record matching at least one of the filters
    ///
    /// # Arguments
    /// * `filters` - The filters to combine; an empty slice matches nothing
    ///
    /// # Returns
    /// * `Ok(Vec<RecordModel>)` - The matching records
    /// * `Err` - An error if the query could not be executed
    async fn find_by_filters(
        &self,
        filters: &[RecordFilter],
    ) -> Result<Vec<RecordModel>, Box<dyn std::error::Error + Send + Sync>>;
}
