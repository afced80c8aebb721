use chrono::{DateTime, Utc};
use postgres_unit_of_work::Executor;
use revision_core_db::repository::clock::Clock;

/// Record store backed by the `record_document` table.
///
/// Every call runs inside the unit-of-work transaction held by `executor`; the
/// owner of the session decides when it commits. Records of different types share
/// the table and are separated by `collection`.
pub struct RecordRepositoryImpl {
    pub executor: Executor,
    pub collection: String,
}

impl RecordRepositoryImpl {
    pub fn new(executor: Executor, collection: impl Into<String>) -> Self {
        Self {
            executor,
            collection: collection.into(),
        }
    }
}

impl Clock for RecordRepositoryImpl {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
