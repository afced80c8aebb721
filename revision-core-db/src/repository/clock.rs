use chrono::{DateTime, Utc};

/// Source of entry timestamps.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}
