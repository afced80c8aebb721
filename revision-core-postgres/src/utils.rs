use revision_core_api::FieldMap;
use revision_core_db::models::record::RecordModel;
use sqlx::{postgres::PgRow, types::Json, Row};
use std::error::Error;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

impl TryFromRow<PgRow> for RecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let fields: Json<FieldMap> = row.try_get("fields")?;
        Ok(RecordModel {
            id: row.try_get("id")?,
            fields: fields.0,
        })
    }
}
