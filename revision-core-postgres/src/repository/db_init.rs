//! Schema setup and teardown for the record store
//!
//! Executes the SQL files shipped in `migrations/` (ascending) and `cleanup/`
//! (descending) for hosts that do not run `sqlx migrate`.

use sqlx::PgPool;
use std::fs;
use std::path::Path;

/// Create the `record_document` schema
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use revision_core_postgres::repository::db_init::init_database;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_database(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    run_sql_dir(pool, &migrations_dir, true).await
}

/// Drop the `record_document` schema
pub async fn cleanup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let cleanup_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cleanup");
    run_sql_dir(pool, &cleanup_dir, false).await
}

async fn run_sql_dir(pool: &PgPool, dir: &Path, ascending: bool) -> Result<(), sqlx::Error> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .map_err(sqlx::Error::Io)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();

    files.sort();
    if !ascending {
        files.reverse();
    }

    for path in files {
        let sql = fs::read_to_string(&path).map_err(sqlx::Error::Io)?;
        sqlx::raw_sql(&sql).execute(pool).await?;
    }

    Ok(())
}
