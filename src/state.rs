use diesel::{Connection, SqliteConnection};
use diesel_migrations::MigrationHarness;

use crate::MIGRATIONS;

/// Errors produced by the store. A missing row is not one of these; lookups
/// report that as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not open database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("could not run migrations: {0}")]
    Migration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Opens the single connection used for the whole run.
///
/// `:memory:` gives a private in-memory database, which is what the tests
/// use.
pub fn open(db_url: &str) -> Result<SqliteConnection, StoreError> {
    tracing::debug!("opening database at {db_url}");
    Ok(SqliteConnection::establish(db_url)?)
}

/// Creates the `team` table if it does not exist yet.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(StoreError::Migration)?;

    for version in &applied {
        tracing::info!("applied migration {version}");
    }

    Ok(())
}
