use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod bench;
pub mod config;
pub mod profile;
pub mod schema;
pub mod state;
pub mod team;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Anything which can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] state::StoreError),
    #[error(transparent)]
    Bench(#[from] bench::BenchError),
    #[error(transparent)]
    Profile(#[from] profile::ProfileError),
    #[error("could not serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) fn test_conn() -> diesel::SqliteConnection {
    let mut conn = state::open(":memory:").unwrap();
    state::run_migrations(&mut conn).unwrap();
    conn
}
