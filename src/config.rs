use std::path::PathBuf;

use clap::Parser;

use crate::{
    bench::{BenchConfig, DEFAULT_RECORDS},
    profile::ProfileMode,
};

pub const DEFAULT_DATABASE: &str = "grafana.db";

/// Times create/read/update/delete cycles of teams against a SQLite
/// database.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Database to run against. Falls back to `DATABASE_URL`, then to
    /// `grafana.db` in the working directory.
    pub database_url: Option<String>,
    /// Number of create/read/update/delete cycles.
    #[clap(long, short = 'n', default_value_t = DEFAULT_RECORDS)]
    pub records: usize,
    #[clap(long, value_enum, default_value_t = ProfileMode::Mem)]
    pub profile: ProfileMode,
    /// Directory the profile is written to.
    #[clap(long, default_value = ".")]
    pub profile_dir: PathBuf,
    /// Create the `team` table if it is missing.
    #[clap(long, action)]
    pub migrate: bool,
    /// Print the whole report as JSON instead of the elapsed time.
    #[clap(long, action)]
    pub json: bool,
    #[clap(long, default_value = "info")]
    pub log_level: tracing::Level,
}

impl Args {
    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
    }

    pub fn bench_config(&self) -> BenchConfig {
        BenchConfig {
            records: self.records,
        }
    }
}
