//! The create/read/update/delete loop.
//!
//! Each iteration inserts a team, reads it back, renames it with a partial
//! update, reads it again, deletes it and checks that it is gone. Any store
//! error stops the run at once; a missing row is only ever a warning.

use std::{
    fmt,
    time::{Duration, Instant},
};

use chrono::Utc;
use diesel::{connection::LoadConnection, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    state::StoreError,
    team::{
        NewTeam, TeamChanges, delete_team, get_team, insert_team, update_team,
    },
};

pub const DEFAULT_RECORDS: usize = 2000;

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub records: usize,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Create,
    ReadAfterCreate,
    Update,
    ReadAfterUpdate,
    Delete,
    ReadAfterDelete,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Create,
        Step::ReadAfterCreate,
        Step::Update,
        Step::ReadAfterUpdate,
        Step::Delete,
        Step::ReadAfterDelete,
    ];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Create => "create",
            Step::ReadAfterCreate => "read after create",
            Step::Update => "update",
            Step::ReadAfterUpdate => "read after update",
            Step::Delete => "delete",
            Step::ReadAfterDelete => "read after delete",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("iteration {iteration}: {step} failed: {source}")]
    Step {
        iteration: usize,
        step: Step,
        source: StoreError,
    },
}

#[derive(Serialize, Debug, Clone)]
pub struct BenchReport {
    pub iterations: usize,
    pub elapsed: Duration,
    /// Time spent in each step, summed over all iterations.
    pub steps: Vec<(Step, Duration)>,
    /// Reads which did not see what the previous write should have left.
    pub anomalies: usize,
}

#[derive(Default)]
struct StepTimings {
    totals: [Duration; 6],
}

impl StepTimings {
    fn timed<T>(
        &mut self,
        iteration: usize,
        step: Step,
        op: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<T, BenchError> {
        let start = Instant::now();
        let ret = op();
        self.totals[step as usize] += start.elapsed();

        ret.map_err(|source| BenchError::Step {
            iteration,
            step,
            source,
        })
    }

    fn into_vec(self) -> Vec<(Step, Duration)> {
        Step::ALL.into_iter().zip(self.totals).collect()
    }
}

/// Runs `config.records` iterations in order against `conn`.
pub fn run(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    config: &BenchConfig,
) -> Result<BenchReport, BenchError> {
    let mut timings = StepTimings::default();
    let mut anomalies = 0;

    let start = Instant::now();
    for i in 0..config.records {
        anomalies += run_iteration(conn, i, &mut timings)?;
    }
    let elapsed = start.elapsed();

    tracing::info!(
        iterations = config.records,
        anomalies,
        "finished in {elapsed:?}"
    );

    Ok(BenchReport {
        iterations: config.records,
        elapsed,
        steps: timings.into_vec(),
        anomalies,
    })
}

/// Returns the number of anomalies seen in this iteration.
fn run_iteration(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    i: usize,
    timings: &mut StepTimings,
) -> Result<usize, BenchError> {
    let name = format!("mynamee{i}");
    let new_name = format!("princess{i}");
    let now = Utc::now().naive_utc();
    let mut anomalies = 0;

    let team = NewTeam::new(&name, now).org_id(1);
    timings.timed(i, Step::Create, || insert_team(&mut *conn, &team))?;

    let Some(created) = timings
        .timed(i, Step::ReadAfterCreate, || get_team(&mut *conn, &name))?
    else {
        tracing::warn!(iteration = i, "{name} not found after insert");
        return Ok(1);
    };

    // org_id is written as an explicit zero; everything else is left alone
    let changes = TeamChanges::default().name(&new_name).org_id(0);
    timings.timed(i, Step::Update, || {
        update_team(&mut *conn, created.id, &changes)
    })?;

    let updated = timings
        .timed(i, Step::ReadAfterUpdate, || get_team(&mut *conn, &new_name))?;
    if updated.map(|t| t.id) != Some(created.id) {
        tracing::warn!(iteration = i, "{new_name} not found after update");
        anomalies += 1;
    }

    timings.timed(i, Step::Delete, || delete_team(&mut *conn, &new_name))?;

    let deleted = timings
        .timed(i, Step::ReadAfterDelete, || get_team(&mut *conn, &new_name))?;
    if deleted.is_some() {
        tracing::warn!(iteration = i, "{new_name} still present after delete");
        anomalies += 1;
    }

    Ok(anomalies)
}
