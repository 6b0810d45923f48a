use std::process::ExitCode;

use clap::Parser;
use teambench::{
    Error,
    bench::{self, BenchReport},
    config::Args,
    profile::ProfileSession,
    state,
};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let db_url = args.database_url();
    tracing::info!("location = {db_url}");

    let mut conn = state::open(&db_url)?;
    if args.migrate {
        state::run_migrations(&mut conn)?;
    }

    // an early return drops the session, which still flushes the profile
    let session = ProfileSession::start(args.profile, &args.profile_dir)?;
    let report = bench::run(&mut conn, &args.bench_config())?;
    if let Some(path) = session.finish()? {
        tracing::info!("profile written to {}", path.display());
    }

    print_report(&report, args.json)
}

fn print_report(report: &BenchReport, json: bool) -> Result<(), Error> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("the result is: {:?}", report.elapsed);
    }
    Ok(())
}
