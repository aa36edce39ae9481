use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, Dispatch};

pub mod applications;
pub mod batch;
pub mod command;
pub mod config;
pub mod error;
pub mod processor;
pub mod report;
pub mod return_codes;
pub mod sanitize;
pub mod telemetry;

use applications::{read_applications, Application};
use batch::{active_batches, run_batches, split_evenly};
use command::{CommandRunner, Invocation, ProcessRunner};
use config::Settings;
use processor::Processor;
use report::{ReportPaths, ResultWriter, Status};
use return_codes::ReturnCodeTable;
use sanitize::sanitize;

pub use error::{Error, Result};

/// Run timestamp embedded in every output file name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit applications to AIP Console in parallel batches")]
pub struct Cli {
    /// Path to the key=value configuration file.
    #[arg(long, default_value = "config.properties")]
    pub config: PathBuf,

    /// Log level or filter directive; RUST_LOG takes precedence when set.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the commands each batch would run without running them or writing outputs.
    #[arg(long)]
    pub dry_run: bool,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

pub fn run(cli: Cli) -> Result<RunSummary> {
    let console = telemetry::dispatch(&cli.log_level, None)?;
    let (settings, applications) =
        tracing::dispatcher::with_default(&console, || load_inputs(&cli))?;

    if cli.dry_run {
        print_plan(&settings, &applications);
        return Ok(RunSummary::default());
    }

    let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let paths = ReportPaths::new(&settings, &stamp);
    let mut writer = ResultWriter::create(&paths.csv, &paths.txt)?;
    let log = telemetry::dispatch(&cli.log_level, Some(&paths.log))?;

    tracing::dispatcher::with_default(&log, || {
        info!(
            csv = %paths.csv.display(),
            txt = %paths.txt.display(),
            log = %paths.log.display(),
            "Writing results"
        );
        log_failure(execute(&settings, &applications, &ProcessRunner, &mut writer, &log))
    })
}

/// Records a run-level error in the current dispatcher before it is returned.
fn log_failure<T>(result: Result<T>) -> Result<T> {
    result.map_err(|err| {
        error!("Error: {err}");
        err
    })
}

fn load_inputs(cli: &Cli) -> Result<(Settings, Vec<Application>)> {
    info!("Reading properties from file: {}", cli.config.display());
    let settings = Settings::load(&cli.config)?;
    let applications = read_applications(&settings.applications_file)?;
    info!(
        applications = applications.len(),
        max_batches = settings.max_batches,
        "Loaded application list from {}",
        settings.applications_file.display()
    );
    Ok((settings, applications))
}

/// Partitions `applications`, processes every batch concurrently through
/// `runner`, and writes each record through `writer`.
pub fn execute<R: CommandRunner>(
    settings: &Settings,
    applications: &[Application],
    runner: &R,
    writer: &mut ResultWriter,
    log: &Dispatch,
) -> Result<RunSummary> {
    let codes = ReturnCodeTable::with_overrides(&settings.return_code_overrides);
    let processor = Processor::new(settings, runner, &codes);
    let batches = split_evenly(applications, settings.max_batches);
    info!(
        "Found {} application(s). Running {} batch(es).",
        applications.len(),
        active_batches(&batches)
    );

    let mut summary = RunSummary::default();
    run_batches(&batches, &processor, log, |record| {
        writer.write(&record)?;
        summary.total += 1;
        match record.status {
            Status::Passed => summary.passed += 1,
            Status::Failed => summary.failed += 1,
        }
        Ok(())
    })?;

    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        "Run complete"
    );
    Ok(summary)
}

fn print_plan(settings: &Settings, applications: &[Application]) {
    let batches = split_evenly(applications, settings.max_batches);
    println!(
        "Found {} application(s). Running {} batch(es).",
        applications.len(),
        active_batches(&batches)
    );
    for (idx, batch) in batches.iter().enumerate() {
        if batch.is_empty() {
            continue;
        }
        println!("[dry-run] batch-{:04} ({} application(s))", idx + 1, batch.len());
        for app in batch.iter() {
            let invocation = Invocation::add(settings, app, &sanitize(&app.name));
            println!("[dry-run]   {}", invocation.display());
        }
    }
}
