use std::process::ExitCode;

use aip_batch::{run, Cli};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(summary) if summary.failed > 0 => {
            println!(
                "{} of {} application(s) failed; see the results files for details.",
                summary.failed, summary.total
            );
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
