//! `shotlist` command-line tool.

mod cli;
mod commands;
mod context;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use shotlist_core::core::settings::default_data_dir;
use tracing::debug;

use crate::cli::Cli;
use crate::context::AppContext;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    logging::init_logging(&data_dir, cli.verbose);

    let mut ctx = AppContext::new(data_dir);
    debug!("Using data directory {}", ctx.data_dir().display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match commands::run(cli.command, &mut ctx, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
