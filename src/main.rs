//! # csvscrub entry point
//!
//! Parses the command line, sets up the directory layout and logging, and
//! dispatches to the selected subcommand:
//!
//! ```bash
//! csvscrub process --input data/customers.csv
//! csvscrub preview --input data/customers.csv --rows 10
//! ```
//!
//! Run without an `--input` argument, both subcommands pick up the first
//! file in the data directory, which is how the unattended batch
//! deployment drives it.

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;
use csvscrub::{config, logging};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let paths = config::Paths::from_env();
    paths.ensure_dirs()?;
    logging::init(&paths.logs_dir)?;

    cli::run_command(cli.command)
}
