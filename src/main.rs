//! # Baseline Builder CLI
//!
//! This is the binary entry point for the `baseline-builder` command-line
//! tool. It parses the arguments with `clap` and hands over to [`cli::Cli`];
//! the stages themselves live in the library crate.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
