//! curriculum CLI: validate and assemble course content libraries.
//!
//! Walks a `course/module/lesson` directory tree, checks every lesson
//! against the content model, and writes a navigable course tree as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
