//! `ged`: inspect and validate GEDCOM family-tree files.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
