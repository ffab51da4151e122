use std::path::{Path, PathBuf};

mod show;
mod summary;
mod terminal;
mod validate;

use anyhow::Context;
use clap::ArgAction;
use gedcom::{Config, Document, Individual, Xref};
use show::Show;
use summary::Summary;
use terminal::Colorize;
use validate::Validate;

/// Parse a cross-reference from a string, adding the `@` delimiters if they
/// were left off.
///
/// This is a CLI boundary function so that `I1` and `@I1@` both work.
fn parse_xref(s: &str) -> Result<Xref, String> {
    let s = s.trim();
    let delimited = if s.starts_with('@') {
        s.to_string()
    } else {
        format!("@{s}@")
    };
    delimited.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path).map_err(anyhow::Error::msg)?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List every individual and family in a file
    Summary(Summary),

    /// Show one individual and their relatives
    Show(Show),

    /// Check a file for inconsistencies
    ///
    /// Exits with status 2 if any error-level finding is reported.
    Validate(Validate),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Summary(command) => command.run(config)?,
            Self::Show(command) => command.run(config)?,
            Self::Validate(command) => command.run(config)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Loads a document, reporting any skipped lines on stderr.
fn open(path: &Path, config: &Config) -> anyhow::Result<Document> {
    let (document, skipped) = Document::open(path, config)
        .with_context(|| format!("failed to load {}", path.display()))?;

    for error in &skipped {
        eprintln!("{}", format!("skipped {error}").warning());
    }

    Ok(document)
}

/// A short label for an optional value.
fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| v.to_string())
}

/// The identifiers of some people, comma separated.
fn xrefs(people: &[Individual<'_>]) -> String {
    if people.is_empty() {
        return "NA".to_string();
    }
    people
        .iter()
        .map(|p| or_na(p.xref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xref_delimiters_are_optional() {
        assert_eq!(parse_xref("I1").unwrap().as_str(), "@I1@");
        assert_eq!(parse_xref("@F2@").unwrap().as_str(), "@F2@");
        assert!(parse_xref("I 1").is_err());
    }

    #[test]
    fn empty_people_list() {
        assert_eq!(xrefs(&[]), "NA");
    }
}
