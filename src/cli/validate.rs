use std::path::PathBuf;

use clap::Parser;
use gedcom::{
    Config,
    checks::{self, Check, Finding, Severity},
};
use serde_json::json;
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

/// Parse a check identifier for `--check`.
fn parse_check(s: &str) -> Result<Check, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, Parser)]
#[command(about = "Check a GEDCOM file for inconsistencies")]
pub struct Validate {
    /// The GEDCOM file to read
    file: PathBuf,

    /// Checks to run, by identifier (can be specified multiple times).
    /// Defaults to every check.
    #[arg(long, value_name = "CHECK", value_parser = parse_check)]
    check: Vec<Check>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

impl Validate {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let document = super::open(&self.file, config)?;

        let selected = if self.check.is_empty() {
            Check::ALL.to_vec()
        } else {
            self.check.clone()
        };

        let findings = checks::run(&document, config, &selected);

        match self.output {
            OutputFormat::Table => self.output_table(&findings, &selected),
            OutputFormat::Json => Self::output_json(&findings)?,
        }

        if findings.iter().any(|f| f.severity == Severity::Error) {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, findings: &[Finding], selected: &[Check]) {
        for finding in findings {
            let line = finding.to_string();
            match finding.severity {
                Severity::Error => println!("{}", line.error()),
                Severity::Anomaly if !self.quiet => println!("{}", line.warning()),
                Severity::Anomaly => {}
            }
        }

        if self.quiet {
            return;
        }

        let errors = count(findings, Severity::Error);
        let anomalies = count(findings, Severity::Anomaly);

        if findings.is_empty() {
            println!(
                "{}",
                format!("✓ {} checks passed, no findings", selected.len()).success()
            );
        } else {
            println!(
                "\n{}",
                format!("Summary: {errors} errors, {anomalies} anomalies").warning()
            );
        }
    }

    fn output_json(findings: &[Finding]) -> anyhow::Result<()> {
        let errors = count(findings, Severity::Error);

        let output = json!({
            "status": if errors == 0 { "valid" } else { "errors_found" },
            "findings": findings,
            "summary": {
                "errors": errors,
                "anomalies": count(findings, Severity::Anomaly),
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}
