use std::{path::PathBuf, process};

use clap::Parser;
use gedcom::{Config, Individual, Relative, Xref};
use serde_json::json;
use tracing::instrument;

use super::{OutputFormat, or_na, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display an individual and their relatives")]
pub struct Show {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The identifier of the individual, with or without `@` delimiters
    #[clap(value_parser = super::parse_xref)]
    xref: Xref,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Show {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let document = super::open(&self.file, config)?;

        let Some(individual) = document.individual(&self.xref) else {
            eprintln!("{}", format!("Individual {} not found", self.xref).error());
            process::exit(1);
        };

        match self.output {
            OutputFormat::Table => Self::output_pretty(&individual),
            OutputFormat::Json => Self::output_json(&individual)?,
        }

        Ok(())
    }

    fn output_pretty(individual: &Individual<'_>) {
        println!("# {individual}");

        println!("{}", "Facts".dim());
        println!("  Sex:    {}", individual.sex());
        println!("  Born:   {}", or_na(individual.birth_date()));
        println!("  Died:   {}", or_na(individual.death_date()));
        println!("  Age:    {}", or_na(individual.age()));

        print_people("Parents", &individual.parents());

        let spouses = individual.families_and_spouses();
        if !spouses.is_empty() {
            println!("\n{}", "Marriages".dim());
            for (family, spouse) in &spouses {
                let end = family.marriage_end();
                println!(
                    "  • {family}: {} (married {}, ended {} by {})",
                    or_na(spouse.as_ref()),
                    or_na(family.marriage_date()),
                    end.end,
                    end.reason
                );
            }
        }

        print_people("Children", &individual.children());
        print_people("Siblings", &individual.siblings());

        let aunts_and_uncles = individual.aunts_and_uncles();
        if !aunts_and_uncles.is_empty() {
            println!("\n{}", "Aunts and uncles".dim());
            for relative in &aunts_and_uncles {
                println!("  • {relative} ({})", relative.sex().aunt_or_uncle());
            }
        }

        print_people("Cousins", &individual.cousins());
        print_relatives("Ancestors", &individual.ancestors());
        print_relatives("Descendants", &individual.descendants());

        let overlapping = individual.overlapping_marriages();
        if !overlapping.is_empty() {
            println!("\n{}", "Overlapping marriages".warning());
            for (first, second) in &overlapping {
                println!("  • {first} and {second}");
            }
        }
    }

    fn output_json(individual: &Individual<'_>) -> anyhow::Result<()> {
        let ids = |people: &[Individual<'_>]| {
            people
                .iter()
                .filter_map(Individual::xref)
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        };
        let relatives = |relatives: &[Relative<'_>]| {
            relatives
                .iter()
                .map(|r| {
                    json!({
                        "id": r.individual.xref(),
                        "generation": r.generation,
                        "relation": r.label,
                    })
                })
                .collect::<Vec<_>>()
        };

        let output = json!({
            "id": individual.xref(),
            "name": individual.name().map(|n| n.full()),
            "sex": individual.sex(),
            "birth": individual.birth_date().map(|d| d.value()),
            "death": individual.death_date().map(|d| d.value()),
            "age": individual.age(),
            "parents": ids(&individual.parents()),
            "spouses": ids(&individual.spouses()),
            "children": ids(&individual.children()),
            "siblings": ids(&individual.siblings()),
            "aunts_and_uncles": ids(&individual.aunts_and_uncles()),
            "cousins": ids(&individual.cousins()),
            "ancestors": relatives(&individual.ancestors()),
            "descendants": relatives(&individual.descendants()),
            "overlapping_marriages": individual
                .overlapping_marriages()
                .iter()
                .map(|(a, b)| [or_na(a.xref()), or_na(b.xref())])
                .collect::<Vec<_>>(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn print_people(heading: &str, people: &[Individual<'_>]) {
    if people.is_empty() {
        return;
    }
    println!("\n{}", heading.dim());
    for person in people {
        println!("  • {person}");
    }
}

fn print_relatives(heading: &str, relatives: &[Relative<'_>]) {
    if relatives.is_empty() {
        return;
    }
    println!("\n{}", heading.dim());
    for relative in relatives {
        println!("  • {} ({})", relative.individual, relative.label);
    }
}
