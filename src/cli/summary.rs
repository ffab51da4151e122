use std::path::PathBuf;

use clap::Parser;
use gedcom::{Config, Document, Family, Individual, domain::xref::natural_cmp};
use serde_json::json;
use tracing::instrument;

use super::{OutputFormat, or_na, terminal::print_table, xrefs};

#[derive(Debug, Parser)]
#[command(about = "List every individual and family in a GEDCOM file")]
pub struct Summary {
    /// The GEDCOM file to read
    file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Summary {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let document = super::open(&self.file, config)?;

        let mut individuals = document.individuals();
        individuals.sort_by(|a, b| natural_cmp(&or_na(a.xref()), &or_na(b.xref())));

        let mut families = document.families();
        families.sort_by(|a, b| natural_cmp(&or_na(a.xref()), &or_na(b.xref())));

        match self.output {
            OutputFormat::Table => Self::output_table(&individuals, &families),
            OutputFormat::Json => Self::output_json(&document, &individuals, &families)?,
        }

        Ok(())
    }

    fn output_table(individuals: &[Individual<'_>], families: &[Family<'_>]) {
        println!("Individuals");
        let rows = individuals
            .iter()
            .map(|individual| {
                vec![
                    or_na(individual.xref()),
                    or_na(individual.name()),
                    individual.sex().to_string(),
                    or_na(individual.birth_date().map(raw_date)),
                    or_na(individual.age()),
                    individual.is_alive().to_string(),
                    or_na(individual.death_date().map(raw_date)),
                    family_xrefs(individual.families_as_child()),
                    family_xrefs(individual.families_as_spouse()),
                ]
            })
            .collect::<Vec<_>>();
        print_table(
            &["ID", "Name", "Sex", "Birthday", "Age", "Alive", "Death", "Child", "Spouse"],
            &rows,
        );

        println!("\nFamilies");
        let rows = families
            .iter()
            .map(|family| {
                let husband = family.husband();
                let wife = family.wife();
                vec![
                    or_na(family.xref()),
                    or_na(family.marriage_date().map(raw_date)),
                    or_na(family.divorce_date().map(raw_date)),
                    or_na(husband.as_ref().and_then(Individual::xref)),
                    or_na(husband.as_ref().and_then(Individual::name)),
                    or_na(wife.as_ref().and_then(Individual::xref)),
                    or_na(wife.as_ref().and_then(Individual::name)),
                    xrefs(&family.children()),
                ]
            })
            .collect::<Vec<_>>();
        print_table(
            &[
                "ID",
                "Married",
                "Divorced",
                "Husband ID",
                "Husband Name",
                "Wife ID",
                "Wife Name",
                "Children",
            ],
            &rows,
        );
    }

    fn output_json(
        document: &Document,
        individuals: &[Individual<'_>],
        families: &[Family<'_>],
    ) -> anyhow::Result<()> {
        let individuals = individuals
            .iter()
            .map(|individual| {
                json!({
                    "id": individual.xref(),
                    "name": individual.name().map(|n| n.full()),
                    "surname": individual.name().and_then(|n| n.surname()),
                    "sex": individual.sex(),
                    "birth": individual.birth_date().map(|d| d.value()),
                    "death": individual.death_date().map(|d| d.value()),
                    "age": individual.age(),
                    "families_as_child": individual.families_as_child().iter().map(Family::xref).collect::<Vec<_>>(),
                    "families_as_spouse": individual.families_as_spouse().iter().map(Family::xref).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();

        let families = families
            .iter()
            .map(|family| {
                json!({
                    "id": family.xref(),
                    "married": family.marriage_date().map(|d| d.value()),
                    "divorced": family.divorce_date().map(|d| d.value()),
                    "marriage_end": family.marriage_end().end.to_string(),
                    "marriage_end_reason": family.marriage_end().reason.to_string(),
                    "husband": family.husband().as_ref().and_then(Individual::xref),
                    "wife": family.wife().as_ref().and_then(Individual::xref),
                    "children": family.children().iter().map(Individual::xref).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();

        let output = json!({
            "reference_date": document.reference_date(),
            "individuals": individuals,
            "families": families,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn raw_date(date: gedcom::Date<'_>) -> String {
    date.line().value().unwrap_or_default().to_string()
}

fn family_xrefs(families: &[Family<'_>]) -> String {
    if families.is_empty() {
        return "NA".to_string();
    }
    families
        .iter()
        .map(|family| or_na(family.xref()))
        .collect::<Vec<_>>()
        .join(", ")
}
