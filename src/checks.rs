//! Consistency checks.
//!
//! Each [`Check`] inspects a loaded [`Document`] through its individuals,
//! families and relationship traversal, and reports problems as
//! [`Finding`]s. Checks never modify the document.

use std::{fmt, str::FromStr};

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    domain::{Config, Date, Individual, Line, Sex, Tag},
    storage::{Document, Query},
};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but possible data.
    Anomaly,
    /// Data that cannot be right.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Anomaly => "ANOMALY",
            Self::Error => "ERROR",
        })
    }
}

/// A single consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Check {
    /// A tag outside the recognised vocabulary.
    UnsupportedTag,
    /// An identifier defined by more than one record.
    DuplicateXref,
    /// A pointer that names no record, or a record of the wrong kind.
    DanglingPointer,
    /// A date in none of the supported formats.
    UnparseableDate,
    /// A date after the reference date.
    DateInFuture,
    /// A birth after the person's death.
    BirthAfterDeath,
    /// A marriage after the couple's divorce.
    MarriageAfterDivorce,
    /// An age at or above the configured maximum.
    ExcessiveAge,
    /// A spouse younger than the configured minimum at marriage.
    UnderageMarriage,
    /// Marriages of one person whose date ranges overlap.
    Bigamy,
    /// A person married to one of their descendants.
    MarriedToDescendant,
    /// Siblings married to each other.
    SiblingsMarried,
    /// First cousins married to each other.
    CousinsMarried,
    /// An aunt or uncle married to a niece or nephew.
    AuntOrUncleMarried,
    /// A husband recorded as female or a wife recorded as male.
    WrongSpouseSex,
    /// A person who is their own ancestor.
    CyclicLineage,
}

impl Check {
    /// Every check, in reporting order.
    pub const ALL: [Self; 16] = [
        Self::UnsupportedTag,
        Self::DuplicateXref,
        Self::DanglingPointer,
        Self::UnparseableDate,
        Self::DateInFuture,
        Self::BirthAfterDeath,
        Self::MarriageAfterDivorce,
        Self::ExcessiveAge,
        Self::UnderageMarriage,
        Self::Bigamy,
        Self::MarriedToDescendant,
        Self::SiblingsMarried,
        Self::CousinsMarried,
        Self::AuntOrUncleMarried,
        Self::WrongSpouseSex,
        Self::CyclicLineage,
    ];

    /// The short identifier used on the command line and in reports.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::UnsupportedTag => "unsupported-tag",
            Self::DuplicateXref => "duplicate-xref",
            Self::DanglingPointer => "dangling-pointer",
            Self::UnparseableDate => "unparseable-date",
            Self::DateInFuture => "US01",
            Self::BirthAfterDeath => "US03",
            Self::MarriageAfterDivorce => "US04",
            Self::ExcessiveAge => "US07",
            Self::UnderageMarriage => "US10",
            Self::Bigamy => "US11",
            Self::MarriedToDescendant => "US17",
            Self::SiblingsMarried => "US18",
            Self::CousinsMarried => "US19",
            Self::AuntOrUncleMarried => "US20",
            Self::WrongSpouseSex => "US21",
            Self::CyclicLineage => "cyclic-lineage",
        }
    }

    /// How serious findings of this check are.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnsupportedTag
            | Self::UnderageMarriage
            | Self::Bigamy
            | Self::MarriedToDescendant
            | Self::SiblingsMarried
            | Self::CousinsMarried
            | Self::AuntOrUncleMarried => Severity::Anomaly,
            Self::DuplicateXref
            | Self::DanglingPointer
            | Self::UnparseableDate
            | Self::DateInFuture
            | Self::BirthAfterDeath
            | Self::MarriageAfterDivorce
            | Self::ExcessiveAge
            | Self::WrongSpouseSex
            | Self::CyclicLineage => Severity::Error,
        }
    }

    /// Runs this check over a document.
    #[instrument(level = "debug", skip(document, config), fields(check = self.id()))]
    pub fn run(self, document: &Document, config: &Config) -> Vec<Finding> {
        let mut findings = Findings {
            check: self,
            found: Vec::new(),
        };

        match self {
            Self::UnsupportedTag => unsupported_tags(document, &mut findings),
            Self::DuplicateXref => duplicate_xrefs(document, &mut findings),
            Self::DanglingPointer => dangling_pointers(document, &mut findings),
            Self::UnparseableDate => unparseable_dates(document, &mut findings),
            Self::DateInFuture => dates_in_future(document, &mut findings),
            Self::BirthAfterDeath => births_after_deaths(document, &mut findings),
            Self::MarriageAfterDivorce => marriages_after_divorces(document, &mut findings),
            Self::ExcessiveAge => excessive_ages(document, config, &mut findings),
            Self::UnderageMarriage => underage_marriages(document, config, &mut findings),
            Self::Bigamy => bigamy(document, &mut findings),
            Self::MarriedToDescendant => married_to_descendants(document, &mut findings),
            Self::SiblingsMarried => siblings_married(document, &mut findings),
            Self::CousinsMarried => cousins_married(document, &mut findings),
            Self::AuntOrUncleMarried => aunts_or_uncles_married(document, &mut findings),
            Self::WrongSpouseSex => wrong_spouse_sex(document, &mut findings),
            Self::CyclicLineage => cyclic_lineage(document, &mut findings),
        }

        debug!(count = findings.found.len(), "check complete");
        findings.found
    }
}

impl From<Check> for &'static str {
    fn from(check: Check) -> Self {
        check.id()
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A check identifier that names no check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check '{0}'")]
pub struct UnknownCheckError(String);

impl FromStr for Check {
    type Err = UnknownCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|check| check.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCheckError(s.to_string()))
    }
}

/// A problem found by a [`Check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// The check that produced this finding.
    pub check: Check,
    /// How serious it is.
    pub severity: Severity,
    /// What is wrong, in plain words.
    pub message: String,
    /// Input line numbers the finding refers to.
    pub lines: Vec<usize>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.check, self.message)?;
        if !self.lines.is_empty() {
            let lines: Vec<_> = self.lines.iter().map(ToString::to_string).collect();
            write!(f, " (line {})", lines.join(", "))?;
        }
        Ok(())
    }
}

/// Runs `checks` over a document, in the order given.
#[instrument(level = "debug", skip_all)]
pub fn run(document: &Document, config: &Config, checks: &[Check]) -> Vec<Finding> {
    checks
        .iter()
        .flat_map(|check| check.run(document, config))
        .collect()
}

/// Runs every check over a document.
#[must_use]
pub fn run_all(document: &Document, config: &Config) -> Vec<Finding> {
    run(document, config, &Check::ALL)
}

struct Findings {
    check: Check,
    found: Vec<Finding>,
}

impl Findings {
    fn report(&mut self, message: String, lines: impl IntoIterator<Item = usize>) {
        self.found.push(Finding {
            check: self.check,
            severity: self.check.severity(),
            message,
            lines: lines.into_iter().collect(),
        });
    }
}

fn unsupported_tags(document: &Document, findings: &mut Findings) {
    for line in document.find(|line| !line.tag_supported()).lines() {
        findings.report(
            format!("unsupported tag '{}'", line.tag()),
            [line.line_number()],
        );
    }
}

fn duplicate_xrefs(document: &Document, findings: &mut Findings) {
    for (xref, positions) in document.duplicate_xrefs() {
        let lines: Vec<_> = positions
            .iter()
            .filter_map(|&p| document.get(p))
            .map(Line::line_number)
            .collect();
        findings.report(
            format!("{xref} is defined {} times", positions.len()),
            lines,
        );
    }
}

fn dangling_pointers(document: &Document, findings: &mut Findings) {
    for line in document.find(|line| line.tag().is_pointer()).lines() {
        let expected = match line.tag() {
            Tag::FamilyAsSpouse | Tag::FamilyAsChild => Tag::Family,
            _ => Tag::Individual,
        };
        let value = line.value().unwrap_or_default();

        match document.follow(line) {
            None => findings.report(
                format!("{} pointer '{value}' does not name a record", line.tag()),
                [line.line_number()],
            ),
            Some(target) if target.tag() != &expected => findings.report(
                format!(
                    "{} pointer '{value}' names a {} record, expected {expected}",
                    line.tag(),
                    target.tag()
                ),
                [line.line_number(), target.line_number()],
            ),
            Some(_) => {}
        }
    }
}

fn unparseable_dates(document: &Document, findings: &mut Findings) {
    for (line, result) in document.dates() {
        if let Err(error) = result {
            findings.report(error.to_string(), [line.line_number()]);
        }
    }
}

fn dates_in_future(document: &Document, findings: &mut Findings) {
    let today = document.reference_date();
    for date in document.dates().filter_map(|(_, result)| result.ok()) {
        if date.value() > today {
            findings.report(
                format!("{} date {} is after {today}", date.kind(), raw(date)),
                [date.line().line_number()],
            );
        }
    }
}

fn births_after_deaths(document: &Document, findings: &mut Findings) {
    for individual in document.individuals() {
        if let (Some(birth), Some(death)) = (individual.birth_date(), individual.death_date()) {
            if birth > death {
                findings.report(
                    format!(
                        "{individual} was born {} after dying {}",
                        raw(birth),
                        raw(death)
                    ),
                    lines_of([birth, death]),
                );
            }
        }
    }
}

fn marriages_after_divorces(document: &Document, findings: &mut Findings) {
    for family in document.families() {
        if let (Some(marriage), Some(divorce)) = (family.marriage_date(), family.divorce_date()) {
            if marriage > divorce {
                findings.report(
                    format!(
                        "family {family} married {} after divorcing {}",
                        raw(marriage),
                        raw(divorce)
                    ),
                    lines_of([marriage, divorce]),
                );
            }
        }
    }
}

fn excessive_ages(document: &Document, config: &Config, findings: &mut Findings) {
    for individual in document.individuals() {
        if let Some(age) = individual.age().filter(|&age| age >= config.max_age) {
            let verb = if individual.is_alive() { "is" } else { "was" };
            findings.report(
                format!("{individual} {verb} {age} years old"),
                [individual.line().line_number()],
            );
        }
    }
}

fn underage_marriages(document: &Document, config: &Config, findings: &mut Findings) {
    for family in document.families() {
        let spouses = [
            (family.husband(), family.husband_marriage_age()),
            (family.wife(), family.wife_marriage_age()),
        ];
        for (spouse, age) in spouses {
            if let (Some(spouse), Some(age)) = (spouse, age) {
                if age < config.min_marriage_age {
                    findings.report(
                        format!("{spouse} married at {age} in family {family}"),
                        [family.line().line_number()],
                    );
                }
            }
        }
    }
}

fn bigamy(document: &Document, findings: &mut Findings) {
    for individual in document.individuals() {
        for (first, second) in individual.overlapping_marriages() {
            let ended = first.marriage_end().date.map(|date| date.line().line_number());
            findings.report(
                format!("{individual} was married in {first} and {second} at the same time"),
                [first.line().line_number(), second.line().line_number()]
                    .into_iter()
                    .chain(ended),
            );
        }
    }
}

/// Reports every family whose spouses satisfy `related`.
fn related_spouses<'doc>(
    document: &'doc Document,
    findings: &mut Findings,
    related: impl Fn(&Individual<'doc>, &Individual<'doc>) -> Option<String>,
) {
    for family in document.families() {
        if let (Some(husband), Some(wife)) = (family.husband(), family.wife()) {
            if let Some(message) = related(&husband, &wife) {
                findings.report(message, [family.line().line_number()]);
            }
        }
    }
}

fn same_record(a: &Individual<'_>, b: &Individual<'_>) -> bool {
    a.identity() == b.identity()
}

fn contains(people: &[Individual<'_>], person: &Individual<'_>) -> bool {
    people.iter().any(|p| same_record(p, person))
}

/// The generation label of `person` among the descendants of `ancestor`.
fn descendant_label(ancestor: &Individual<'_>, person: &Individual<'_>) -> Option<String> {
    ancestor
        .descendants()
        .into_iter()
        .find(|relative| same_record(&relative.individual, person))
        .map(|relative| relative.label)
}

fn married_to_descendants(document: &Document, findings: &mut Findings) {
    related_spouses(document, findings, |husband, wife| {
        let (elder, younger, label) = if let Some(label) = descendant_label(husband, wife) {
            (husband, wife, label)
        } else {
            (wife, husband, descendant_label(wife, husband)?)
        };
        Some(format!(
            "{elder} is married to {} {label} {younger}",
            elder.sex().pronoun()
        ))
    });
}

fn siblings_married(document: &Document, findings: &mut Findings) {
    related_spouses(document, findings, |husband, wife| {
        contains(&husband.siblings(), wife).then(|| {
            format!(
                "{husband} is married to {} sibling {wife}",
                husband.sex().pronoun()
            )
        })
    });
}

fn cousins_married(document: &Document, findings: &mut Findings) {
    related_spouses(document, findings, |husband, wife| {
        contains(&husband.cousins(), wife).then(|| {
            format!(
                "{husband} is married to {} first cousin {wife}",
                husband.sex().pronoun()
            )
        })
    });
}

fn aunts_or_uncles_married(document: &Document, findings: &mut Findings) {
    related_spouses(document, findings, |husband, wife| {
        let (elder, younger) = if contains(&wife.aunts_and_uncles(), husband) {
            (husband, wife)
        } else if contains(&husband.aunts_and_uncles(), wife) {
            (wife, husband)
        } else {
            return None;
        };
        Some(format!(
            "{elder} is married to {} {} {younger}",
            elder.sex().pronoun(),
            younger.sex().niece_or_nephew()
        ))
    });
}

fn wrong_spouse_sex(document: &Document, findings: &mut Findings) {
    for family in document.families() {
        let roles = [
            ("husband", family.husband(), Sex::Female),
            ("wife", family.wife(), Sex::Male),
        ];
        for (role, spouse, wrong) in roles {
            if let Some(spouse) = spouse.filter(|s| s.sex() == wrong) {
                findings.report(
                    format!("{role} {spouse} of family {family} is recorded as {wrong}"),
                    [family.line().line_number(), spouse.line().line_number()],
                );
            }
        }
    }
}

fn cyclic_lineage(document: &Document, findings: &mut Findings) {
    let mut graph = DiGraphMap::<usize, ()>::new();
    for family in document.families() {
        let children = family.children();
        for parent in family.spouses() {
            let parent = parent.line().position();
            graph.add_node(parent);
            for child in &children {
                graph.add_edge(parent, child.line().position(), ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&node| graph.contains_edge(node, node));
        if !cyclic {
            continue;
        }

        let mut members: Vec<_> = component
            .iter()
            .filter_map(|&p| document.get(p))
            .map(|line| Individual::new(document, line))
            .collect();
        members.sort_by_key(|member| member.line().position());

        let names: Vec<_> = members.iter().map(ToString::to_string).collect();
        findings.report(
            format!("{} are their own ancestors", names.join(", ")),
            members.iter().map(|m| m.line().line_number()),
        );
    }
}

fn raw(date: Date<'_>) -> &str {
    date.line().value().unwrap_or_default()
}

fn lines_of<'doc>(dates: [Date<'doc>; 2]) -> impl Iterator<Item = usize> + 'doc {
    dates.into_iter().map(|date| date.line().line_number())
}
