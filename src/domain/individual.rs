use std::{collections::BTreeSet, fmt, sync::OnceLock};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    domain::{Date, Family, Line, Name, Sex, Tag, Xref, date::years_between},
    storage::{Document, Query},
};

/// A person record (`INDI`).
///
/// An `Individual` is a view over one line of a [`Document`] and the lines
/// nested beneath it. Each derived property is computed on first access and
/// cached for the lifetime of the view.
#[derive(Debug, Clone)]
pub struct Individual<'doc> {
    document: &'doc Document,
    line: &'doc Line,
    cache: Cache<'doc>,
}

#[derive(Debug, Clone, Default)]
struct Cache<'doc> {
    name: OnceLock<Option<Name<'doc>>>,
    sex: OnceLock<Sex>,
    birth_date: OnceLock<Option<Date<'doc>>>,
    death_date: OnceLock<Option<Date<'doc>>>,
    families_as_spouse: OnceLock<Vec<Family<'doc>>>,
    families_as_child: OnceLock<Vec<Family<'doc>>>,
}

impl<'doc> Individual<'doc> {
    /// Wraps an `INDI` line.
    #[must_use]
    pub fn new(document: &'doc Document, line: &'doc Line) -> Self {
        Self {
            document,
            line,
            cache: Cache::default(),
        }
    }

    /// A fresh, uncached view of the same record.
    pub(crate) fn view(&self) -> Self {
        Self::new(self.document, self.line)
    }

    /// The document this record belongs to.
    #[must_use]
    pub const fn document(&self) -> &'doc Document {
        self.document
    }

    /// The `INDI` line.
    #[must_use]
    pub const fn line(&self) -> &'doc Line {
        self.line
    }

    /// The identifier of the record, e.g. `@I1@`.
    #[must_use]
    pub fn xref(&self) -> Option<&'doc Xref> {
        self.line.xref()
    }

    /// What makes two views the same person: the identifier, or the line
    /// for a record without one. Duplicate definitions of an identifier
    /// share an identity.
    pub(crate) fn identity(&self) -> Identity<'doc> {
        self.xref()
            .map_or_else(|| Identity::Position(self.line.position()), Identity::Xref)
    }

    /// The first `NAME` of the person.
    #[must_use]
    pub fn name(&self) -> Option<Name<'doc>> {
        *self.cache.name.get_or_init(|| {
            self.document
                .children(self.line)
                .find_one_tag(&Tag::Name)
                .map(Name::new)
        })
    }

    /// The person's sex; [`Sex::Unknown`] when not recorded.
    #[must_use]
    pub fn sex(&self) -> Sex {
        *self.cache.sex.get_or_init(|| {
            let value = self
                .document
                .children(self.line)
                .find_one_tag(&Tag::Sex)
                .and_then(Line::value);
            Sex::from_value(value)
        })
    }

    /// The date of the `BIRT` event, if recorded and parseable.
    #[must_use]
    pub fn birth_date(&self) -> Option<Date<'doc>> {
        *self
            .cache
            .birth_date
            .get_or_init(|| event_date(self.document, self.line, &Tag::Birth))
    }

    /// The date of the `DEAT` event, if recorded and parseable.
    #[must_use]
    pub fn death_date(&self) -> Option<Date<'doc>> {
        *self
            .cache
            .death_date
            .get_or_init(|| event_date(self.document, self.line, &Tag::Death))
    }

    /// Whether no death date is recorded.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.death_date().is_none()
    }

    /// Whole years lived: from birth to death, or to the document's
    /// reference date for a living person.
    ///
    /// `None` without a birth date.
    #[must_use]
    pub fn age(&self) -> Option<u64> {
        let end = self
            .death_date()
            .map_or_else(|| self.document.reference_date(), |d| d.value());
        self.age_at(end)
    }

    /// Whole years between birth and `date`.
    #[must_use]
    pub fn age_at(&self, date: NaiveDate) -> Option<u64> {
        let birth = self.birth_date()?;
        Some(years_between(birth.value(), date))
    }

    /// The families this person is a spouse in (`FAMS`), without
    /// duplicates. Dangling pointers are skipped.
    #[must_use]
    pub fn families_as_spouse(&self) -> &[Family<'doc>] {
        self.cache
            .families_as_spouse
            .get_or_init(|| self.families(&Tag::FamilyAsSpouse))
    }

    /// The families this person is a child in (`FAMC`), without
    /// duplicates. Dangling pointers are skipped.
    #[must_use]
    pub fn families_as_child(&self) -> &[Family<'doc>] {
        self.cache
            .families_as_child
            .get_or_init(|| self.families(&Tag::FamilyAsChild))
    }

    fn families(&self, pointer: &Tag) -> Vec<Family<'doc>> {
        let mut seen = BTreeSet::new();
        self.document
            .children(self.line)
            .find_tag(pointer)
            .lines()
            .filter_map(|line| {
                let target = self.document.follow(line);
                if target.is_none() {
                    debug!(line = line.line_number(), "skipping unresolved family pointer");
                }
                target
            })
            .filter(|target| target.tag() == &Tag::Family)
            .filter(|target| seen.insert(target.position()))
            .map(|target| Family::new(self.document, target))
            .collect()
    }
}

/// The key visited sets and comparisons use for a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Identity<'doc> {
    Xref(&'doc Xref),
    Position(usize),
}

/// The date of the first `event` child of `record`.
pub(crate) fn event_date<'doc>(
    document: &'doc Document,
    record: &'doc Line,
    event: &Tag,
) -> Option<Date<'doc>> {
    let event = document.children(record).find_one_tag(event)?;
    let line = document.children(event).find_one_tag(&Tag::Date)?;

    Date::from_line(document, line)
        .inspect_err(|error| warn!(line = line.line_number(), %error, "ignoring unparseable date"))
        .ok()
}

impl PartialEq for Individual<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Individual<'_> {}

impl fmt::Display for Individual<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.name().map_or_else(|| "(unnamed)".to_string(), |n| n.full());
        match self.xref() {
            Some(xref) => write!(f, "{name} ({xref})"),
            None => f.write_str(&name),
        }
    }
}
