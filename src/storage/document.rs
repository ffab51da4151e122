//! An in-memory GEDCOM document.
//!
//! The [`Document`] owns every [`Line`] in a flat array; lines refer to each
//! other by position. Lookups by tag and by identifier go through indices
//! built once at load time. A [`SubDocument`] is a filtered view over the
//! same array that answers the same [`Query`] methods.

use std::{collections::BTreeMap, fs, path::Path};

use chrono::{Local, NaiveDate};
use tracing::{debug, instrument, warn};

use crate::{
    domain::{Config, Date, DateFormatError, Family, Individual, Line, Record, Tag, Xref},
    storage::{MalformedLineError, hierarchy, parser},
};

/// Errors that can occur when loading a document from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read GEDCOM file")]
    Io(#[from] std::io::Error),
    /// A line did not match the line grammar.
    #[error(transparent)]
    Malformed(#[from] MalformedLineError),
}

/// A parsed GEDCOM document.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,

    /// Positions of the lines carrying each tag, in document order.
    by_tag: BTreeMap<Tag, Vec<usize>>,

    /// Positions of the lines defining each identifier, in document order.
    /// More than one entry means the identifier is defined twice.
    by_xref: BTreeMap<Xref, Vec<usize>>,

    /// The "today" used for ages of living people.
    reference_date: NaiveDate,
}

/// Parses a complete document, failing on the first malformed line.
///
/// # Errors
///
/// Returns the first [`MalformedLineError`] encountered.
pub fn load(text: &str) -> Result<Document, MalformedLineError> {
    Document::parse(text)
}

impl Document {
    /// Parses a complete document, failing on the first malformed line.
    ///
    /// # Errors
    ///
    /// Returns the first [`MalformedLineError`] encountered.
    #[instrument(level = "debug", skip(text))]
    pub fn parse(text: &str) -> Result<Self, MalformedLineError> {
        let lines = parser::parse_lines(text).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_lines(lines))
    }

    /// Parses a complete document, skipping malformed lines.
    ///
    /// The skipped lines are returned alongside the document. The hierarchy
    /// is built from the lines that did parse.
    #[instrument(level = "debug", skip(text))]
    pub fn parse_lenient(text: &str) -> (Self, Vec<MalformedLineError>) {
        let mut lines = Vec::new();
        let mut skipped = Vec::new();

        for result in parser::parse_lines(text) {
            match result {
                Ok(line) => lines.push(line),
                Err(error) => {
                    warn!(line = error.line_number, text = %error.text, "skipping malformed line");
                    skipped.push(error);
                }
            }
        }

        (Self::from_lines(lines), skipped)
    }

    /// Reads and parses a file, honouring [`Config::skip_malformed`] and
    /// [`Config::reference_date`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, or
    /// [`LoadError::Malformed`] if a line is malformed and the configuration
    /// does not allow skipping it.
    #[instrument(level = "debug", skip(config))]
    pub fn open(path: &Path, config: &Config) -> Result<(Self, Vec<MalformedLineError>), LoadError> {
        let text = fs::read_to_string(path)?;

        let (document, skipped) = if config.skip_malformed {
            Self::parse_lenient(&text)
        } else {
            (Self::parse(&text)?, Vec::new())
        };

        let document = match config.reference_date {
            Some(date) => document.with_reference_date(date),
            None => document,
        };

        Ok((document, skipped))
    }

    /// Builds a document from parsed lines: assigns positions, builds the
    /// hierarchy and the lookup indices.
    #[must_use]
    pub fn from_lines(mut lines: Vec<Line>) -> Self {
        for (position, line) in lines.iter_mut().enumerate() {
            line.position = position;
        }

        hierarchy::build(&mut lines);

        let mut by_tag: BTreeMap<Tag, Vec<usize>> = BTreeMap::new();
        let mut by_xref: BTreeMap<Xref, Vec<usize>> = BTreeMap::new();
        let mut unsupported = 0usize;

        for line in &lines {
            by_tag.entry(line.tag.clone()).or_default().push(line.position);

            if let Some(xref) = &line.xref {
                by_xref.entry(xref.clone()).or_default().push(line.position);
            }

            if !line.tag_supported() {
                unsupported += 1;
                debug!(line = line.line_number, tag = %line.tag, "unsupported tag");
            }
        }

        if unsupported > 0 {
            warn!(count = unsupported, "document contains unsupported tags");
        }

        debug!(
            lines = lines.len(),
            individuals = by_tag.get(&Tag::Individual).map_or(0, Vec::len),
            families = by_tag.get(&Tag::Family).map_or(0, Vec::len),
            "loaded document"
        );

        Self {
            lines,
            by_tag,
            by_xref,
            reference_date: Local::now().date_naive(),
        }
    }

    /// Replaces the date used as "today" for ages of living people.
    #[must_use]
    pub const fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    /// The date used as "today".
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// The line at a position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Line> {
        self.lines.get(position)
    }

    /// The parent of a line.
    #[must_use]
    pub fn parent(&self, line: &Line) -> Option<&Line> {
        line.parent.and_then(|p| self.lines.get(p))
    }

    /// The immediate children of a line.
    #[must_use]
    pub fn children(&self, line: &Line) -> SubDocument<'_> {
        SubDocument {
            document: self,
            positions: line.children.clone(),
        }
    }

    /// Looks up the record a pointer refers to.
    ///
    /// Returns the first line in document order that defines `pointer` and
    /// whose tag defines a record. A pointer with no such line (or one that
    /// is not a well-formed identifier) resolves to `None`.
    #[must_use]
    pub fn resolve(&self, pointer: &str) -> Option<&Line> {
        let xref = Xref::try_from(pointer.trim()).ok()?;
        let target = self
            .by_xref
            .get(&xref)?
            .iter()
            .map(|&p| &self.lines[p])
            .find(|line| line.tag.defines_record());

        if target.is_none() {
            debug!(%xref, "dangling pointer");
        }
        target
    }

    /// Follows the pointer in a line's value.
    #[must_use]
    pub fn follow(&self, line: &Line) -> Option<&Line> {
        self.resolve(line.value()?)
    }

    /// Looks up the record a pointer refers to, typed by its kind.
    #[must_use]
    pub fn resolve_record(&self, pointer: &str) -> Record<'_> {
        self.resolve(pointer)
            .map_or(Record::Unresolved, |line| Record::wrap(self, line))
    }

    /// The individual defined by an identifier.
    #[must_use]
    pub fn individual(&self, pointer: &str) -> Option<Individual<'_>> {
        match self.resolve_record(pointer) {
            Record::Individual(individual) => Some(individual),
            _ => None,
        }
    }

    /// The family defined by an identifier.
    #[must_use]
    pub fn family(&self, pointer: &str) -> Option<Family<'_>> {
        match self.resolve_record(pointer) {
            Record::Family(family) => Some(family),
            _ => None,
        }
    }

    /// Every person record, in document order.
    #[must_use]
    pub fn individuals(&self) -> Vec<Individual<'_>> {
        self.positions_of(&Tag::Individual)
            .iter()
            .map(|&p| Individual::new(self, &self.lines[p]))
            .collect()
    }

    /// Every union record, in document order.
    #[must_use]
    pub fn families(&self) -> Vec<Family<'_>> {
        self.positions_of(&Tag::Family)
            .iter()
            .map(|&p| Family::new(self, &self.lines[p]))
            .collect()
    }

    /// Every DATE line paired with the result of parsing it.
    pub fn dates(&self) -> impl Iterator<Item = (&Line, Result<Date<'_>, DateFormatError>)> + '_ {
        self.positions_of(&Tag::Date).iter().map(|&p| {
            let line = &self.lines[p];
            (line, Date::from_line(self, line))
        })
    }

    /// Identifiers defined by more than one line, with the defining
    /// positions.
    pub fn duplicate_xrefs(&self) -> impl Iterator<Item = (&Xref, &[usize])> + '_ {
        self.by_xref
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(xref, positions)| (xref, positions.as_slice()))
    }

    fn positions_of(&self, tag: &Tag) -> &[usize] {
        self.by_tag.get(tag).map_or(&[], Vec::as_slice)
    }
}

/// The lookup interface shared by a [`Document`] and its [`SubDocument`]
/// views.
pub trait Query<'doc> {
    /// The document the lines belong to.
    fn document(&self) -> &'doc Document;

    /// Positions of the lines in this view, in document order.
    fn positions(&self) -> impl Iterator<Item = usize> + '_;

    /// The lines in this view, in document order.
    fn lines(&self) -> impl Iterator<Item = &'doc Line> {
        let document = self.document();
        self.positions().map(move |p| &document.lines[p])
    }

    /// Number of lines in this view.
    fn len(&self) -> usize {
        self.positions().count()
    }

    /// Whether this view has no lines.
    fn is_empty(&self) -> bool {
        self.positions().next().is_none()
    }

    /// The `index`th line of this view.
    fn nth(&self, index: usize) -> Option<&'doc Line> {
        self.lines().nth(index)
    }

    /// All lines matching a predicate.
    fn find(&self, predicate: impl Fn(&Line) -> bool) -> SubDocument<'doc> {
        SubDocument {
            document: self.document(),
            positions: self
                .lines()
                .filter(|line| predicate(line))
                .map(Line::position)
                .collect(),
        }
    }

    /// The first line matching a predicate.
    fn find_one(&self, predicate: impl Fn(&Line) -> bool) -> Option<&'doc Line> {
        self.lines().find(|line| predicate(line))
    }

    /// All lines with a tag.
    fn find_tag(&self, tag: &Tag) -> SubDocument<'doc> {
        self.find(|line| line.tag() == tag)
    }

    /// The first line with a tag.
    fn find_one_tag(&self, tag: &Tag) -> Option<&'doc Line> {
        self.find_one(|line| line.tag() == tag)
    }

    /// All lines defining an identifier.
    fn find_xref(&self, xref: &str) -> SubDocument<'doc> {
        self.find(|line| line.xref().is_some_and(|x| x.as_str() == xref))
    }

    /// The original text of the lines, newline-separated.
    fn text(&self) -> String {
        self.lines().map(Line::text).collect::<Vec<_>>().join("\n")
    }

    /// The parsed lines as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.lines().collect::<Vec<_>>())
    }
}

impl<'doc> Query<'doc> for &'doc Document {
    fn document(&self) -> &'doc Document {
        *self
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.lines.len()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn find_tag(&self, tag: &Tag) -> SubDocument<'doc> {
        SubDocument {
            document: *self,
            positions: self.positions_of(tag).to_vec(),
        }
    }

    fn find_xref(&self, xref: &str) -> SubDocument<'doc> {
        let positions = Xref::try_from(xref)
            .ok()
            .and_then(|xref| self.by_xref.get(&xref))
            .cloned()
            .unwrap_or_default();

        SubDocument {
            document: *self,
            positions,
        }
    }
}

/// A subset of a document's lines, in their original relative order.
///
/// A view never copies lines or recomputes the hierarchy; it only records
/// which positions it contains.
#[derive(Debug, Clone)]
pub struct SubDocument<'doc> {
    document: &'doc Document,
    positions: Vec<usize>,
}

impl<'doc> Query<'doc> for SubDocument<'doc> {
    fn document(&self) -> &'doc Document {
        self.document
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied()
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}
