use crate::{
    domain::{Family, Individual, Line, Tag},
    storage::Document,
};

/// The result of following a pointer, typed by the kind of record found.
#[derive(Debug, Clone)]
pub enum Record<'doc> {
    /// A person record.
    Individual(Individual<'doc>),
    /// A union record.
    Family(Family<'doc>),
    /// Any other line, e.g. a top-level `NOTE`.
    Other(&'doc Line),
    /// The pointer names no record.
    Unresolved,
}

impl<'doc> Record<'doc> {
    /// Wraps a line in the view matching its tag.
    #[must_use]
    pub fn wrap(document: &'doc Document, line: &'doc Line) -> Self {
        match line.tag() {
            Tag::Individual => Self::Individual(Individual::new(document, line)),
            Tag::Family => Self::Family(Family::new(document, line)),
            _ => Self::Other(line),
        }
    }

    /// The line the record is anchored to.
    #[must_use]
    pub const fn line(&self) -> Option<&'doc Line> {
        match self {
            Self::Individual(individual) => Some(individual.line()),
            Self::Family(family) => Some(family.line()),
            Self::Other(line) => Some(*line),
            Self::Unresolved => None,
        }
    }

    /// A short name for the kind of record.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Individual(_) => "individual",
            Self::Family(_) => "family",
            Self::Other(_) => "other",
            Self::Unresolved => "unresolved",
        }
    }
}
