use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::domain::Line;

static SURNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/]*/([^/]*)/").expect("surname pattern is a valid regex"));

/// A person's name, as written on a `NAME` line.
///
/// The surname is the text between the first pair of slashes:
/// `John /Doe/` has the surname `Doe`.
#[derive(Debug, Clone, Copy)]
pub struct Name<'doc> {
    line: &'doc Line,
}

impl<'doc> Name<'doc> {
    pub(crate) const fn new(line: &'doc Line) -> Self {
        Self { line }
    }

    /// The name exactly as written, slashes included.
    #[must_use]
    pub fn raw(&self) -> &'doc str {
        self.line.value().unwrap_or_default()
    }

    /// The name with the surname markers removed and spacing collapsed.
    #[must_use]
    pub fn full(&self) -> String {
        self.raw()
            .replace('/', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The surname, if the name marks one.
    #[must_use]
    pub fn surname(&self) -> Option<&'doc str> {
        SURNAME
            .captures(self.raw())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Everything before the surname marker, trimmed.
    #[must_use]
    pub fn given(&self) -> &'doc str {
        self.raw().split('/').next().unwrap_or_default().trim()
    }

    /// The NAME line.
    #[must_use]
    pub const fn line(&self) -> &'doc Line {
        self.line
    }
}

impl PartialEq for Name<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.full() == other.full()
    }
}

impl Eq for Name<'_> {}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.full())
    }
}
