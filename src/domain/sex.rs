use std::fmt;

use serde::Serialize;

/// A person's recorded sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    /// `M`
    Male,
    /// `F`
    Female,
    /// Anything else, including an empty value.
    Unknown,
}

impl Sex {
    /// Interprets the value of a `SEX` line.
    #[must_use]
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("M") => Self::Male,
            Some(v) if v.eq_ignore_ascii_case("F") => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Possessive pronoun for messages.
    #[must_use]
    pub const fn pronoun(self) -> &'static str {
        match self {
            Self::Male => "his",
            Self::Female => "her",
            Self::Unknown => "their",
        }
    }

    /// Word for a sibling of a parent.
    #[must_use]
    pub const fn aunt_or_uncle(self) -> &'static str {
        match self {
            Self::Male => "uncle",
            Self::Female => "aunt",
            Self::Unknown => "aunt/uncle",
        }
    }

    /// Word for a child of a sibling.
    #[must_use]
    pub const fn niece_or_nephew(self) -> &'static str {
        match self {
            Self::Male => "nephew",
            Self::Female => "niece",
            Self::Unknown => "niece/nephew",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unknown => "Unknown",
        })
    }
}
