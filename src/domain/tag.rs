use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

/// The version of the recognised tag vocabulary.
///
/// Bump this whenever a tag is added to or removed from [`Tag::SUPPORTED`].
pub const VOCABULARY_VERSION: u32 = 1;

/// The kind of a line: a record (`INDI`, `FAM`) or an attribute (`NAME`,
/// `BIRT`, `DATE`, ...).
///
/// Tags outside the recognised vocabulary are kept verbatim as
/// [`Tag::Other`]; they parse and take part in the hierarchy like any other
/// line, but report [`Tag::is_supported`] as `false`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// `INDI` - a person record.
    Individual,
    /// `FAM` - a union (family) record.
    Family,
    /// `NAME` - a person's name, surname delimited by slashes.
    Name,
    /// `SEX` - a person's sex (`M` or `F`).
    Sex,
    /// `BIRT` - a birth event.
    Birth,
    /// `DEAT` - a death event.
    Death,
    /// `MARR` - a marriage event.
    Marriage,
    /// `DIV` - a divorce event.
    Divorce,
    /// `FAMS` - pointer to a family in which the person is a spouse.
    FamilyAsSpouse,
    /// `FAMC` - pointer to a family in which the person is a child.
    FamilyAsChild,
    /// `HUSB` - pointer to the husband of a family.
    Husband,
    /// `WIFE` - pointer to the wife of a family.
    Wife,
    /// `CHIL` - pointer to a child of a family.
    Child,
    /// `DATE` - the date of the enclosing event.
    Date,
    /// `HEAD` - the file header.
    Header,
    /// `TRLR` - the file trailer.
    Trailer,
    /// `NOTE` - a free-text note.
    Note,
    /// Any tag outside the recognised vocabulary.
    Other(String),
}

impl Tag {
    /// Every tag in the recognised vocabulary.
    pub const SUPPORTED: [Self; 17] = [
        Self::Individual,
        Self::Family,
        Self::Name,
        Self::Sex,
        Self::Birth,
        Self::Death,
        Self::Marriage,
        Self::Divorce,
        Self::FamilyAsSpouse,
        Self::FamilyAsChild,
        Self::Husband,
        Self::Wife,
        Self::Child,
        Self::Date,
        Self::Header,
        Self::Trailer,
        Self::Note,
    ];

    /// The token used for this tag in the source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Individual => "INDI",
            Self::Family => "FAM",
            Self::Name => "NAME",
            Self::Sex => "SEX",
            Self::Birth => "BIRT",
            Self::Death => "DEAT",
            Self::Marriage => "MARR",
            Self::Divorce => "DIV",
            Self::FamilyAsSpouse => "FAMS",
            Self::FamilyAsChild => "FAMC",
            Self::Husband => "HUSB",
            Self::Wife => "WIFE",
            Self::Child => "CHIL",
            Self::Date => "DATE",
            Self::Header => "HEAD",
            Self::Trailer => "TRLR",
            Self::Note => "NOTE",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this tag belongs to the recognised vocabulary.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether a line with this tag defines a record that pointers may
    /// refer to.
    #[must_use]
    pub const fn defines_record(&self) -> bool {
        matches!(self, Self::Individual | Self::Family | Self::Note)
    }

    /// Whether the value of a line with this tag is a pointer to a record.
    #[must_use]
    pub const fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::FamilyAsSpouse | Self::FamilyAsChild | Self::Husband | Self::Wife | Self::Child
        )
    }
}

impl From<&str> for Tag {
    fn from(token: &str) -> Self {
        Self::SUPPORTED
            .into_iter()
            .find(|tag| tag.as_str() == token)
            .unwrap_or_else(|| Self::Other(token.to_string()))
    }
}

impl FromStr for Tag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
