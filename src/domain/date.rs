use std::{cmp::Ordering, fmt};

use chrono::{
    NaiveDate,
    format::{Parsed, StrftimeItems},
};

use crate::{
    domain::{Line, Record, Tag},
    storage::Document,
};

/// How much of a calendar date the source text specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    /// `1 JAN 1950`
    Day,
    /// `JAN 1950`, read as the first of the month.
    Month,
    /// `1950`, read as the first of January.
    Year,
}

/// Date text that matches none of the supported formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported date format '{0}': expected 'D MON YYYY', 'MON YYYY' or 'YYYY'")]
pub struct DateFormatError(pub String);

/// Parses date text, trying day, month and year precision in that order.
///
/// Month names are three-letter English abbreviations, matched
/// case-insensitively. The year must be four digits.
///
/// # Errors
///
/// Returns [`DateFormatError`] if none of the formats match.
pub fn parse_date(text: &str) -> Result<(NaiveDate, Precision), DateFormatError> {
    let text = text.trim();
    let error = || DateFormatError(text.to_string());

    let four_digit_year = text
        .rsplit(' ')
        .next()
        .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));
    if !four_digit_year {
        return Err(error());
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%d %b %Y") {
        return Ok((date, Precision::Day));
    }
    if let Some(date) = parse_partial(text, "%b %Y", false) {
        return Ok((date, Precision::Month));
    }
    if let Some(date) = parse_partial(text, "%Y", true) {
        return Ok((date, Precision::Year));
    }

    Err(error())
}

/// Parses a date with missing fields, filling them with the first day (and,
/// for year-only text, the first month).
fn parse_partial(text: &str, format: &str, year_only: bool) -> Option<NaiveDate> {
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, text, StrftimeItems::new(format)).ok()?;
    if year_only {
        parsed.set_month(1).ok()?;
    }
    parsed.set_day(1).ok()?;
    parsed.to_naive_date().ok()
}

/// Whole days between two dates, regardless of their order.
#[must_use]
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u64 {
    (a - b).num_days().unsigned_abs()
}

/// Whole years between two dates, regardless of their order.
///
/// A year is counted as 365 days and partial years are truncated, so this
/// drifts from calendar years by roughly a day every four years.
#[must_use]
pub fn years_between(a: NaiveDate, b: NaiveDate) -> u64 {
    days_between(a, b) / 365
}

/// What event a DATE line annotates, according to its parent's tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKind {
    /// Date of a `BIRT` event.
    Birth,
    /// Date of a `DEAT` event.
    Death,
    /// Date of a `MARR` event.
    Marriage,
    /// Date of a `DIV` event.
    Divorce,
    /// Date in the file header.
    Header,
    /// Date under any other tag.
    Other(Tag),
    /// A DATE line with no parent.
    Detached,
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Birth => f.write_str("birth"),
            Self::Death => f.write_str("death"),
            Self::Marriage => f.write_str("marriage"),
            Self::Divorce => f.write_str("divorce"),
            Self::Header => f.write_str("header"),
            Self::Other(tag) => write!(f, "{tag}"),
            Self::Detached => f.write_str("detached"),
        }
    }
}

/// A parsed calendar date, tied to the DATE line it was read from.
///
/// Dates compare by calendar value only; where they came from does not
/// matter.
#[derive(Debug, Clone, Copy)]
pub struct Date<'doc> {
    document: &'doc Document,
    line: &'doc Line,
    value: NaiveDate,
    precision: Precision,
}

impl<'doc> Date<'doc> {
    /// Parses the value of a DATE line.
    ///
    /// # Errors
    ///
    /// Returns [`DateFormatError`] if the line has no value or the value is
    /// not in a supported format.
    pub fn from_line(document: &'doc Document, line: &'doc Line) -> Result<Self, DateFormatError> {
        let text = line.value().unwrap_or_default();
        let (value, precision) = parse_date(text)?;
        Ok(Self {
            document,
            line,
            value,
            precision,
        })
    }

    /// The calendar value. Partial dates are anchored to their first day.
    #[must_use]
    pub const fn value(&self) -> NaiveDate {
        self.value
    }

    /// How precise the source text was.
    #[must_use]
    pub const fn precision(&self) -> Precision {
        self.precision
    }

    /// The DATE line this date was read from.
    #[must_use]
    pub const fn line(&self) -> &'doc Line {
        self.line
    }

    /// What event this date annotates.
    #[must_use]
    pub fn kind(&self) -> DateKind {
        match self.document.parent(self.line).map(Line::tag) {
            Some(Tag::Birth) => DateKind::Birth,
            Some(Tag::Death) => DateKind::Death,
            Some(Tag::Marriage) => DateKind::Marriage,
            Some(Tag::Divorce) => DateKind::Divorce,
            Some(Tag::Header) => DateKind::Header,
            Some(tag) => DateKind::Other(tag.clone()),
            None => DateKind::Detached,
        }
    }

    /// The record the dated event belongs to: the grandparent of the DATE
    /// line (`INDI` → `BIRT` → `DATE`).
    #[must_use]
    pub fn belongs_to(&self) -> Option<Record<'doc>> {
        let event = self.document.parent(self.line)?;
        let record = self.document.parent(event)?;
        Some(Record::wrap(self.document, record))
    }
}

impl PartialEq for Date<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Date<'_> {}

impl PartialOrd for Date<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Date<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for Date<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (line {})",
            self.line.value().unwrap_or_default(),
            self.line.line_number()
        )
    }
}

/// The end of an interval that may still be open.
///
/// `Forever` sorts after every date, so interval comparisons stay total
/// without a null check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Horizon {
    /// The interval ends on this date.
    On(NaiveDate),
    /// The interval has not ended.
    Forever,
}

impl From<NaiveDate> for Horizon {
    fn from(date: NaiveDate) -> Self {
        Self::On(date)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::On(date) => write!(f, "{}", date.format("%-d %b %Y").to_string().to_uppercase()),
            Self::Forever => f.write_str("never"),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case("1 JAN 1950", ymd(1950, 1, 1), Precision::Day; "day month year")]
    #[test_case("25 dec 2001", ymd(2001, 12, 25), Precision::Day; "lowercase month")]
    #[test_case("07 Jul 1969", ymd(1969, 7, 7), Precision::Day; "zero padded day")]
    #[test_case("JUN 1970", ymd(1970, 6, 1), Precision::Month; "month year")]
    #[test_case("1981", ymd(1981, 1, 1), Precision::Year; "year only")]
    fn supported_formats(text: &str, expected: NaiveDate, precision: Precision) {
        assert_eq!(parse_date(text), Ok((expected, precision)));
    }

    #[test_case(""; "empty")]
    #[test_case("ABT 1950"; "qualifier")]
    #[test_case("1 JAN 50"; "two digit year")]
    #[test_case("32 JAN 1950"; "day out of range")]
    #[test_case("1950-01-01"; "iso")]
    #[test_case("1 FOO 1950"; "unknown month")]
    #[test_case("19500"; "five digit year")]
    fn unsupported_formats(text: &str) {
        assert_eq!(parse_date(text), Err(DateFormatError(text.to_string())));
    }

    #[test]
    fn years_are_truncated_whole_days_over_365() {
        assert_eq!(years_between(ymd(1950, 1, 1), ymd(1980, 1, 1)), 30);
        // 2000 is a leap year, so 31 DEC is 365 days after 1 JAN
        assert_eq!(years_between(ymd(2000, 1, 1), ymd(2000, 12, 31)), 1);
        assert_eq!(years_between(ymd(2000, 1, 2), ymd(2000, 12, 31)), 0);
        assert_eq!(years_between(ymd(1980, 1, 1), ymd(1950, 1, 1)), 30);
    }

    const EVENTS: &str = "\
0 HEAD
1 DATE 1 JAN 2000
0 @I1@ INDI
1 BIRT
2 DATE 1 JAN 1950
0 @F1@ FAM
1 MARR
2 DATE JUN 1970
0 DATE 1990
";

    fn date_at(document: &Document, position: usize) -> Date<'_> {
        Date::from_line(document, document.get(position).unwrap()).unwrap()
    }

    #[test]
    fn birth_date_belongs_to_individual() {
        let document = Document::parse(EVENTS).unwrap();
        let birth = date_at(&document, 4);

        assert_eq!(birth.kind(), DateKind::Birth);
        let Some(Record::Individual(person)) = birth.belongs_to() else {
            panic!("expected an individual");
        };
        assert_eq!(person.xref().unwrap().as_str(), "@I1@");
    }

    #[test]
    fn marriage_date_belongs_to_family() {
        let document = Document::parse(EVENTS).unwrap();
        let marriage = date_at(&document, 7);

        assert_eq!(marriage.kind(), DateKind::Marriage);
        assert_eq!(marriage.precision(), Precision::Month);
        let Some(Record::Family(family)) = marriage.belongs_to() else {
            panic!("expected a family");
        };
        assert_eq!(family.xref().unwrap().as_str(), "@F1@");
    }

    #[test]
    fn header_date_has_no_record() {
        let document = Document::parse(EVENTS).unwrap();
        let header = date_at(&document, 1);

        assert_eq!(header.kind(), DateKind::Header);
        assert!(header.belongs_to().is_none());
    }

    #[test]
    fn top_level_date_is_detached() {
        let document = Document::parse(EVENTS).unwrap();
        let detached = date_at(&document, 8);

        assert_eq!(detached.kind(), DateKind::Detached);
        assert_eq!(detached.kind().to_string(), "detached");
        assert!(detached.belongs_to().is_none());
    }

    #[test]
    fn horizon_forever_sorts_last() {
        assert!(Horizon::On(ymd(9999, 12, 31)) < Horizon::Forever);
        assert!(Horizon::On(ymd(1970, 1, 1)) < Horizon::On(ymd(1980, 1, 1)));
    }

    #[test]
    fn horizon_display() {
        assert_eq!(Horizon::On(ymd(1980, 1, 1)).to_string(), "1 JAN 1980");
        assert_eq!(Horizon::Forever.to_string(), "never");
    }
}
