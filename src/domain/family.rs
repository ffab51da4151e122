use std::{collections::BTreeSet, fmt, sync::OnceLock};

use tracing::debug;

use crate::{
    domain::{Date, Horizon, Individual, Line, Sex, Tag, Xref, individual::event_date},
    storage::{Document, Query},
};

/// A union record (`FAM`).
///
/// Like [`Individual`], a `Family` is a cached view over one line of a
/// [`Document`]. Spouse and child pointers are resolved once; each call to
/// [`Family::husband`], [`Family::wife`] or [`Family::children`] wraps the
/// resolved lines in fresh views.
#[derive(Debug, Clone)]
pub struct Family<'doc> {
    document: &'doc Document,
    line: &'doc Line,
    cache: Cache<'doc>,
}

#[derive(Debug, Clone, Default)]
struct Cache<'doc> {
    husband: OnceLock<Option<&'doc Line>>,
    wife: OnceLock<Option<&'doc Line>>,
    children: OnceLock<Vec<&'doc Line>>,
    marriage_date: OnceLock<Option<Date<'doc>>>,
    divorce_date: OnceLock<Option<Date<'doc>>>,
    marriage_end: OnceLock<MarriageEnd<'doc>>,
}

/// Why a marriage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The couple divorced.
    Divorce,
    /// The husband died first.
    HusbandDeath,
    /// The wife died first (or on the same day).
    WifeDeath,
    /// Neither divorce nor a spouse's death is recorded.
    NotEnded,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Divorce => "divorce",
            Self::HusbandDeath => "husband's death",
            Self::WifeDeath => "wife's death",
            Self::NotEnded => "not ended",
        })
    }
}

/// When and why a marriage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarriageEnd<'doc> {
    /// What ended the marriage.
    pub reason: EndReason,
    /// The end of the marriage; [`Horizon::Forever`] if it has not ended.
    pub end: Horizon,
    /// The divorce or death date the end was read from.
    pub date: Option<Date<'doc>>,
}

impl<'doc> MarriageEnd<'doc> {
    const fn ended(reason: EndReason, date: Date<'doc>) -> Self {
        Self {
            reason,
            end: Horizon::On(date.value()),
            date: Some(date),
        }
    }

    const NOT_ENDED: Self = Self {
        reason: EndReason::NotEnded,
        end: Horizon::Forever,
        date: None,
    };
}

impl<'doc> Family<'doc> {
    /// Wraps a `FAM` line.
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

    /// The `FAM` line.
    #[must_use]
    pub const fn line(&self) -> &'doc Line {
        self.line
    }

    /// The identifier of the record, e.g. `@F1@`.
    #[must_use]
    pub fn xref(&self) -> Option<&'doc Xref> {
        self.line.xref()
    }

    /// The husband, if recorded and resolvable.
    #[must_use]
    pub fn husband(&self) -> Option<Individual<'doc>> {
        self.cache
            .husband
            .get_or_init(|| self.spouse_line(&Tag::Husband))
            .map(|line| Individual::new(self.document, line))
    }

    /// The wife, if recorded and resolvable.
    #[must_use]
    pub fn wife(&self) -> Option<Individual<'doc>> {
        self.cache
            .wife
            .get_or_init(|| self.spouse_line(&Tag::Wife))
            .map(|line| Individual::new(self.document, line))
    }

    /// Both spouses, skipping any that are missing.
    pub fn spouses(&self) -> impl Iterator<Item = Individual<'doc>> {
        self.husband().into_iter().chain(self.wife())
    }

    /// The children, in the order of the `CHIL` lines, without duplicates.
    /// Dangling pointers are skipped.
    #[must_use]
    pub fn children(&self) -> Vec<Individual<'doc>> {
        self.cache
            .children
            .get_or_init(|| {
                let mut seen = BTreeSet::new();
                self.document
                    .children(self.line)
                    .find_tag(&Tag::Child)
                    .lines()
                    .filter_map(|line| self.individual_line(line))
                    .filter(|target| seen.insert(target.position()))
                    .collect()
            })
            .iter()
            .map(|&line| Individual::new(self.document, line))
            .collect()
    }

    /// The children recorded as male.
    #[must_use]
    pub fn male_children(&self) -> Vec<Individual<'doc>> {
        self.children_of_sex(Sex::Male)
    }

    /// The children recorded as female.
    #[must_use]
    pub fn female_children(&self) -> Vec<Individual<'doc>> {
        self.children_of_sex(Sex::Female)
    }

    fn children_of_sex(&self, sex: Sex) -> Vec<Individual<'doc>> {
        self.children()
            .into_iter()
            .filter(|child| child.sex() == sex)
            .collect()
    }

    /// The date of the `MARR` event, if recorded and parseable.
    #[must_use]
    pub fn marriage_date(&self) -> Option<Date<'doc>> {
        *self
            .cache
            .marriage_date
            .get_or_init(|| event_date(self.document, self.line, &Tag::Marriage))
    }

    /// The date of the `DIV` event, if recorded and parseable.
    #[must_use]
    pub fn divorce_date(&self) -> Option<Date<'doc>> {
        *self
            .cache
            .divorce_date
            .get_or_init(|| event_date(self.document, self.line, &Tag::Divorce))
    }

    /// When the marriage ended.
    ///
    /// A divorce takes precedence. Otherwise the marriage ends with the
    /// earlier spouse death; a missing spouse counts as living. A marriage
    /// with neither ends at [`Horizon::Forever`].
    #[must_use]
    pub fn marriage_end(&self) -> MarriageEnd<'doc> {
        *self.cache.marriage_end.get_or_init(|| {
            if let Some(divorce) = self.divorce_date() {
                return MarriageEnd::ended(EndReason::Divorce, divorce);
            }

            let husband = self.husband().and_then(|h| h.death_date());
            let wife = self.wife().and_then(|w| w.death_date());

            match (husband, wife) {
                (Some(h), Some(w)) if h < w => MarriageEnd::ended(EndReason::HusbandDeath, h),
                (_, Some(w)) => MarriageEnd::ended(EndReason::WifeDeath, w),
                (Some(h), None) => MarriageEnd::ended(EndReason::HusbandDeath, h),
                (None, None) => MarriageEnd::NOT_ENDED,
            }
        })
    }

    /// The husband's age in whole years at the marriage date.
    #[must_use]
    pub fn husband_marriage_age(&self) -> Option<u64> {
        let married = self.marriage_date()?;
        self.husband()?.age_at(married.value())
    }

    /// The wife's age in whole years at the marriage date.
    #[must_use]
    pub fn wife_marriage_age(&self) -> Option<u64> {
        let married = self.marriage_date()?;
        self.wife()?.age_at(married.value())
    }

    /// The spouse other than `individual`, if any.
    #[must_use]
    pub fn other_spouse(&self, individual: &Individual<'doc>) -> Option<Individual<'doc>> {
        self.spouses().find(|spouse| spouse != individual)
    }

    fn spouse_line(&self, role: &Tag) -> Option<&'doc Line> {
        let pointer = self.document.children(self.line).find_one_tag(role)?;
        self.individual_line(pointer)
    }

    fn individual_line(&self, pointer: &'doc Line) -> Option<&'doc Line> {
        let target = self.document.follow(pointer);
        if target.is_none() {
            debug!(line = pointer.line_number(), "skipping unresolved person pointer");
        }
        target.filter(|target| target.tag() == &Tag::Individual)
    }
}

impl PartialEq for Family<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.xref(), other.xref()) {
            (Some(a), Some(b)) => a == b,
            _ => self.line.position() == other.line.position(),
        }
    }
}

impl Eq for Family<'_> {}

impl fmt::Display for Family<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.xref() {
            Some(xref) => write!(f, "{xref}"),
            None => write!(f, "family on line {}", self.line.line_number()),
        }
    }
}
