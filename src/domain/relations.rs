//! Relationship traversal.
//!
//! Every relation here is derived from the `FAMS`/`FAMC` pointers of a person
//! and the `HUSB`/`WIFE`/`CHIL` pointers of the families they lead to.
//! Unresolvable pointers are skipped, and multi-generation walks keep a
//! visited set of identifiers so that cyclic data cannot make them loop.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{Family, Horizon, Individual};

/// A relative found by a multi-generation walk.
#[derive(Debug, Clone)]
pub struct Relative<'doc> {
    /// The relative.
    pub individual: Individual<'doc>,
    /// How many generations away: 1 for a child or parent.
    pub generation: usize,
    /// "child", "grandchild", "great-grandchild", ... or "parent",
    /// "grandparent", ...
    pub label: String,
}

/// The label for a descendant `generation` levels down.
#[must_use]
pub fn descendant_label(generation: usize) -> String {
    generation_label(generation, "child")
}

/// The label for an ancestor `generation` levels up.
#[must_use]
pub fn ancestor_label(generation: usize) -> String {
    generation_label(generation, "parent")
}

fn generation_label(generation: usize, noun: &str) -> String {
    match generation {
        0 => "self".to_string(),
        1 => noun.to_string(),
        n => format!("{}grand{noun}", "great-".repeat(n - 2)),
    }
}

/// Whether two closed intervals intersect.
///
/// Both ends are inclusive, so intervals that share only an end date
/// overlap. The test is symmetric in its arguments.
#[must_use]
pub fn intervals_overlap(a: (NaiveDate, Horizon), b: (NaiveDate, Horizon)) -> bool {
    Horizon::On(a.0) <= b.1 && Horizon::On(b.0) <= a.1
}

/// Collects views, keeping the first of each record and skipping `exclude`.
fn distinct<'doc>(
    exclude: &Individual<'doc>,
    people: impl IntoIterator<Item = Individual<'doc>>,
) -> Vec<Individual<'doc>> {
    let mut seen = BTreeSet::from([exclude.identity()]);
    people
        .into_iter()
        .filter(|person| seen.insert(person.identity()))
        .collect()
}

impl<'doc> Individual<'doc> {
    /// The other spouse in every family this person is a spouse in,
    /// without duplicates.
    #[must_use]
    pub fn spouses(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.families_as_spouse().iter().flat_map(Family::spouses),
        )
    }

    /// Each family this person is a spouse in, with the other spouse if
    /// one is recorded.
    #[must_use]
    pub fn families_and_spouses(&self) -> Vec<(Family<'doc>, Option<Individual<'doc>>)> {
        self.families_as_spouse()
            .iter()
            .map(|family| (family.view(), family.other_spouse(self)))
            .collect()
    }

    /// The other children of every family this person is a child in,
    /// without duplicates. Half-siblings are included.
    #[must_use]
    pub fn siblings(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.families_as_child().iter().flat_map(Family::children),
        )
    }

    /// Each family this person is a child in, with the other children.
    #[must_use]
    pub fn families_and_siblings(&self) -> Vec<(Family<'doc>, Vec<Individual<'doc>>)> {
        self.families_as_child()
            .iter()
            .map(|family| (family.view(), distinct(self, family.children())))
            .collect()
    }

    /// The children of every family this person is a spouse in.
    #[must_use]
    pub fn children(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.families_as_spouse().iter().flat_map(Family::children),
        )
    }

    /// The spouses of every family this person is a child in.
    #[must_use]
    pub fn parents(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.families_as_child().iter().flat_map(Family::spouses),
        )
    }

    /// The siblings of each parent.
    #[must_use]
    pub fn aunts_and_uncles(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.parents().iter().flat_map(Individual::siblings),
        )
    }

    /// The children of the siblings of each parent.
    #[must_use]
    pub fn cousins(&self) -> Vec<Individual<'doc>> {
        distinct(
            self,
            self.aunts_and_uncles().iter().flat_map(Individual::children),
        )
    }

    /// Every descendant, breadth first, labelled by generation.
    ///
    /// Each person appears at most once, at the nearest generation they are
    /// reached. The walk terminates on cyclic data and never reports this
    /// person as their own descendant.
    #[must_use]
    pub fn descendants(&self) -> Vec<Relative<'doc>> {
        self.walk(Self::children, descendant_label)
    }

    /// Every ancestor, breadth first, labelled by generation.
    ///
    /// Like [`Individual::descendants`], but following parents.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Relative<'doc>> {
        self.walk(Self::parents, ancestor_label)
    }

    fn walk(
        &self,
        step: impl Fn(&Self) -> Vec<Self>,
        label: impl Fn(usize) -> String,
    ) -> Vec<Relative<'doc>> {
        let mut visited = BTreeSet::from([self.identity()]);
        let mut frontier = vec![self.view()];
        let mut found = Vec::new();
        let mut generation = 0;

        while !frontier.is_empty() {
            generation += 1;
            let mut next = Vec::new();

            for person in &frontier {
                for relative in step(person) {
                    if visited.insert(relative.identity()) {
                        found.push(Relative {
                            individual: relative.view(),
                            generation,
                            label: label(generation),
                        });
                        next.push(relative);
                    }
                }
            }

            frontier = next;
        }

        found
    }

    /// Pairs of this person's marriages whose date ranges intersect.
    ///
    /// A marriage runs from its marriage date to its
    /// [`marriage_end`](Family::marriage_end); families without a marriage
    /// date are not compared. Each unordered pair of distinct families is
    /// reported once, in document order.
    #[must_use]
    pub fn overlapping_marriages(&self) -> Vec<(Family<'doc>, Family<'doc>)> {
        let marriages: Vec<_> = self
            .families_as_spouse()
            .iter()
            .filter_map(|family| {
                let start = family.marriage_date()?.value();
                Some((family, (start, family.marriage_end().end)))
            })
            .collect();

        let mut overlapping = Vec::new();
        for (i, (first, a)) in marriages.iter().enumerate() {
            for (second, b) in &marriages[i + 1..] {
                if intervals_overlap(*a, *b) {
                    overlapping.push((first.view(), second.view()));
                }
            }
        }
        overlapping
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{domain::Xref, storage::Document};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(people: &[Individual<'_>]) -> Vec<String> {
        people
            .iter()
            .filter_map(Individual::xref)
            .map(Xref::to_string)
            .collect()
    }

    /// Three generations:
    ///
    /// ```text
    ///        I1 = I2           (F1)
    ///     ┌───┴───┐
    ///    I3       I4 = I5      (F2)
    ///    = I8     │
    ///    │        I6, I7
    ///    I9                    (F3: I3 + I8)
    /// ```
    const TREE: &str = "\
0 @I1@ INDI
1 SEX M
1 FAMS @F1@
0 @I2@ INDI
1 SEX F
1 FAMS @F1@
0 @I3@ INDI
1 SEX F
1 FAMC @F1@
1 FAMS @F3@
0 @I4@ INDI
1 SEX M
1 FAMC @F1@
1 FAMS @F2@
0 @I5@ INDI
1 SEX F
1 FAMS @F2@
0 @I6@ INDI
1 FAMC @F2@
0 @I7@ INDI
1 FAMC @F2@
0 @I8@ INDI
1 SEX M
1 FAMS @F3@
0 @I9@ INDI
1 FAMC @F3@
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 CHIL @I4@
0 @F2@ FAM
1 HUSB @I4@
1 WIFE @I5@
1 CHIL @I6@
1 CHIL @I7@
0 @F3@ FAM
1 HUSB @I8@
1 WIFE @I3@
1 CHIL @I9@
";

    #[test]
    fn spouses_exclude_self() {
        let document = Document::parse(TREE).unwrap();
        let i4 = document.individual("@I4@").unwrap();
        assert_eq!(ids(&i4.spouses()), ["@I5@"]);
    }

    #[test]
    fn siblings_exclude_self() {
        let document = Document::parse(TREE).unwrap();
        let i6 = document.individual("@I6@").unwrap();
        assert_eq!(ids(&i6.siblings()), ["@I7@"]);
    }

    #[test]
    fn parents_and_children() {
        let document = Document::parse(TREE).unwrap();
        let i4 = document.individual("@I4@").unwrap();
        assert_eq!(ids(&i4.parents()), ["@I1@", "@I2@"]);
        assert_eq!(ids(&i4.children()), ["@I6@", "@I7@"]);
    }

    #[test]
    fn aunts_uncles_and_cousins() {
        let document = Document::parse(TREE).unwrap();
        let i9 = document.individual("@I9@").unwrap();
        assert_eq!(ids(&i9.aunts_and_uncles()), ["@I4@"]);
        assert_eq!(ids(&i9.cousins()), ["@I6@", "@I7@"]);
    }

    #[test]
    fn descendants_are_labelled_by_generation() {
        let document = Document::parse(TREE).unwrap();
        let i1 = document.individual("@I1@").unwrap();

        let found: Vec<_> = i1
            .descendants()
            .into_iter()
            .map(|r| (r.individual.xref().unwrap().to_string(), r.label))
            .collect();

        assert_eq!(
            found,
            [
                ("@I3@".to_string(), "child".to_string()),
                ("@I4@".to_string(), "child".to_string()),
                ("@I9@".to_string(), "grandchild".to_string()),
                ("@I6@".to_string(), "grandchild".to_string()),
                ("@I7@".to_string(), "grandchild".to_string()),
            ]
        );
    }

    #[test]
    fn ancestors_are_labelled_by_generation() {
        let document = Document::parse(TREE).unwrap();
        let i6 = document.individual("@I6@").unwrap();

        let found: Vec<_> = i6
            .ancestors()
            .into_iter()
            .map(|r| (r.individual.xref().unwrap().to_string(), r.generation))
            .collect();

        assert_eq!(
            found,
            [
                ("@I4@".to_string(), 1),
                ("@I5@".to_string(), 1),
                ("@I1@".to_string(), 2),
                ("@I2@".to_string(), 2),
            ]
        );
    }

    #[test]
    fn descendants_terminate_on_cycles() {
        // I1 is the child of their own child's family
        let text = "\
0 @I1@ INDI
1 FAMS @F1@
1 FAMC @F2@
0 @I2@ INDI
1 FAMC @F1@
1 FAMS @F2@
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
0 @F2@ FAM
1 HUSB @I2@
1 CHIL @I1@
";
        let document = Document::parse(text).unwrap();
        let i1 = document.individual("@I1@").unwrap();

        let descendants = i1.descendants();
        assert_eq!(descendants.len(), 1);
        assert_eq!(descendants[0].individual.xref().unwrap().as_str(), "@I2@");

        // repeated calls start from a fresh visited set
        assert_eq!(i1.descendants().len(), 1);
        assert_eq!(i1.ancestors().len(), 1);
    }

    #[test]
    fn duplicate_definition_is_not_its_own_descendant() {
        // both @I1@ records are spouses in F1; pointers resolve to the first
        let text = "\
0 @I1@ INDI
1 FAMS @F1@
0 @I1@ INDI
1 FAMS @F1@
0 @I2@ INDI
1 FAMC @F1@
1 FAMS @F2@
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
0 @F2@ FAM
1 HUSB @I2@
1 CHIL @I1@
";
        let document = Document::parse(text).unwrap();
        let individuals = document.individuals();
        let second = &individuals[1];
        assert_eq!(second.xref().unwrap().as_str(), "@I1@");

        let descendants = second.descendants();
        assert_eq!(descendants.len(), 1);
        assert_eq!(descendants[0].individual.xref().unwrap().as_str(), "@I2@");
        assert!(second.spouses().is_empty());
    }

    #[test_case(1, "child"; "one")]
    #[test_case(2, "grandchild"; "two")]
    #[test_case(3, "great-grandchild"; "three")]
    #[test_case(5, "great-great-great-grandchild"; "five")]
    fn descendant_labels(generation: usize, expected: &str) {
        assert_eq!(descendant_label(generation), expected);
    }

    #[test]
    fn ancestor_labels() {
        assert_eq!(ancestor_label(1), "parent");
        assert_eq!(ancestor_label(3), "great-grandparent");
    }

    fn marriages(first: &str, second: &str) -> String {
        format!(
            "\
0 @I1@ INDI
1 FAMS @F1@
1 FAMS @F2@
0 @F1@ FAM
1 HUSB @I1@
1 MARR
2 DATE 1 JAN 1970
{first}0 @F2@ FAM
1 HUSB @I1@
1 MARR
{second}"
        )
    }

    #[test]
    fn concurrent_marriages_overlap() {
        let text = marriages("1 DIV\n2 DATE 1 JAN 1980\n", "2 DATE 1 JUN 1975\n");
        let document = Document::parse(&text).unwrap();
        let i1 = document.individual("@I1@").unwrap();

        let pairs = i1.overlapping_marriages();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.xref().unwrap().as_str(), "@F1@");
        assert_eq!(pairs[0].1.xref().unwrap().as_str(), "@F2@");
    }

    #[test]
    fn consecutive_marriages_do_not_overlap() {
        let text = marriages("1 DIV\n2 DATE 1 JAN 1980\n", "2 DATE 1 JAN 1981\n");
        let document = Document::parse(&text).unwrap();
        let i1 = document.individual("@I1@").unwrap();
        assert!(i1.overlapping_marriages().is_empty());
    }

    #[test]
    fn marriages_without_dates_are_not_compared() {
        let text = marriages("", "");
        let document = Document::parse(&text).unwrap();
        let i1 = document.individual("@I1@").unwrap();
        assert!(i1.overlapping_marriages().is_empty());
    }

    #[test]
    fn interval_test_is_symmetric_and_inclusive() {
        let a = (ymd(1970, 1, 1), Horizon::On(ymd(1980, 1, 1)));
        let b = (ymd(1975, 6, 1), Horizon::Forever);
        let c = (ymd(1981, 1, 1), Horizon::Forever);
        let touching = (ymd(1980, 1, 1), Horizon::Forever);

        assert!(intervals_overlap(a, b));
        assert!(intervals_overlap(b, a));
        assert!(!intervals_overlap(a, c));
        assert!(!intervals_overlap(c, a));
        assert!(intervals_overlap(a, touching));
        assert!(intervals_overlap(a, a));
    }
}
