//! End-to-end tests over a small family tree on disk.

use std::path::Path;

use chrono::NaiveDate;
use gedcom::{
    Config, Document, Horizon, Query, Tag,
    checks::{self, Check},
    domain::EndReason,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture() -> Document {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/family.ged");
    let config = Config {
        reference_date: Some(ymd(2020, 1, 1)),
        ..Config::default()
    };
    let (document, skipped) = Document::open(&path, &config).unwrap();
    assert!(skipped.is_empty());
    document
}

fn ids(people: &[gedcom::Individual<'_>]) -> Vec<String> {
    people
        .iter()
        .map(|p| p.xref().unwrap().to_string())
        .collect()
}

#[test]
fn individual_facts() {
    let document = fixture();
    let john = document.individual("@I1@").unwrap();

    let name = john.name().unwrap();
    assert_eq!(name.surname(), Some("Doe"));
    assert_eq!(name.given(), "John");
    assert_eq!(john.birth_date().unwrap().value(), ymd(1950, 1, 1));
    assert_eq!(john.age(), Some(30));

    let mary = document.individual("@I3@").unwrap();
    assert_eq!(mary.birth_date().unwrap().value(), ymd(1972, 6, 1));
    assert!(mary.is_alive());
}

#[test]
fn marriage_ends_with_husband_death() {
    let document = fixture();
    let family = document.family("@F1@").unwrap();

    let end = family.marriage_end();
    assert_eq!(end.reason, EndReason::HusbandDeath);
    assert_eq!(end.end, Horizon::On(ymd(1980, 1, 1)));
}

#[test]
fn overlapping_marriages_are_detected() {
    let document = fixture();
    let john = document.individual("@I1@").unwrap();

    let overlapping = john.overlapping_marriages();
    assert_eq!(overlapping.len(), 1);
    assert_eq!(overlapping[0].0.xref().unwrap().as_str(), "@F1@");
    assert_eq!(overlapping[0].1.xref().unwrap().as_str(), "@F2@");
}

#[test]
fn dangling_child_pointer_is_skipped() {
    let document = fixture();
    assert!(document.resolve("@I99@").is_none());

    let family = document.family("@F2@").unwrap();
    assert_eq!(ids(&family.children()), ["@I5@"]);
}

#[test]
fn relationships() {
    let document = fixture();

    let mary = document.individual("@I3@").unwrap();
    assert_eq!(ids(&mary.siblings()), Vec::<String>::new());
    assert_eq!(ids(&mary.parents()), ["@I1@", "@I2@"]);
    assert_eq!(ids(&mary.spouses()), ["@I6@"]);

    let john = document.individual("@I1@").unwrap();
    assert_eq!(ids(&john.spouses()), ["@I2@", "@I4@"]);
    assert_eq!(ids(&john.children()), ["@I3@", "@I5@"]);

    let labels: Vec<_> = john
        .descendants()
        .into_iter()
        .map(|r| (r.individual.xref().unwrap().to_string(), r.label))
        .collect();
    assert_eq!(
        labels,
        [
            ("@I3@".to_string(), "child".to_string()),
            ("@I5@".to_string(), "child".to_string()),
            ("@I7@".to_string(), "grandchild".to_string()),
        ]
    );

    let lucy = document.individual("@I7@").unwrap();
    assert_eq!(ids(&lucy.aunts_and_uncles()), Vec::<String>::new());
    assert_eq!(lucy.ancestors().len(), 4);
}

#[test]
fn sub_document_queries() {
    let document = fixture();
    let doc = &document;

    let header = doc.find_one_tag(&Tag::Header).unwrap();
    let header_children = document.children(header);
    assert_eq!(header_children.len(), 3);
    assert_eq!(header_children.find_tag(&Tag::Date).len(), 1);

    assert_eq!(doc.find_tag(&Tag::Individual).len(), 7);
    assert_eq!(document.families().len(), 3);
}

#[test]
fn validation_findings() {
    let document = fixture();
    let findings = checks::run_all(&document, &Config::default());

    let found: Vec<_> = findings.iter().map(|f| f.check).collect();
    assert!(found.contains(&Check::UnsupportedTag));
    assert!(found.contains(&Check::DanglingPointer));
    assert!(found.contains(&Check::UnparseableDate));
    assert!(found.contains(&Check::Bigamy));
    assert!(!found.contains(&Check::CyclicLineage));
    assert!(!found.contains(&Check::DateInFuture));
}
