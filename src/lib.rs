//! GEDCOM family-tree inspection
//!
//! A GEDCOM file is a flat sequence of leveled, tagged lines. This crate
//! rebuilds the outline those levels imply, resolves the `@XREF@` pointers
//! between records, and answers genealogical questions over the result:
//! spouses, siblings, descendants, cousins and overlapping marriages.
//!
//! ```
//! use gedcom::Document;
//!
//! let document = Document::parse("0 @I1@ INDI\n1 NAME John /Doe/\n1 BIRT\n2 DATE 1 JAN 1950\n")?;
//! let john = document.individual("@I1@").unwrap();
//!
//! assert_eq!(john.name().unwrap().surname(), Some("Doe"));
//! assert_eq!(john.birth_date().unwrap().to_string(), "1 JAN 1950 (line 4)");
//! # Ok::<(), gedcom::MalformedLineError>(())
//! ```

pub mod domain;
pub use domain::{
    Config, Date, Family, Horizon, Individual, Line, MarriageEnd, Name, Record, Relative, Sex,
    Tag, Xref,
};

/// Parsing and in-memory storage of GEDCOM documents.
pub mod storage;
pub use storage::{Document, LoadError, MalformedLineError, Query, SubDocument, load};

/// Consistency checks over a loaded document.
pub mod checks;
