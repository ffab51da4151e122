//! Domain types for GEDCOM documents.
//!
//! This module contains the typed line model (identifiers, tags, lines), the
//! record views built over it (individuals and families), their dates and
//! names, relationship traversal, and configuration.

mod config;
pub use config::Config;

/// Symbolic identifiers (`@I1@`) and their ordering.
pub mod xref;
pub use xref::{InvalidXrefError, Xref};

mod tag;
pub use tag::{Tag, VOCABULARY_VERSION};

mod line;
pub use line::Line;

/// Calendar dates and date arithmetic.
pub mod date;
pub use date::{Date, DateFormatError, DateKind, Horizon, Precision};

mod name;
pub use name::Name;

mod sex;
pub use sex::Sex;

mod individual;
pub use individual::Individual;

mod family;
pub use family::{EndReason, Family, MarriageEnd};

/// Relationship traversal between individuals.
pub mod relations;
pub use relations::Relative;

mod record;
pub use record::Record;
