mod document;
mod hierarchy;
mod parser;

pub use document::{Document, LoadError, Query, SubDocument, load};
pub use parser::{MalformedLineError, parse_line, parse_lines};
