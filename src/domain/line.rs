use serde::Serialize;

use crate::domain::{Tag, Xref};

/// A single parsed line of a GEDCOM document.
///
/// Lines are created by the parser and annotated with their position in the
/// outline by the hierarchy builder. Once a [`Document`](crate::Document) has
/// been loaded its lines never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub(crate) level: usize,
    pub(crate) xref: Option<Xref>,
    pub(crate) tag: Tag,
    pub(crate) value: Option<String>,
    pub(crate) text: String,
    /// 1-based number of the line in the input text, blank lines included.
    pub(crate) line_number: usize,
    /// 0-based index of the line in the document.
    pub(crate) position: usize,
    pub(crate) children: Vec<usize>,
    pub(crate) parent: Option<usize>,
}

impl Line {
    /// Depth of the line in the outline.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// The identifier this line defines, if any (`@I1@` in `0 @I1@ INDI`).
    #[must_use]
    pub const fn xref(&self) -> Option<&Xref> {
        self.xref.as_ref()
    }

    /// The tag of the line.
    #[must_use]
    pub const fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Whether the tag belongs to the recognised vocabulary.
    #[must_use]
    pub const fn tag_supported(&self) -> bool {
        self.tag.is_supported()
    }

    /// The trimmed value following the tag, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The value interpreted as a pointer to another record.
    ///
    /// Returns `None` if there is no value or it is not a well-formed
    /// cross-reference.
    #[must_use]
    pub fn pointer(&self) -> Option<Xref> {
        self.value()?.parse().ok()
    }

    /// The original text of the line, trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based line number in the input text, for diagnostics.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// 0-based position of the line in the document.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Positions of the immediate children of this line, in document order.
    #[must_use]
    pub fn child_positions(&self) -> &[usize] {
        &self.children
    }

    /// Position of the parent line, or `None` for a top-level line.
    #[must_use]
    pub const fn parent_position(&self) -> Option<usize> {
        self.parent
    }
}
