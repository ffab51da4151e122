//! Line parser.
//!
//! Turns one line of GEDCOM text into a [`Line`]. The grammar is
//!
//! ```text
//! LEVEL SP [XREF SP] TAG [SP VALUE]
//! ```
//!
//! where `LEVEL` is a decimal integer without leading zeros, `XREF` is a token
//! wrapped in `@` delimiters and `VALUE` is the rest of the line, trimmed.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Line, Tag, Xref};

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<level>0|[1-9][0-9]*)\s+(?:(?P<xref>@[^@\s]+@)\s+)?(?P<tag>[^@\s]\S*)(?:\s+(?P<value>.*))?$")
        .expect("line grammar is a valid regex")
});

/// A line that does not match the GEDCOM line grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_number}: '{text}' does not have the syntax 'LEVEL [@XREF@] TAG [VALUE]'")]
pub struct MalformedLineError {
    /// 1-based number of the offending line in the input.
    pub line_number: usize,
    /// The offending text, trimmed.
    pub text: String,
}

/// Parses a single, non-blank line of text.
///
/// The returned line has no position or hierarchy yet; those are assigned
/// when the line is added to a [`Document`](crate::Document).
///
/// Tags outside the recognised vocabulary parse successfully and are
/// reported through [`Line::tag_supported`].
///
/// # Errors
///
/// Returns [`MalformedLineError`] if the text does not match the grammar.
pub fn parse_line(text: &str, line_number: usize) -> Result<Line, MalformedLineError> {
    let text = text.trim();
    let malformed = || MalformedLineError {
        line_number,
        text: text.to_string(),
    };

    let captures = LINE.captures(text).ok_or_else(malformed)?;

    let level = captures["level"].parse::<usize>().map_err(|_| malformed())?;

    let xref = captures
        .name("xref")
        .map(|m| Xref::try_from(m.as_str()))
        .transpose()
        .map_err(|_| malformed())?;

    let tag = Tag::from(&captures["tag"]);

    let value = captures
        .name("value")
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);

    Ok(Line {
        level,
        xref,
        tag,
        value,
        text: text.to_string(),
        line_number,
        position: 0,
        children: Vec::new(),
        parent: None,
    })
}

/// Parses every non-blank line of `text`, in order.
///
/// Blank lines are skipped but still counted, so the line numbers reported
/// in errors and on each [`Line`] match the input.
pub fn parse_lines(text: &str) -> impl Iterator<Item = Result<Line, MalformedLineError>> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, raw)| !raw.trim().is_empty())
        .map(|(index, raw)| parse_line(raw, index + 1))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn record_line_with_identifier() {
        let line = parse_line("0 @I1@ INDI", 1).unwrap();
        assert_eq!(line.level(), 0);
        assert_eq!(line.xref().map(Xref::as_str), Some("@I1@"));
        assert_eq!(line.tag(), &Tag::Individual);
        assert_eq!(line.value(), None);
        assert!(line.tag_supported());
    }

    #[test]
    fn attribute_line_with_value() {
        let line = parse_line("1 NAME John /Doe/", 2).unwrap();
        assert_eq!(line.level(), 1);
        assert_eq!(line.xref(), None);
        assert_eq!(line.tag(), &Tag::Name);
        assert_eq!(line.value(), Some("John /Doe/"));
        assert_eq!(line.line_number(), 2);
    }

    #[test]
    fn value_is_trimmed() {
        let line = parse_line("  2 DATE   1 JAN 1950   ", 1).unwrap();
        assert_eq!(line.value(), Some("1 JAN 1950"));
        assert_eq!(line.text(), "2 DATE   1 JAN 1950");
    }

    #[test]
    fn pointer_values_are_recognised() {
        let line = parse_line("1 HUSB @I1@", 1).unwrap();
        assert_eq!(line.pointer().map(|x| x.to_string()), Some("@I1@".into()));

        let line = parse_line("1 HUSB I1", 1).unwrap();
        assert_eq!(line.pointer(), None);
    }

    #[test]
    fn unsupported_tags_parse() {
        let line = parse_line("0 @S1@ SUBM", 1).unwrap();
        assert_eq!(line.tag(), &Tag::Other("SUBM".to_string()));
        assert!(!line.tag_supported());
    }

    #[test]
    fn multi_digit_levels() {
        let line = parse_line("12 NOTE deep", 1).unwrap();
        assert_eq!(line.level(), 12);
    }

    #[test_case("INDI"; "missing level")]
    #[test_case("01 NAME x"; "leading zero")]
    #[test_case("-1 NAME x"; "negative level")]
    #[test_case("1"; "missing tag")]
    #[test_case("1NAME"; "missing separator")]
    #[test_case("0 @I1@"; "identifier without tag")]
    fn malformed_lines(text: &str) {
        let error = parse_line(text, 7).unwrap_err();
        assert_eq!(error.line_number, 7);
        assert_eq!(error.text, text);
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let text = "0 HEAD\n\n   \n0 TRLR\n";
        let lines: Vec<_> = parse_lines(text).collect::<Result<_, _>>().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].line_number(), 4);
    }

    #[test]
    fn error_display() {
        let error = parse_line("garbage", 3).unwrap_err();
        assert_eq!(
            error.to_string(),
            "line 3: 'garbage' does not have the syntax 'LEVEL [@XREF@] TAG [VALUE]'"
        );
    }
}
