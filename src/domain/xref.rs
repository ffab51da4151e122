use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Serialize, Serializer};

/// The delimiter that wraps a cross-reference identifier.
pub const DELIMITER: char = '@';

/// A symbolic cross-reference identifier, such as `@I1@` or `@F23@`.
///
/// A record line defines an identifier (`0 @I1@ INDI`), and pointer lines
/// refer to it by value (`1 HUSB @I1@`). The identifier is stored with its
/// delimiters so that it compares equal to the raw pointer text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Xref(NonEmptyString);

impl Xref {
    /// Creates a new `Xref` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidXrefError`] if the string is not wrapped in `@`
    /// delimiters, has nothing between them, or contains whitespace or an
    /// inner `@`.
    pub fn new(s: String) -> Result<Self, InvalidXrefError> {
        let inner = s
            .strip_prefix(DELIMITER)
            .and_then(|rest| rest.strip_suffix(DELIMITER));

        let valid = inner.is_some_and(|inner| {
            !inner.is_empty()
                && !inner.contains(DELIMITER)
                && !inner.chars().any(char::is_whitespace)
        });

        if !valid {
            return Err(InvalidXrefError(s));
        }

        NonEmptyString::new(s)
            .map(Self)
            .map_err(InvalidXrefError)
    }

    /// Returns the identifier including its delimiters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the identifier without its delimiters (`I1` for `@I1@`).
    #[must_use]
    pub fn inner(&self) -> &str {
        let s = self.0.as_str();
        &s[1..s.len() - 1]
    }
}

/// Error returned when a token is not a well-formed cross-reference.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid cross-reference '{0}': expected a token of the form @ID@")]
pub struct InvalidXrefError(String);

impl TryFrom<String> for Xref {
    type Error = InvalidXrefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Xref {
    type Error = InvalidXrefError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Xref {
    type Err = InvalidXrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for Xref {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Xref {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Xref {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Xref {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Orders identifiers the way people read them: `@I2@` before `@I10@`.
///
/// Runs of ASCII digits compare numerically, everything else compares
/// case-insensitively.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    use std::{cmp::Ordering, iter::Peekable, str::Chars};

    fn take_number(it: &mut Peekable<Chars<'_>>) -> String {
        let mut digits = String::new();
        while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            it.next();
        }
        digits
    }

    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_digits = take_number(&mut left);
                let r_digits = take_number(&mut right);
                let l_trimmed = l_digits.trim_start_matches('0');
                let r_trimmed = r_digits.trim_start_matches('0');
                let ordering = l_trimmed
                    .len()
                    .cmp(&r_trimmed.len())
                    .then_with(|| l_trimmed.cmp(r_trimmed));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}
