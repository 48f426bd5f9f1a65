//! Errors produced while parsing a dependency field.
use rowan::{TextRange, TextSize};

/// The kind of syntax violation that aborted a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input, or one of its comma-separated groups, is empty.
    EmptyRelation,

    /// One of the `|`-separated alternatives is empty.
    EmptyPossibility,

    /// An alternative does not start with a package name.
    EmptyName,

    /// A second `(...)` clause on one alternative.
    DuplicateVersion,

    /// A second `[...]` clause on one alternative.
    DuplicateArchitecture,

    /// A version clause without operator, number or closing `)`.
    MalformedVersion,

    /// An architecture list without closing `]`, or with no entries.
    UnterminatedArchitecture,

    /// Negated and plain entries in one architecture list.
    MixedArchNegation,

    /// Architecture entries that are not whitespace-separated, or an
    /// architecture token with an empty component.
    MalformedArchitecture,

    /// Text left over after the last recognized clause.
    TrailingInput,

    /// A `${...}` token that is unterminated or not a single token.
    MalformedSubstvar,

    /// A `<...>` build profile formula that is empty or unterminated.
    MalformedProfile,

    /// A substvar where [`crate::ParseOptions::allow_substvar`] is off.
    SubstvarNotAllowed,

    /// A build profile formula where [`crate::ParseOptions::allow_profiles`] is off.
    ProfilesNotAllowed,
}

impl ErrorKind {
    /// Human-readable description of this kind of error.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::EmptyRelation => "empty relation",
            ErrorKind::EmptyPossibility => "empty alternative",
            ErrorKind::EmptyName => "expected package name",
            ErrorKind::DuplicateVersion => "duplicate version constraint",
            ErrorKind::DuplicateArchitecture => "duplicate architecture restriction",
            ErrorKind::MalformedVersion => "malformed version constraint",
            ErrorKind::UnterminatedArchitecture => "unterminated architecture restriction",
            ErrorKind::MixedArchNegation => "mixed negated and plain architectures",
            ErrorKind::MalformedArchitecture => "malformed architecture",
            ErrorKind::TrailingInput => "expected ',' or '|'",
            ErrorKind::MalformedSubstvar => "malformed substitution variable",
            ErrorKind::MalformedProfile => "malformed build profile restriction",
            ErrorKind::SubstvarNotAllowed => "substitution variables are not allowed",
            ErrorKind::ProfilesNotAllowed => "build profile restrictions are not allowed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A parse error, positioned in the original input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    kind: ErrorKind,
    range: TextRange,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, start: usize, end: usize) -> Self {
        // Field values never come close to u32::MAX bytes.
        let start = TextSize::try_from(start).unwrap_or(TextSize::from(u32::MAX));
        let end = TextSize::try_from(end).unwrap_or(TextSize::from(u32::MAX));
        Self {
            kind,
            range: TextRange::new(start, end.max(start)),
        }
    }

    pub(crate) fn at(kind: ErrorKind, offset: usize) -> Self {
        Self::new(kind, offset, offset)
    }

    /// What went wrong.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The byte range of the offending text in the input.
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        usize::from(self.range.start())
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError::at(ErrorKind::MalformedVersion, 4);
        assert_eq!(err.to_string(), "malformed version constraint at offset 4");
    }

    #[test]
    fn test_range() {
        let err = ParseError::new(ErrorKind::TrailingInput, 4, 7);
        assert_eq!(err.offset(), 4);
        assert_eq!(err.range(), TextRange::new(4.into(), 7.into()));
        assert_eq!(err.kind(), ErrorKind::TrailingInput);
    }

    #[test]
    fn test_inverted_range_is_clamped() {
        let err = ParseError::new(ErrorKind::EmptyName, 5, 2);
        assert_eq!(err.range(), TextRange::empty(5.into()));
    }
}
