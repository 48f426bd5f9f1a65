//! Scanner for dependency fields.
//!
//! Parsing happens in three passes over the input: the field is split on
//! top-level commas into relations, each relation is split on top-level
//! pipes into possibilities, and each possibility is scanned left to right
//! for a name, an optional multiarch qualifier and its clauses. No pass
//! backtracks, and the first error aborts the whole parse.
use crate::error::{ErrorKind, ParseError};
use crate::relations::{
    Arch, ArchSet, BuildProfile, Dependency, Operator, Possibility, Relation, Version,
};
use crate::ParseOptions;

/// Characters with structural meaning, which never appear in a name.
pub(crate) fn is_special(c: char) -> bool {
    matches!(
        c,
        ',' | '|' | ':' | '(' | ')' | '[' | ']' | '<' | '>' | '!' | '$' | '{' | '}'
    )
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !is_special(c)
}

fn is_version_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '|' | '(' | ')' | '[' | ']' | '<' | '>')
}

/// A slice of the input, with its byte offset in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Segment<'a> {
    fn trim(self) -> Self {
        let leading = self.text.len() - self.text.trim_start().len();
        Segment {
            text: self.text.trim(),
            offset: self.offset + leading,
        }
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        Segment {
            text: &self.text[start..end],
            offset: self.offset + start,
        }
    }
}

/// Split `segment` on `delim`, ignoring delimiters inside `(...)`, `[...]`,
/// `<...>` and `${...}`.
///
/// An unterminated clause runs to the end of the segment; the possibility
/// scanner reports it.
fn split_top_level(segment: Segment<'_>, delim: char) -> Vec<Segment<'_>> {
    let mut parts = Vec::new();
    let mut closer: Option<char> = None;
    let mut start = 0;

    for (i, c) in segment.text.char_indices() {
        if let Some(close) = closer {
            if c == close {
                closer = None;
            }
            continue;
        }
        match c {
            '(' => closer = Some(')'),
            '[' => closer = Some(']'),
            '<' => closer = Some('>'),
            '{' => closer = Some('}'),
            c if c == delim => {
                parts.push(segment.slice(start, i));
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(segment.slice(start, segment.text.len()));
    parts
}

pub(crate) fn parse(text: &str, options: &ParseOptions) -> Result<Dependency, ParseError> {
    let result = parse_dependency(text, options);
    #[cfg(feature = "tracing")]
    if let Err(err) = &result {
        tracing::debug!(
            kind = ?err.kind(),
            offset = err.offset(),
            "rejected dependency field"
        );
    }
    result
}

fn parse_dependency(text: &str, options: &ParseOptions) -> Result<Dependency, ParseError> {
    let whole = Segment { text, offset: 0 }.trim();
    if whole.text.is_empty() {
        return Err(ParseError::at(ErrorKind::EmptyRelation, whole.offset));
    }

    let relations = split_top_level(whole, ',')
        .into_iter()
        .map(|group| parse_relation(group.trim(), options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dependency { relations })
}

fn parse_relation(group: Segment<'_>, options: &ParseOptions) -> Result<Relation, ParseError> {
    if group.text.is_empty() {
        return Err(ParseError::at(ErrorKind::EmptyRelation, group.offset));
    }

    let possibilities = split_top_level(group, '|')
        .into_iter()
        .map(|alternative| {
            let alternative = alternative.trim();
            if alternative.text.is_empty() {
                Err(ParseError::at(ErrorKind::EmptyPossibility, alternative.offset))
            } else {
                parse_possibility(alternative, options)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Relation { possibilities })
}

/// The only part of `segment` when split on `delim`, or an error at the
/// first top-level `delim`.
fn single(segment: Segment<'_>, delim: char) -> Result<Segment<'_>, ParseError> {
    let mut parts = split_top_level(segment, delim).into_iter();
    let first = parts.next().unwrap_or(segment);
    match parts.next() {
        Some(next) => Err(ParseError::new(
            ErrorKind::TrailingInput,
            next.offset - delim.len_utf8(),
            segment.offset + segment.text.len(),
        )),
        None => Ok(first),
    }
}

/// Parse text that must hold exactly one relation.
pub(crate) fn parse_single_relation(
    text: &str,
    options: &ParseOptions,
) -> Result<Relation, ParseError> {
    let whole = Segment { text, offset: 0 }.trim();
    parse_relation(single(whole, ',')?.trim(), options)
}

/// Parse text that must hold exactly one possibility.
pub(crate) fn parse_single_possibility(
    text: &str,
    options: &ParseOptions,
) -> Result<Possibility, ParseError> {
    let group = single(Segment { text, offset: 0 }.trim(), ',')?.trim();
    if group.text.is_empty() {
        return Err(ParseError::at(ErrorKind::EmptyRelation, group.offset));
    }
    let alternative = single(group, '|')?.trim();
    if alternative.text.is_empty() {
        return Err(ParseError::at(ErrorKind::EmptyPossibility, alternative.offset));
    }
    parse_possibility(alternative, options)
}

fn parse_possibility(
    alternative: Segment<'_>,
    options: &ParseOptions,
) -> Result<Possibility, ParseError> {
    let mut scanner = Scanner::new(alternative);

    if scanner.rest().starts_with("${") {
        if !options.allow_substvar {
            return Err(scanner.error(ErrorKind::SubstvarNotAllowed));
        }
        return scanner.parse_substvar();
    }

    let name = scanner.take_while(is_name_char);
    if name.is_empty() {
        return Err(scanner.error(ErrorKind::EmptyName));
    }
    let mut possibility = Possibility::simple(name);

    // The qualifier must be attached: `foo :amd64` ends up as trailing input.
    if scanner.peek() == Some(':') {
        let start = scanner.pos;
        scanner.bump();
        let token = scanner.take_while(is_name_char);
        let arch = Arch::from_token(token)
            .ok_or_else(|| scanner.error_from(ErrorKind::MalformedArchitecture, start))?;
        possibility.arch = Some(arch);
    }

    loop {
        scanner.skip_ws();
        match scanner.peek() {
            Some('(') => {
                if possibility.version.is_some() {
                    return Err(scanner.error(ErrorKind::DuplicateVersion));
                }
                possibility.version = Some(scanner.parse_version()?);
            }
            Some('[') => {
                if possibility.architectures.is_some() {
                    return Err(scanner.error(ErrorKind::DuplicateArchitecture));
                }
                possibility.architectures = Some(scanner.parse_architectures()?);
            }
            Some('<') => {
                if !options.allow_profiles {
                    return Err(scanner.error(ErrorKind::ProfilesNotAllowed));
                }
                possibility.profiles.push(scanner.parse_profile()?);
            }
            _ => break,
        }
    }

    scanner.expect_end()?;
    Ok(possibility)
}

/// Cursor over a single possibility.
struct Scanner<'a> {
    text: &'a str,
    offset: usize,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(segment: Segment<'a>) -> Self {
        Self {
            text: segment.text,
            offset: segment.offset,
            pos: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Whether the cursor is at the end or on whitespace.
    fn at_separator(&self) -> bool {
        self.peek().map_or(true, char::is_whitespace)
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(kind, self.offset + self.pos)
    }

    /// An error covering the text from `start` to the cursor.
    fn error_from(&self, kind: ErrorKind, start: usize) -> ParseError {
        ParseError::new(kind, self.offset + start, self.offset + self.pos)
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        if self.peek().is_some() {
            return Err(ParseError::new(
                ErrorKind::TrailingInput,
                self.offset + self.pos,
                self.offset + self.text.len(),
            ));
        }
        Ok(())
    }

    /// `${name}`, with nothing but whitespace after it.
    fn parse_substvar(&mut self) -> Result<Possibility, ParseError> {
        let start = self.pos;
        self.pos += "${".len();
        let name = self.take_while(|c| is_name_char(c) || c == ':');
        if !self.eat('}') {
            return Err(self.error_from(ErrorKind::MalformedSubstvar, start));
        }
        if name.is_empty() {
            return Err(self.error_from(ErrorKind::EmptyName, start));
        }
        self.expect_end()?;

        Ok(Possibility {
            name: name.to_string(),
            substvar: true,
            ..Default::default()
        })
    }

    /// `(` operator number `)`
    fn parse_version(&mut self) -> Result<Version, ParseError> {
        let start = self.pos;
        self.bump();
        self.skip_ws();

        let (operator, len) = Operator::match_prefix(self.rest())
            .ok_or_else(|| self.error_from(ErrorKind::MalformedVersion, start))?;
        self.pos += len;
        self.skip_ws();

        let number = self.take_while(is_version_char);
        if number.is_empty() {
            return Err(self.error_from(ErrorKind::MalformedVersion, start));
        }
        self.skip_ws();
        if !self.eat(')') {
            return Err(self.error_from(ErrorKind::MalformedVersion, start));
        }

        Ok(Version {
            operator,
            number: number.to_string(),
        })
    }

    /// `[` (`!`? arch)+ `]`, negated uniformly.
    fn parse_architectures(&mut self) -> Result<ArchSet, ParseError> {
        let start = self.pos;
        self.bump();
        let mut not = None;
        let mut architectures = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error_from(ErrorKind::UnterminatedArchitecture, start)),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
            }

            let entry = self.pos;
            let negated = self.eat('!');
            let token = self.take_while(is_name_char);
            if token.is_empty() || !(self.at_separator() || self.peek() == Some(']')) {
                return Err(self.malformed_architecture(start, entry));
            }
            let arch = Arch::from_token(token)
                .ok_or_else(|| self.error_from(ErrorKind::MalformedArchitecture, entry))?;

            match not {
                None => not = Some(negated),
                Some(expected) if expected != negated => {
                    return Err(self.error_from(ErrorKind::MixedArchNegation, entry));
                }
                Some(_) => {}
            }
            architectures.push(arch);
        }

        if architectures.is_empty() {
            return Err(self.error_from(ErrorKind::UnterminatedArchitecture, start));
        }

        Ok(ArchSet {
            not: not.unwrap_or(false),
            architectures,
        })
    }

    /// A bad entry in the list opened at `start`. Without a closing `]`
    /// further on, the list was cut short rather than mistyped.
    fn malformed_architecture(&self, start: usize, entry: usize) -> ParseError {
        if self.rest().contains(']') {
            self.error_from(ErrorKind::MalformedArchitecture, entry)
        } else {
            self.error_from(ErrorKind::UnterminatedArchitecture, start)
        }
    }

    /// `<` (`!`? profile)+ `>`
    fn parse_profile(&mut self) -> Result<Vec<BuildProfile>, ParseError> {
        let start = self.pos;
        self.bump();
        let mut terms = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error_from(ErrorKind::MalformedProfile, start)),
                Some('>') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
            }

            let entry = self.pos;
            let negated = self.eat('!');
            let name = self.take_while(is_name_char);
            if name.is_empty() || !(self.at_separator() || self.peek() == Some('>')) {
                return Err(self.error_from(ErrorKind::MalformedProfile, entry));
            }
            terms.push(if negated {
                BuildProfile::Disabled(name.to_string())
            } else {
                BuildProfile::Enabled(name.to_string())
            });
        }

        if terms.is_empty() {
            return Err(self.error_from(ErrorKind::MalformedProfile, start));
        }
        Ok(terms)
    }
}
