//! A line classifier for Proguard-style mapping files.
//!
//! The format is the one written by ProGuard, R8 and the Mojang obfuscation
//! maps:
//!
//! ```text
//! com.example.Foo -> a:
//!     int count -> a
//!     12:14:int bar(java.lang.String):30:32 -> b
//! ```
//!
//! Every line is classified on its own, see [`MappingLine::classify`]. Which
//! class a member line belongs to is decided by the
//! [`Transcoder`](crate::Transcoder).

use std::fmt;

use crate::diagnostics::Reason;

/// A single classified line of a mapping file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingLine<'s> {
    /// An empty or whitespace only line.
    Blank,
    /// A `#` comment or header line.
    Comment(&'s str),
    /// A class mapping.
    Class {
        /// Original name of the class.
        original: &'s str,
        /// Obfuscated name of the class.
        obfuscated: &'s str,
    },
    /// A field mapping.
    Field {
        /// Type of the field.
        ty: &'s str,
        /// Original name of the field.
        original: &'s str,
        /// Obfuscated name of the field.
        obfuscated: &'s str,
    },
    /// A method mapping.
    Method {
        /// Return type of the method.
        ty: &'s str,
        /// Original name of the method, including the `owner.Class.` qualifier
        /// of a foreign inlined method.
        original: &'s str,
        /// Arguments of the method as raw string.
        arguments: &'s str,
        /// Obfuscated name of the method.
        obfuscated: &'s str,
    },
    /// A line that could not be parsed.
    Unrecognized(Reason),
}

impl<'s> MappingLine<'s> {
    /// Classifies a single line of a mapping file.
    ///
    /// # Examples
    ///
    /// ```
    /// use intermediary::{MappingLine, Reason};
    ///
    /// assert_eq!(
    ///     MappingLine::classify("com.example.Foo -> a:"),
    ///     MappingLine::Class {
    ///         original: "com.example.Foo",
    ///         obfuscated: "a",
    ///     }
    /// );
    ///
    /// assert_eq!(
    ///     MappingLine::classify("    1:3:int bar(java.lang.String) -> b"),
    ///     MappingLine::Method {
    ///         ty: "int",
    ///         original: "bar",
    ///         arguments: "java.lang.String",
    ///         obfuscated: "b",
    ///     }
    /// );
    ///
    /// assert_eq!(
    ///     MappingLine::classify("com.example.Foo -> a"),
    ///     MappingLine::Unrecognized(Reason::MalformedClass)
    /// );
    /// ```
    pub fn classify(line: &'s str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            MappingLine::Blank
        } else if trimmed.starts_with('#') {
            MappingLine::Comment(trimmed)
        } else if line.starts_with(char::is_whitespace) {
            parse_member(trimmed)
        } else {
            parse_class(trimmed).unwrap_or(MappingLine::Unrecognized(Reason::MalformedClass))
        }
    }

    /// Whether this line declares a field or method.
    pub fn is_member(&self) -> bool {
        matches!(self, MappingLine::Field { .. } | MappingLine::Method { .. })
    }

    /// Whether this line carries no mapping information at all.
    pub fn is_ignored(&self) -> bool {
        matches!(self, MappingLine::Blank | MappingLine::Comment(_))
    }
}

/// A mapping file, as text.
#[derive(Clone, Copy, Default)]
pub struct MappingSource<'s> {
    source: &'s str,
}

impl fmt::Debug for MappingSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingSource").finish()
    }
}

impl<'s> MappingSource<'s> {
    /// Wraps the contents of a mapping file.
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Iterates over all lines of the file together with their classification.
    pub fn iter(&self) -> MappingLineIter<'s> {
        MappingLineIter {
            lines: self.source.lines().enumerate(),
        }
    }
}

/// A classified line along with its position in the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberedLine<'s> {
    /// The 1-based line number.
    pub number: usize,
    /// The raw line.
    pub raw: &'s str,
    /// What the line was classified as.
    pub line: MappingLine<'s>,
}

/// An iterator over [`NumberedLine`]s, created by [`MappingSource::iter`].
#[derive(Clone)]
pub struct MappingLineIter<'s> {
    lines: std::iter::Enumerate<std::str::Lines<'s>>,
}

impl fmt::Debug for MappingLineIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingLineIter").finish()
    }
}

impl<'s> Iterator for MappingLineIter<'s> {
    type Item = NumberedLine<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, raw) = self.lines.next()?;
        Some(NumberedLine {
            number: idx + 1,
            raw,
            line: MappingLine::classify(raw),
        })
    }
}

/// Parses `originalclassname -> obfuscatedclassname:`.
fn parse_class(line: &str) -> Option<MappingLine<'_>> {
    let line = line.strip_suffix(':')?;
    let (original, obfuscated) = line.split_once("->")?;
    let original = single_token(original)?;
    let obfuscated = single_token(obfuscated)?;

    Some(MappingLine::Class {
        original,
        obfuscated,
    })
}

/// Parses a field or method line, with the indentation already removed.
fn parse_member(line: &str) -> MappingLine<'_> {
    let line = strip_line_range(line);
    let declaration = line.split_once("->").map_or(line, |(declaration, _)| declaration);
    let is_method = declaration.contains('(');

    let parsed = if is_method {
        parse_method(line)
    } else {
        parse_field(line)
    };

    parsed.unwrap_or(MappingLine::Unrecognized(if is_method {
        Reason::MalformedMethod
    } else {
        Reason::MalformedField
    }))
}

/// `originalfieldtype originalfieldname -> obfuscatedfieldname`
fn parse_field(line: &str) -> Option<MappingLine<'_>> {
    let (declaration, obfuscated) = line.split_once("->")?;
    let obfuscated = single_token(obfuscated)?;

    let (ty, original) = type_and_name(declaration)?;
    if !is_java_type(ty) {
        return None;
    }

    Some(MappingLine::Field {
        ty,
        original,
        obfuscated,
    })
}

/// `originalreturntype [originalclassname.]originalmethodname(originalargumenttype,...)[:originalstartline[:originalendline]] -> obfuscatedmethodname`
fn parse_method(line: &str) -> Option<MappingLine<'_>> {
    let (declaration, obfuscated) = line.split_once("->")?;
    let obfuscated = single_token(obfuscated)?;

    let (head, rest) = declaration.split_once('(')?;
    let (arguments, rest) = rest.split_once(')')?;
    if !arguments.chars().all(is_type_char) || !is_original_line_suffix(rest.trim()) {
        return None;
    }

    let (ty, original) = type_and_name(head)?;
    if !is_java_type(ty) || original.starts_with('.') || original.ends_with('.') {
        return None;
    }

    Some(MappingLine::Method {
        ty,
        original,
        arguments: arguments.trim(),
        obfuscated,
    })
}

/// Strips up to two leading `<digits>:` groups.
fn strip_line_range(line: &str) -> &str {
    let mut line = line;
    for _ in 0..2 {
        match parse_usize_prefix(line) {
            Some(rest) => match rest.strip_prefix(':') {
                Some(rest) => line = rest,
                None => break,
            },
            None => break,
        }
    }
    line
}

/// Returns whatever follows a non-empty run of ASCII digits.
fn parse_usize_prefix(s: &str) -> Option<&str> {
    let rest = s.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == s.len() {
        None
    } else {
        Some(rest)
    }
}

/// Matches the R8 `:<original start>[:<original end>]` suffix or nothing.
fn is_original_line_suffix(s: &str) -> bool {
    let mut s = s;
    for _ in 0..2 {
        if s.is_empty() {
            return true;
        }
        let Some(rest) = s.strip_prefix(':').and_then(parse_usize_prefix) else {
            return false;
        };
        s = rest;
    }
    s.is_empty()
}

/// Whether `c` can be part of a source type, generic arguments included.
fn is_type_char(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '_' | '$' | '.' | '[' | ']' | '<' | '>' | ',' | '?' | '&')
}

/// Rejects type tokens the descriptor resolver would turn into garbage, like
/// the `3:int` left over from a line with three numeric prefixes.
fn is_java_type(ty: &str) -> bool {
    ty.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$')
        && ty.chars().all(is_type_char)
}

/// Splits a declaration into exactly two tokens, a type and a name.
fn type_and_name(s: &str) -> Option<(&str, &str)> {
    let tokens = split_tokens(s);
    match tokens[..] {
        [ty, name] => Some((ty, name)),
        _ => None,
    }
}

/// Splits on whitespace that is not nested inside generic arguments.
fn split_tokens(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (idx, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&s[begin..idx]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        tokens.push(&s[begin..]);
    }

    tokens
}

fn single_token(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() || s.contains(char::is_whitespace) {
        None
    } else {
        Some(s)
    }
}
