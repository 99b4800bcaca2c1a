//! Records of mapping lines that were dropped while transcoding.

use std::fmt;

use serde::Serialize;

/// Why a mapping line was dropped.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// An unindented line that is not `original -> obfuscated:`.
    MalformedClass,
    /// An indented line without parentheses that is not a valid field.
    MalformedField,
    /// An indented line with parentheses that is not a valid method.
    MalformedMethod,
    /// A member line with no valid enclosing class.
    MemberOutsideClass,
}

impl Reason {
    /// A short human readable description.
    pub fn description(self) -> &'static str {
        match self {
            Reason::MalformedClass => "malformed class line",
            Reason::MalformedField => "malformed field line",
            Reason::MalformedMethod => "malformed method line",
            Reason::MemberOutsideClass => "member line outside class",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A dropped line together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The version label of the mapping file.
    pub version: String,
    /// The 1-based line number.
    pub line_number: usize,
    /// The raw line, without its line terminator.
    pub raw: String,
    /// Why the line was dropped.
    pub reason: Reason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] line {}: {}: {:?}",
            self.version, self.line_number, self.reason, self.raw
        )
    }
}
