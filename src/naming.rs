//! Stable intermediary names.
//!
//! An intermediary name is derived from a SHA-1 digest over the identity of a
//! symbol (its named class, member name and descriptor) and therefore does not
//! change as long as that identity stays the same.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

/// Number of hex characters of the digest kept in a generated name.
pub const HASH_LEN: usize = 8;

/// The kind of symbol an intermediary name is generated for.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum NameKind {
    /// A class, prefixed with `class_`.
    Class,
    /// A field, prefixed with `field_`.
    Field,
    /// A method, prefixed with `method_`.
    Method,
}

impl NameKind {
    /// The prefix used for names of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            NameKind::Class => "class",
            NameKind::Field => "field",
            NameKind::Method => "method",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Error returned when parsing an unknown [`NameKind`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown name kind `{0}`")]
pub struct UnknownNameKind(String);

impl FromStr for NameKind {
    type Err = UnknownNameKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(NameKind::Class),
            "field" => Ok(NameKind::Field),
            "method" => Ok(NameKind::Method),
            _ => Err(UnknownNameKind(s.to_owned())),
        }
    }
}

/// Something that turns the identity of a symbol into an intermediary name.
///
/// Implementations must be pure: the same `kind` and `parts` always produce
/// the same name.
pub trait NameGenerator {
    /// Generates the name for a symbol identified by `parts`, in order.
    fn generate(&self, kind: NameKind, parts: &[&str]) -> String;
}

/// The default [`NameGenerator`], see [`generate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha1Names;

impl NameGenerator for Sha1Names {
    fn generate(&self, kind: NameKind, parts: &[&str]) -> String {
        generate(kind, parts)
    }
}

/// Generates an intermediary name like `method_1a2b3c4d`.
///
/// Every part is trimmed, then all parts are concatenated without separator
/// and hashed with SHA-1. The first eight hex digits form the name.
///
/// # Examples
///
/// ```
/// use intermediary::{generate, NameKind};
///
/// let name = generate(NameKind::Class, &["com.example.Foo"]);
/// assert!(name.starts_with("class_"));
/// assert_eq!(name.len(), "class_".len() + 8);
/// assert_eq!(name, generate(NameKind::Class, &[" com.example.Foo "]));
/// ```
pub fn generate(kind: NameKind, parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.trim().as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());

    format!("{}_{}", kind.prefix(), &digest[..HASH_LEN])
}
