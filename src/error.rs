use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// An error that stops a single version from being written.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {}", .path.display())]
pub struct VersionError {
    pub(crate) kind: VersionErrorKind,
    pub(crate) path: PathBuf,
    #[source]
    pub(crate) source: Option<io::Error>,
}

impl VersionError {
    pub(crate) fn new(kind: VersionErrorKind, path: &Path, source: io::Error) -> Self {
        Self {
            kind,
            path: path.to_owned(),
            source: Some(source),
        }
    }

    /// Returns the corresponding [`VersionErrorKind`] for this error.
    pub fn kind(&self) -> VersionErrorKind {
        self.kind
    }

    /// The file the failed operation was working on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full error chain, `: ` separated.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// The step at which writing a version failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VersionErrorKind {
    /// The mapping file could not be read.
    ReadInput,
    /// The output directory could not be created.
    CreateOutputDir,
    /// Writing the temporary file failed.
    WriteTemporary,
    /// Moving the temporary file onto the destination failed.
    Replace,
}

impl fmt::Display for VersionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionErrorKind::ReadInput => write!(f, "could not read mapping file"),
            VersionErrorKind::CreateOutputDir => write!(f, "could not create output directory"),
            VersionErrorKind::WriteTemporary => write!(f, "could not write temporary file"),
            VersionErrorKind::Replace => write!(f, "could not replace destination file"),
        }
    }
}

impl From<(VersionErrorKind, PathBuf)> for VersionError {
    fn from((kind, path): (VersionErrorKind, PathBuf)) -> Self {
        Self {
            kind,
            path,
            source: None,
        }
    }
}
