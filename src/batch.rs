//! Runs the [`Transcoder`] over many versions and writes the results.
//!
//! Versions are independent of each other: a missing mapping file skips the
//! version, and a failure while writing only fails that version. Output files
//! are written to a `.tmp` sibling first and then renamed onto the final
//! path, so a destination is either left untouched or completely written.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::VersionJob;
use crate::diagnostics::Diagnostic;
use crate::error::{VersionError, VersionErrorKind};
use crate::tiny;
use crate::transcoder::Transcoder;

/// What happened to a single version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VersionOutcome {
    /// The output file was written.
    Written {
        /// Path of the output file.
        path: PathBuf,
        /// Number of classes written.
        classes: usize,
        /// Number of fields and methods written.
        members: usize,
        /// The UUID of the mapping file the output was generated from.
        #[cfg(feature = "uuid")]
        mapping_uuid: uuid::Uuid,
    },
    /// The mapping file does not exist.
    Skipped {
        /// Path of the missing mapping file.
        input: PathBuf,
    },
    /// Reading or writing failed, the destination was left untouched.
    Failed {
        /// The error, with its causes.
        error: String,
    },
}

/// The result of running a single [`VersionJob`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    /// The version label.
    pub version: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: VersionOutcome,
    /// Lines that were dropped while transcoding.
    pub diagnostics: Vec<Diagnostic>,
}

impl VersionReport {
    /// Whether the version failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, VersionOutcome::Failed { .. })
    }
}

/// The results of a whole batch, ordered by version label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One report per version.
    pub versions: Vec<VersionReport>,
}

impl BatchReport {
    /// `true` unless some version failed. Skipped versions are not failures.
    pub fn is_success(&self) -> bool {
        !self.versions.iter().any(VersionReport::is_failed)
    }

    /// Number of versions that were written.
    pub fn written(&self) -> usize {
        self.count(|outcome| matches!(outcome, VersionOutcome::Written { .. }))
    }

    /// Number of versions that were skipped.
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, VersionOutcome::Skipped { .. }))
    }

    /// Number of versions that failed.
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, VersionOutcome::Failed { .. }))
    }

    /// Total number of dropped lines across all versions.
    pub fn dropped_lines(&self) -> usize {
        self.versions.iter().map(|v| v.diagnostics.len()).sum()
    }

    fn count(&self, predicate: impl Fn(&VersionOutcome) -> bool) -> usize {
        self.versions
            .iter()
            .filter(|version| predicate(&version.outcome))
            .count()
    }
}

/// Processes a set of [`VersionJob`]s.
#[derive(Clone, Debug)]
pub struct BatchRunner {
    jobs: usize,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    /// Creates a runner that handles one version at a time.
    pub fn new() -> Self {
        Self { jobs: 1 }
    }

    /// Processes up to `jobs` versions concurrently.
    pub fn with_jobs(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    /// Runs all jobs. Failures of one version never stop the others.
    pub fn run(&self, jobs: &[VersionJob]) -> BatchReport {
        let mut versions: Vec<VersionReport> = if self.jobs > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
                Ok(pool) => pool.install(|| jobs.par_iter().map(run_version).collect()),
                Err(err) => {
                    warn!(
                        "could not start {} workers, running sequentially: {}",
                        self.jobs, err
                    );
                    jobs.iter().map(run_version).collect()
                }
            }
        } else {
            jobs.iter().map(run_version).collect()
        };

        versions.sort_by(|a, b| a.version.cmp(&b.version));
        BatchReport { versions }
    }
}

/// Transcodes and writes a single version.
pub fn run_version(job: &VersionJob) -> VersionReport {
    if !job.input.exists() {
        info!("[SKIP] {} - no {}", job.version, job.input.display());
        return VersionReport {
            version: job.version.clone(),
            outcome: VersionOutcome::Skipped {
                input: job.input.clone(),
            },
            diagnostics: Vec::new(),
        };
    }

    let text = match read_mapping(&job.input) {
        Ok(text) => text,
        Err(err) => return failed_report(job, err, Vec::new()),
    };

    let transcoded = Transcoder::new(job.version.as_str()).transcode(&text);
    let document = &transcoded.document;

    // dropped lines are reported even if the output can't be written
    if let Err(err) = write_atomic(&job.output, |writer| {
        tiny::write_document(document, writer).map(|_| ())
    }) {
        return failed_report(job, err, transcoded.diagnostics);
    }

    info!("[DONE] {} -> {}", job.version, job.output.display());
    VersionReport {
        version: job.version.clone(),
        outcome: VersionOutcome::Written {
            path: job.output.clone(),
            classes: document.classes.len(),
            members: document.member_count(),
            #[cfg(feature = "uuid")]
            mapping_uuid: crate::mapping_uuid(text.as_bytes()),
        },
        diagnostics: transcoded.diagnostics,
    }
}

fn failed_report(
    job: &VersionJob,
    err: VersionError,
    diagnostics: Vec<Diagnostic>,
) -> VersionReport {
    let error = err.chain();
    error!("[FAIL] {} - {}", job.version, error);
    VersionReport {
        version: job.version.clone(),
        outcome: VersionOutcome::Failed { error },
        diagnostics,
    }
}

fn read_mapping(input: &Path) -> Result<String, VersionError> {
    let source =
        fs::read(input).map_err(|err| VersionError::new(VersionErrorKind::ReadInput, input, err))?;
    String::from_utf8(source).map_err(|err| {
        let err = io::Error::new(io::ErrorKind::InvalidData, err);
        VersionError::new(VersionErrorKind::ReadInput, input, err)
    })
}

/// The sibling file `path` is written to before it is renamed into place.
pub fn temporary_path(path: &Path) -> Option<PathBuf> {
    let mut name = OsString::from(path.file_name()?);
    name.push(".tmp");
    Some(path.with_file_name(name))
}

/// Writes `path` through a temporary sibling file.
///
/// `write` receives a buffered writer for the temporary file. Only if it and
/// syncing the file succeed is the file renamed onto `path`. On any error the
/// temporary file is removed and `path` is left as it was.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), VersionError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let temp = temporary_path(path)
        .ok_or_else(|| VersionError::from((VersionErrorKind::WriteTemporary, path.to_owned())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| VersionError::new(VersionErrorKind::CreateOutputDir, parent, err))?;
    }

    let result = write_temporary(&temp, write)
        .map_err(|err| VersionError::new(VersionErrorKind::WriteTemporary, &temp, err))
        .and_then(|()| {
            fs::rename(&temp, path)
                .map_err(|err| VersionError::new(VersionErrorKind::Replace, path, err))
        });

    if result.is_err() {
        // the file may not even exist if creating it failed
        let _ = fs::remove_file(&temp);
    }
    result
}

fn write_temporary<F>(temp: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(temp)?);
    write(&mut writer)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()
}
