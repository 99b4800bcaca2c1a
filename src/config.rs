//! Where mapping files are read from and generated files are written to.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default directory holding one subdirectory per version.
pub const DEFAULT_VERSIONS_DIR: &str = "server-jars/versions";
/// Default directory the per-version outputs are written into.
pub const DEFAULT_OUTPUT_DIR: &str = "mappings";
/// Default name of the mapping file inside a version directory.
pub const DEFAULT_INPUT_NAME: &str = "mojang-mappings.txt";
/// Default name of the generated file inside an output version directory.
pub const DEFAULT_OUTPUT_NAME: &str = "intermediary.tiny";

/// Settings of a batch run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchConfig {
    /// Directory containing one subdirectory per version.
    pub versions_dir: PathBuf,
    /// Directory the generated files are written to, one subdirectory per version.
    pub output_dir: PathBuf,
    /// File name of the mapping inside each version directory.
    pub input_name: String,
    /// File name of the generated mapping inside each output directory.
    pub output_name: String,
    /// Number of versions processed at the same time.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            versions_dir: DEFAULT_VERSIONS_DIR.into(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            input_name: DEFAULT_INPUT_NAME.into(),
            output_name: DEFAULT_OUTPUT_NAME.into(),
            jobs: 1,
        }
    }
}

impl BatchConfig {
    /// The job for a single version.
    pub fn job(&self, version: &str) -> VersionJob {
        VersionJob {
            version: version.to_owned(),
            input: self.versions_dir.join(version).join(&self.input_name),
            output: self.output_dir.join(version).join(&self.output_name),
        }
    }

    /// Lists every subdirectory of [`versions_dir`](Self::versions_dir) as a
    /// job, sorted by version label.
    ///
    /// Whether the mapping file actually exists is only checked when the job
    /// runs.
    pub fn discover(&self) -> io::Result<Vec<VersionJob>> {
        let mut jobs = Vec::new();
        for entry in fs::read_dir(&self.versions_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(version) = entry.file_name().to_str() {
                jobs.push(self.job(version));
            }
        }
        jobs.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(jobs)
    }
}

/// One version to transcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionJob {
    /// The version label.
    pub version: String,
    /// Path of the mapping file.
    pub input: PathBuf,
    /// Path of the generated file.
    pub output: PathBuf,
}

impl VersionJob {
    /// Creates a job from explicit paths.
    pub fn new(
        version: impl Into<String>,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Self {
        Self {
            version: version.into(),
            input: input.as_ref().to_owned(),
            output: output.as_ref().to_owned(),
        }
    }
}
