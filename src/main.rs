use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use intermediary::{
    BatchConfig, BatchReport, BatchRunner, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_DIR,
    DEFAULT_OUTPUT_NAME, DEFAULT_VERSIONS_DIR,
};
use log::{info, LevelFilter};

/// Generates hashed intermediary mappings for every version directory.
#[derive(Debug, Parser)]
struct Cli {
    /// Be verbose.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Directory containing one subdirectory per version.
    #[arg(long, default_value = DEFAULT_VERSIONS_DIR)]
    versions_dir: PathBuf,

    /// Directory the generated mappings are written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Name of the mapping file inside each version directory.
    #[arg(long, default_value = DEFAULT_INPUT_NAME)]
    input_name: String,

    /// Name of the generated file inside each output directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Number of versions to process at the same time.
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Write a JSON report of the run to this file.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> BatchConfig {
        BatchConfig {
            versions_dir: self.versions_dir.clone(),
            output_dir: self.output_dir.clone(),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
            jobs: self.jobs,
        }
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{:<5} {}", record.level(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("failed to install logger")
}

fn run(cli: &Cli) -> Result<BatchReport> {
    let config = cli.config();
    let jobs = config
        .discover()
        .with_context(|| format!("failed to list versions in {:?}", config.versions_dir))?;

    let report = BatchRunner::with_jobs(config.jobs).run(&jobs);

    info!(
        "{} written, {} skipped, {} failed, {} lines dropped",
        report.written(),
        report.skipped(),
        report.failed(),
        report.dropped_lines()
    );

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("failed to write report to {path:?}"))?;
    }

    Ok(report)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let report = run(&cli)?;
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
