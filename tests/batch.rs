use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use intermediary::{
    temporary_path, tiny, BatchConfig, BatchRunner, Reason, VersionJob, VersionOutcome,
};

static MAPPING_BASIC: &[u8] = include_bytes!("res/mapping-basic.txt");
static MAPPING_MALFORMED: &[u8] = include_bytes!("res/mapping-malformed.txt");

fn setup_versions(root: &Path, versions: &[(&str, Option<&[u8]>)]) -> BatchConfig {
    let config = BatchConfig {
        versions_dir: root.join("versions"),
        output_dir: root.join("mappings"),
        ..Default::default()
    };
    for (version, mapping) in versions {
        let dir = config.versions_dir.join(version);
        fs::create_dir_all(&dir).unwrap();
        if let Some(mapping) = mapping {
            fs::write(dir.join(&config.input_name), mapping).unwrap();
        }
    }
    config
}

#[test]
fn test_batch_writes_all_versions() {
    let temp = tempfile::tempdir().unwrap();
    let config = setup_versions(
        temp.path(),
        &[("1.0", Some(MAPPING_BASIC)), ("1.1", Some(MAPPING_MALFORMED))],
    );

    let jobs = config.discover().unwrap();
    let report = BatchRunner::new().run(&jobs);

    assert!(report.is_success());
    assert_eq!(report.written(), 2);
    assert_eq!(report.dropped_lines(), 9);

    let output = fs::read_to_string(config.job("1.0").output).unwrap();
    assert!(output.starts_with(tiny::HEADER));
    assert_eq!(output.lines().count(), 24);

    match &report.versions[0].outcome {
        VersionOutcome::Written {
            path,
            classes,
            members,
            ..
        } => {
            assert_eq!(path, &config.job("1.0").output);
            assert_eq!(*classes, 4);
            assert_eq!(*members, 19);
        }
        outcome => panic!("unexpected outcome {:?}", outcome),
    }

    let malformed = &report.versions[1];
    assert_eq!(malformed.version, "1.1");
    assert_eq!(malformed.diagnostics[0].reason, Reason::MemberOutsideClass);
    assert_eq!(malformed.diagnostics[0].version, "1.1");
}

#[test]
fn test_batch_skips_missing_input() {
    let temp = tempfile::tempdir().unwrap();
    let config = setup_versions(
        temp.path(),
        &[("1.0", None), ("1.1", Some(MAPPING_BASIC))],
    );

    let report = BatchRunner::new().run(&config.discover().unwrap());

    assert!(report.is_success());
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.written(), 1);
    assert_eq!(
        report.versions[0].outcome,
        VersionOutcome::Skipped {
            input: config.job("1.0").input,
        }
    );
    assert!(!config.job("1.0").output.exists());
}

#[test]
fn test_batch_continues_after_failure() {
    let temp = tempfile::tempdir().unwrap();
    let config = setup_versions(
        temp.path(),
        &[
            ("1.0", Some(MAPPING_BASIC)),
            ("1.1", Some(MAPPING_BASIC)),
            ("1.2", Some(MAPPING_BASIC)),
        ],
    );
    // the destination of 1.1 is occupied by a directory and can't be replaced
    let blocked = config.job("1.1").output;
    fs::create_dir_all(blocked.join("occupied")).unwrap();

    let report = BatchRunner::new().run(&config.discover().unwrap());

    assert!(!report.is_success());
    assert_eq!(report.written(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.versions[1].is_failed());
    match &report.versions[1].outcome {
        VersionOutcome::Failed { error } => {
            assert!(error.starts_with("could not replace destination file"))
        }
        outcome => panic!("unexpected outcome {:?}", outcome),
    }

    assert!(blocked.join("occupied").is_dir());
    assert!(!temporary_path(&blocked).unwrap().exists());
    assert!(config.job("1.2").output.is_file());
}

#[test]
fn test_failed_version_keeps_previous_output() {
    let temp = tempfile::tempdir().unwrap();
    let output_dir = temp.path().join("out");
    fs::create_dir_all(&output_dir).unwrap();
    let output = output_dir.join("intermediary.tiny");
    fs::write(&output, "previous\n").unwrap();

    // a mapping that is not valid utf-8 can't be read
    let input = temp.path().join("mapping.txt");
    fs::write(&input, b"com.example.Foo -> a:\n    int \xff -> a\n").unwrap();

    let job = VersionJob::new("bad", &input, &output);
    let report = BatchRunner::new().run(&[job]);

    assert_eq!(report.failed(), 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
    assert!(!temporary_path(&output).unwrap().exists());
}

#[test]
fn test_batch_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let config = setup_versions(temp.path(), &[("1.0", Some(MAPPING_BASIC))]);
    let jobs = config.discover().unwrap();
    let output = &jobs[0].output;

    BatchRunner::new().run(&jobs);
    let first = fs::read(output).unwrap();
    BatchRunner::new().run(&jobs);
    let second = fs::read(output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let temp = tempfile::tempdir().unwrap();
    let versions: Vec<_> = (0..8).map(|i| format!("1.{}", i)).collect();
    let entries: Vec<_> = versions
        .iter()
        .map(|version| (version.as_str(), Some(MAPPING_BASIC)))
        .collect();
    let config = setup_versions(temp.path(), &entries);
    let jobs = config.discover().unwrap();

    let sequential = BatchRunner::new().run(&jobs);
    let outputs: Vec<_> = jobs.iter().map(|job| fs::read(&job.output).unwrap()).collect();

    let parallel = BatchRunner::with_jobs(4).run(&jobs);
    let parallel_outputs: Vec<_> = jobs.iter().map(|job| fs::read(&job.output).unwrap()).collect();

    assert_eq!(sequential, parallel);
    assert_eq!(outputs, parallel_outputs);
    let labels: Vec<_> = parallel.versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(labels, versions);
}

#[test]
fn test_failed_version_keeps_diagnostics() {
    let temp = tempfile::tempdir().unwrap();
    let config = setup_versions(temp.path(), &[("1.0", Some(MAPPING_MALFORMED))]);
    fs::create_dir_all(config.job("1.0").output.join("occupied")).unwrap();

    let report = BatchRunner::new().run(&config.discover().unwrap());

    assert_eq!(report.failed(), 1);
    assert_eq!(report.dropped_lines(), 9);
    let reasons: Vec<_> = report.versions[0]
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.reason)
        .collect();
    assert_eq!(reasons[0], Reason::MemberOutsideClass);
    assert_eq!(reasons[1], Reason::MalformedField);
}
