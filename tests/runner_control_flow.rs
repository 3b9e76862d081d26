//! Runner behavior around conditions, halts, panics and file-level failures.

mod common;

use common::{log_lines, runner, write_test_file, ScriptedHarness};
use logictest::{LogOptions, RunSummary, TestError};

#[test]
fn test_panic_is_reported_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(
        dir.path(),
        "test/panic.test",
        "statement ok\nPANIC now\n\nstatement ok\nCREATE TABLE t1(a INTEGER)\n",
    );

    let mut runner = runner(ScriptedHarness::new("scripted"), LogOptions::default());
    let summary = runner.run_test_file(&file).unwrap();
    assert_eq!(summary.not_ok, 1);
    assert_eq!(summary.ok, 1);

    let (harness, log) = runner.into_parts();
    assert_eq!(harness.executed.len(), 2);
    assert_eq!(
        log_lines(&log),
        vec![
            "panic.test:1: PANIC now not ok: Caught panic: engine blew up while running PANIC now",
            "panic.test:4: CREATE TABLE t1(a INTEGER) ok",
        ]
    );
}

#[test]
fn test_halt_excluded_by_condition_still_stops_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(
        dir.path(),
        "test/halt.test",
        "onlyif mysql\nhalt\n\nstatement ok\nSELECT 1\n",
    );

    let mut runner = runner(ScriptedHarness::new("scripted"), LogOptions::default());
    let summary = runner.run_test_file(&file).unwrap();
    assert_eq!(summary, RunSummary::default());

    let (harness, log) = runner.into_parts();
    assert!(harness.executed.is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_excluded_records_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(
        dir.path(),
        "test/skip.test",
        "skipif scripted\nstatement ok\nFAIL hard\n\nonlyif scripted\nstatement ok\nSELECT 1\n",
    );

    let mut runner = runner(ScriptedHarness::new("scripted"), LogOptions::default());
    let summary = runner.run_test_file(&file).unwrap();
    assert_eq!(
        summary,
        RunSummary {
            ok: 1,
            not_ok: 0,
            skipped: 1
        }
    );

    let (harness, log) = runner.into_parts();
    assert_eq!(harness.executed, vec!["SELECT 1"]);
    assert_eq!(
        log_lines(&log),
        vec!["skip.test:2: FAIL hard skipped", "skip.test:6: SELECT 1 ok"]
    );
}

#[test]
fn test_query_checks() {
    let script = "\
query II
SELECT a, b FROM t1 WHERE 0
----

query IIIIIII
SELECT * FROM t2
----
1

query I
SELECT a FROM t3
----
1
2

query I
FAIL SELECT
----
1
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/query.test", script);
    let harness = ScriptedHarness::new("scripted")
        .with_query("SELECT a, b FROM t1 WHERE 0", "IR", &[])
        .with_query("SELECT * FROM t2", "IIRTIRT", &["1"])
        .with_query("SELECT a FROM t3", "I", &["1"]);

    let mut runner = runner(harness, LogOptions::default());
    let summary = runner.run_test_file(&file).unwrap();
    assert_eq!(summary.ok, 1);
    assert_eq!(summary.not_ok, 3);

    let (_, log) = runner.into_parts();
    assert_eq!(
        log_lines(&log),
        vec![
            "query.test:1: SELECT a, b FROM t1 WHERE 0 ok",
            "query.test:5: SELECT * FROM t2 not ok: Schemas differ. Expected IIIIIII, got IIRTIRT",
            "query.test:10: SELECT a FROM t3 not ok: Incorrect number of results. Expected 2, got 1",
            "query.test:16: FAIL SELECT not ok: Unexpected error refused FAIL SELECT",
        ]
    );
}

#[test]
fn test_init_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/a.test", "statement ok\nSELECT 1\n");

    let mut harness = ScriptedHarness::new("scripted");
    harness.fail_init = true;
    let mut runner = runner(harness, LogOptions::default());
    let err = runner.run_test_files(&[&file]).unwrap_err();
    assert!(matches!(err, TestError::HarnessInit { .. }));
    assert!(err.to_string().contains("a.test"));
    assert!(err.to_string().contains("cannot connect"));
}

#[test]
fn test_parse_error_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/bad.test", "statement ok\nSELECT 1\n\nloop i 0 10\n");

    let mut runner = runner(ScriptedHarness::new("scripted"), LogOptions::default());
    let err = runner.run_test_file(&file).unwrap_err();
    let parse_error = match err {
        TestError::Parse(e) => e,
        other => panic!("expected a parse error, got {other:?}"),
    };
    assert_eq!(parse_error.location().line(), 4);

    // nothing ran before the error was found
    let (harness, log) = runner.into_parts();
    assert!(harness.executed.is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_init_once_per_file() {
    let dir = tempfile::tempdir().unwrap();
    write_test_file(dir.path(), "test/a.test", "statement ok\nSELECT 1\n");
    write_test_file(dir.path(), "test/b.test", "statement ok\nSELECT 1\n");
    write_test_file(dir.path(), "test/notes.md", "not a test\n");

    let mut runner = runner(ScriptedHarness::new("scripted"), LogOptions::default());
    runner.run_test_files(&[dir.path()]).unwrap();
    assert_eq!(runner.harness().inits, 2);
}

#[test]
fn test_hash_threshold_override() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/h.test", "query I\nSELECT a FROM t\n----\n1\n2\n");
    let harness = ScriptedHarness::new("scripted").with_query("SELECT a FROM t", "I", &["1", "2"]);

    let mut runner = runner(harness, LogOptions::default()).with_hash_threshold(Some(1));
    let written = runner
        .rewrite_test_file(&file, logictest::RewriteMode::Generate)
        .unwrap();
    let text = fs_err::read_to_string(written).unwrap();
    assert!(text.starts_with("query I\nSELECT a FROM t\n----\n2 values hashing to "));
}
