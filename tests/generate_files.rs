//! Generate and filter modes against the bundled SQLite engine.

mod common;

use common::{log_lines, runner, write_test_file};
use logictest::{LogOptions, RewriteMode, RunSummary, SqliteHarness};

fn sqlite_runner() -> logictest::Runner<SqliteHarness, Vec<u8>> {
    runner(SqliteHarness::new().unwrap(), LogOptions::default())
}

#[test]
fn test_generate_is_idempotent_when_results_match() {
    let source = "\
# leading comment
hash-threshold 8

statement ok
CREATE TABLE t1(a INTEGER, b TEXT)

statement ok
INSERT INTO t1 VALUES(1, 'x'), (2, ''), (3, NULL), (4, 'y')

query IT rowsort label-1
SELECT a, b FROM t1 WHERE a < 3
----
1
x
2
(empty)

query I valuesort
SELECT a FROM t1
----
1
2
3
4

query R
SELECT 1.0 / 4
----
0.250

query I
SELECT a FROM t1 WHERE a > 10

# trailing comment
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/select1.test", source);

    let mut runner = sqlite_runner();
    let written = runner.generate_test_files(&[&file]).unwrap();
    assert_eq!(written, vec![dir.path().join("test/select1.test.generated")]);
    assert_eq!(fs_err::read_to_string(&written[0]).unwrap(), source);

    // generate also logs like verify
    let (_, log) = runner.into_parts();
    let lines = log_lines(&log);
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().all(|line| line.ends_with(" ok")));
}

#[test]
fn test_generate_replaces_stale_results() {
    let source = "\
statement ok
CREATE TABLE t1(a INTEGER)

statement ok
INSERT INTO t1 VALUES(1), (2), (3), (4)

query T
SELECT a FROM t1 WHERE a > 2
----
9

query I
SELECT a FROM t1 WHERE a > 10
----
1
2
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/stale.test", source);
    // an earlier copy is always overwritten
    write_test_file(dir.path(), "test/stale.test.generated", "old\n");

    let generated = sqlite_runner()
        .rewrite_test_file(&file, RewriteMode::Generate)
        .unwrap();
    let text = fs_err::read_to_string(&generated).unwrap();
    assert_eq!(
        text,
        "\
statement ok
CREATE TABLE t1(a INTEGER)

statement ok
INSERT INTO t1 VALUES(1), (2), (3), (4)

query I
SELECT a FROM t1 WHERE a > 2
----
3
4

query I
SELECT a FROM t1 WHERE a > 10
----
"
    );

    // the generated file verifies cleanly
    let summary = sqlite_runner().run_test_file(&generated).unwrap();
    assert_eq!(
        summary,
        RunSummary {
            ok: 4,
            not_ok: 0,
            skipped: 0
        }
    );
}

#[test]
fn test_generate_hashes_above_threshold() {
    let source = "\
hash-threshold 3

statement ok
CREATE TABLE t1(a INTEGER)

statement ok
INSERT INTO t1 VALUES(4), (2), (3), (1)

query I rowsort
SELECT a FROM t1
----

query I rowsort
SELECT a FROM t1 WHERE a < 4
----
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/hash.test", source);

    let written = sqlite_runner().generate_test_files(&[&file]).unwrap();
    let text = fs_err::read_to_string(&written[0]).unwrap();
    // md5("1\n2\n3\n4\n")
    assert!(text.contains(
        "query I rowsort\nSELECT a FROM t1\n----\n4 values hashing to 302c28003d487124d97c242de94da856\n\n"
    ));
    assert!(text.ends_with("query I rowsort\nSELECT a FROM t1 WHERE a < 4\n----\n1\n2\n3\n"));

    let summary = sqlite_runner().run_test_file(&written[0]).unwrap();
    assert_eq!(summary.ok, 4);
    assert_eq!(summary.not_ok, 0);
}

#[test]
fn test_filter_removes_failed_records() {
    let source = "\
statement ok
CREATE TABLE t1(a INTEGER)

statement ok
CREATE TABLE t1(a INTEGER)

onlyif sqlite
statement ok
INSERT INTO nowhere VALUES(1)

statement error
INSERT INTO t1 VALUES(1)

query I
SELECT b FROM t1
----
1

query I
SELECT a FROM t1
----
7
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/fuzzed.test", source);

    let written = sqlite_runner().filter_test_files(&[&file]).unwrap();
    assert_eq!(
        fs_err::read_to_string(&written[0]).unwrap(),
        "statement ok\nCREATE TABLE t1(a INTEGER)\n\nquery I\nSELECT a FROM t1\n----\n1\n"
    );
}

#[test]
fn test_halt_leaves_rest_of_file_untouched() {
    let source = "\
statement ok
CREATE TABLE t1(a INTEGER)

halt

query I
SELECT a FROM t1
----
42
";
    let dir = tempfile::tempdir().unwrap();
    let file = write_test_file(dir.path(), "test/halt.test", source);

    let mut runner = sqlite_runner();
    let summary = runner.run_test_file(&file).unwrap();
    assert_eq!(summary.total(), 1);

    let written = runner.generate_test_files(&[&file]).unwrap();
    assert_eq!(fs_err::read_to_string(&written[0]).unwrap(), source);

    let (_, log) = runner.into_parts();
    assert_eq!(log_lines(&log).len(), 2);
}
