//! End-to-end tests of the backtodna binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "query.faa", ">q1\n-MK-V\n>q2\nMKV--\n");
    write(
        dir.path(),
        "LOC1.out",
        "s1,1,3,1,9,0/1,MKV,MKV,q1,40,100\n\
         s2,1,3,1,9,0/1,MKV,MKV,q1,60,100\n\
         s3,1,3,9,1,0/-1,MKV,MKV,q2,55,100\n",
    );
    // s3 is the reverse complement of ATGAAAGTT
    write(dir.path(), "LOC1.fa", ">s1\nATGAAGGTC\n>s2\nATGAAAGTT\n>s3\nAACTTTCAT\n");
    dir
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn backtodna() -> Command {
    Command::cargo_bin("backtodna").unwrap()
}

#[test]
fn test_alignment_to_stdout() {
    let dir = workspace();

    backtodna()
        .arg("--query")
        .arg(dir.path().join("query.faa"))
        .arg("--outdir")
        .arg(dir.path())
        .arg("--nolog")
        .assert()
        .success()
        .stdout(">q1|s2\n---ATGAAA---GTT\n>q2|s3\nATGAAAGTT------\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_alignment_to_file() {
    let dir = workspace();
    let output = dir.path().join("aligned.fna");

    backtodna()
        .args(["-q", "query.faa", "-d", ".", "-o", "aligned.fna"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(output).unwrap();
    assert_eq!(written, ">q1|s2\n---ATGAAA---GTT\n>q2|s3\nATGAAAGTT------\n");
}

#[test]
fn test_logs_go_to_stderr() {
    let dir = workspace();

    backtodna()
        .args(["-q", "query.faa"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(">q1|s2\n"))
        .stderr(predicate::str::contains("back-translation finished"));
}

#[test]
fn test_missing_query_flag_is_usage_error() {
    let dir = workspace();

    backtodna()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_missing_subject_is_fatal() {
    let dir = workspace();
    write(dir.path(), "LOC2.out", "s9,1,3,1,9,0/1,MKV,MKV,q2,10,100\n");
    write(dir.path(), "LOC2.fa", ">s1\nATGAAAGTT\n");

    backtodna()
        .args(["-q", "query.faa", "--nolog"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(">q1|s2"))
        .stderr(predicate::str::contains("Missing subject 's9'"));
}

#[test]
fn test_malformed_record_is_fatal() {
    let dir = workspace();
    write(dir.path(), "LOC0.out", "s1,1,3,1,9,0/1,MKV,MKV,q1,abc,100\n");

    backtodna()
        .args(["-q", "query.faa", "--nolog"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid bitscore 'abc'"));
}

#[test]
fn test_unknown_genetic_code() {
    let dir = workspace();

    backtodna()
        .args(["-q", "query.faa", "--nolog", "-g", "7"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown genetic code 7"));
}
