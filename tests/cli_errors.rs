use assert_fs::prelude::*;
use predicates::str::contains;

#[test]
fn missing_input_is_categorized() {
    let out = assert_fs::TempDir::new().unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("tokencook")
        .args(["-i", "/definitely/not/a/real/input", "-o"])
        .arg(out.path())
        .assert()
        .failure()
        .code(3)
        .stderr(contains("error [input]: input path does not exist"));
}

#[test]
fn chunk_size_zero_is_invalid() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("foo.txt").write_str("hello world").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("tokencook")
        .current_dir(&dir)
        .args(["-i", ".", "-o", "out", "--chunk-size", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error [config]"));
}

#[test]
fn unknown_encoding_is_invalid() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("foo.txt").write_str("hello world").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("tokencook")
        .current_dir(&dir)
        .args(["-i", ".", "-o", "out", "--encoding", "nope"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn invalid_exclude_pattern_errors() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("foo.txt").write_str("hello world").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("tokencook")
        .current_dir(&dir)
        .args(["-i", ".", "-o", "out", "--exclude", "["])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_required_args_is_usage_error() {
    assert_cmd::cargo::cargo_bin_cmd!("tokencook")
        .assert()
        .failure()
        .code(2);
}
