use assert_cmd::Command;
use tempfile::tempdir;

#[test]
fn missing_path_prints_usage_and_succeeds() {
    let dir = tempdir().unwrap();

    let assert = Command::cargo_bin("tapmark")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(
        stdout,
        "Please enter a file to write to as a command line arg.\n\
         -s to save as seconds, -b to save as 'MM:SS,seconds' (csv)\n"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn non_tty_stdin_is_refused_before_creating_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("marks.csv");

    let assert = Command::cargo_bin("tapmark")
        .unwrap()
        .arg(&path)
        .write_stdin("10\n")
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("stdin must be a tty"), "{stderr}");
    assert!(!path.exists());
}

#[test]
fn leading_mode_flag_prints_usage_without_creating_files() {
    let dir = tempdir().unwrap();

    let assert = Command::cargo_bin("tapmark")
        .unwrap()
        .current_dir(dir.path())
        .arg("-s")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("Please enter a file to write to"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn help_after_path_still_runs_a_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("marks.csv");

    // reaches the tty check instead of printing help
    let assert = Command::cargo_bin("tapmark")
        .unwrap()
        .arg(&path)
        .arg("--help")
        .write_stdin("10\n")
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("stdin must be a tty"), "{stderr}");
}
