//! End-to-end tests for the `cljfmt` binary

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn cljfmt() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cljfmt"))
}

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cljfmt-e2e-{label}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_stdin_to_stdout() {
    let dir = scratch_dir("stdin");
    let mut command = cljfmt();
    command.current_dir(&dir);
    let output = run_with_stdin(command, "(when x\ny)\n");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "(when x\n  y)\n");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_single_file_prints_without_writing() {
    let dir = scratch_dir("single");
    let file = dir.join("core.clj");
    fs::write(&file, "(defn f [x]\n(inc x))\n").unwrap();

    let output = cljfmt().current_dir(&dir).arg(&file).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "(defn f [x]\n  (inc x))\n");
    assert_eq!(fs::read_to_string(&file).unwrap(), "(defn f [x]\n(inc x))\n");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_multiple_files_need_a_batch_flag() {
    let output = cljfmt().args(["a.clj", "b.clj"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("must provide a single file"));
}

#[test]
fn test_list_and_write() {
    let dir = scratch_dir("list-write");
    let messy = dir.join("messy.clj");
    let clean = dir.join("clean.cljs");
    fs::write(&messy, "(let [a 1\nb 2]\na)\n").unwrap();
    fs::write(&clean, "(let [a 1\n      b 2]\n  a)\n").unwrap();

    let output = cljfmt().current_dir(&dir).args(["-l", "."]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let listed = String::from_utf8(output.stdout).unwrap();
    assert!(listed.contains("messy.clj"));
    assert!(!listed.contains("clean.cljs"));

    let output = cljfmt().current_dir(&dir).args(["-w", "."]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&messy).unwrap(), "(let [a 1\n      b 2]\n  a)\n");

    let output = cljfmt().current_dir(&dir).args(["-l", "."]).output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_diff_output() {
    let dir = scratch_dir("diff");
    let file = dir.join("core.clj");
    fs::write(&file, "(when x\ny)\n").unwrap();

    let output = cljfmt().current_dir(&dir).arg("--diff").arg("core.clj").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "--- core.clj\n-   2 | y)\n+   2 |   y)\n\n"
    );
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_dot_config_in_working_directory() {
    let dir = scratch_dir("dotconfig");
    fs::write(dir.join(".cljfmt"), r#"{:indent-overrides ["block" :list-body]}"#).unwrap();

    let mut command = cljfmt();
    command.current_dir(&dir);
    let output = run_with_stdin(command, "(block x\ny)\n");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "(block x\n  y)\n");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_transform_and_indent_char_flags() {
    let dir = scratch_dir("flags");
    let mut command = cljfmt();
    command
        .current_dir(&dir)
        .args(["--transform", "remove-trailing-newlines", "--indent-char", "\t"]);
    let output = run_with_stdin(command, "(defn f []\nx\n)\n");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "(defn f []\n\t\tx)\n");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_syntax_error_is_reported() {
    let dir = scratch_dir("syntax");
    let mut command = cljfmt();
    command.current_dir(&dir);
    let output = run_with_stdin(command, "(defn f [");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("unexpected EOF"));
    fs::remove_dir_all(&dir).unwrap();
}
