use std::path::PathBuf;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn loxwalk(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loxwalk"))
        .args(args)
        .output()
        .expect("binary runs")
}

fn script(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("loxwalk-cli-{}-{}.lox", std::process::id(), name));
    std::fs::write(&path, source).unwrap();
    path
}

#[test]
fn run_prints_and_exits_zero() {
    let path = script("ok", "print 1 + 2;");
    let output = loxwalk(&["run", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
}

#[test]
fn static_and_runtime_errors_have_distinct_codes() {
    let path = script("static", "print ;");
    let output = loxwalk(&["run", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();
    assert_eq!(output.status.code(), Some(65));

    let path = script("runtime", "print -nil;");
    let output = loxwalk(&["run", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();
    assert_eq!(output.status.code(), Some(70));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Operand must be a number.\n[line 1]\n"));
}

#[test]
fn unreadable_file_exits_with_io_code() {
    for command in ["run", "tokenize", "parse", "evaluate"] {
        let output = loxwalk(&[command, "/definitely/not/here.lox"]);

        assert_eq!(output.status.code(), Some(74), "{command}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Failed to read file"));
    }
}

#[test]
fn bad_command_line_exits_with_usage_code() {
    assert_eq!(loxwalk(&["bogus"]).status.code(), Some(64));
    assert_eq!(loxwalk(&["run"]).status.code(), Some(64));
}

#[test]
fn help_is_not_a_usage_error() {
    let output = loxwalk(&["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("tokenize"));
}
