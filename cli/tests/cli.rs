use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;

/// Runs the binary with its settings and log file kept inside `dir`.
fn keypanel(dir: &Path, args: &[&str]) -> Output {
    let settings = dir.join("settings.kdl");
    fs::write(&settings, "serial {\n    port \"/nonexistent/keypanel-tty\"\n}\n").unwrap();
    Command::new(env!("CARGO_BIN_EXE_keypanel"))
        .args(args)
        .arg("--config")
        .arg(&settings)
        .arg("--log-file")
        .arg(dir.join("log.txt"))
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn read_without_keymap_fails() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("missing.csv");
    let output = keypanel(dir.path(), &["read", "--map-file", map.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: keymap file not found"), "{err}");
    assert!(!err.contains("panicked"), "{err}");
}

#[test]
fn read_without_port_fails() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("keymap.csv");
    fs::write(&map, "Row,Col,Normal,Shifted\n1,1,F1,\n").unwrap();
    let output = keypanel(dir.path(), &["read", "--map-file", map.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("failed to open serial port /nonexistent/keypanel-tty"), "{err}");
}

#[test]
fn map_without_port_fails_and_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("keymap.csv");
    let output = keypanel(dir.path(), &["map", "--map-file", map.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to open serial port"));
    assert!(!map.exists());
}
