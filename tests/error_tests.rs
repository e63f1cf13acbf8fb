//! Error scenario integration tests
//!
//! Every case here fails before any container is started, so no Docker
//! daemon is needed.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn whisper_scribe_bin(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("whisper-scribe").expect("binary is built");
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir.join("config"))
        .env("HOME", workdir)
        .env_remove("WHISPER_SCRIBE_HOST")
        .env_remove("WHISPER_SCRIBE_PORT")
        .env_remove("WHISPER_SCRIBE_DOCKER")
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &Path, name: &str, size: usize) {
    fs::write(dir.join(name), vec![0u8; size]).unwrap();
}

/// True if any transcribe-* directory was created under `dir`
fn has_result_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .any(|e| e.file_name().to_string_lossy().starts_with("transcribe-"))
}

#[test]
fn missing_input_argument() {
    let dir = TempDir::new().unwrap();

    whisper_scribe_bin(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing input file"));

    assert!(!has_result_dir(dir.path()));
}

#[test]
fn input_file_not_found() {
    let dir = TempDir::new().unwrap();

    whisper_scribe_bin(dir.path())
        .arg("absent.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn input_is_a_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("folder.m4a")).unwrap();

    whisper_scribe_bin(dir.path())
        .arg("folder.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a regular file"));
}

#[test]
fn tiny_file_rejected_without_output_dirs() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "tiny.m4a", 5 * 1024);

    whisper_scribe_bin(dir.path())
        .arg("tiny.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too small"));

    assert!(!has_result_dir(dir.path()));
}

#[test]
fn file_at_size_limit_rejected() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "edge.m4a", 10_240);

    whisper_scribe_bin(dir.path())
        .arg("edge.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too small"));
}

#[test]
fn wrong_extension_rejected() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "song.mp3", 50 * 1024);

    whisper_scribe_bin(dir.path())
        .arg("song.mp3")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected a .m4a file"));

    assert!(!has_result_dir(dir.path()));
}

#[test]
fn unreachable_runtime_fails_before_conversion() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "sample.m4a", 50 * 1024);

    whisper_scribe_bin(dir.path())
        .args(["--docker", "/nonexistent/docker", "sample.m4a"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Docker is not available"));

    assert!(!has_result_dir(dir.path()));
}

#[test]
fn runtime_from_environment() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "sample.m4a", 50 * 1024);

    whisper_scribe_bin(dir.path())
        .env("WHISPER_SCRIBE_DOCKER", "/nonexistent/docker")
        .arg("sample.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/docker"));
}

#[test]
#[cfg(target_os = "linux")]
fn broken_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/whisper-scribe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "base_port = [").unwrap();
    write_file(dir.path(), "sample.m4a", 50 * 1024);

    whisper_scribe_bin(dir.path())
        .arg("sample.m4a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}
