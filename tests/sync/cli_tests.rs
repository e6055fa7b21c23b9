// Tests for the binary: argument handling, exit codes and signal shutdown

use crate::common::{put, Trees};
use std::fs;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn foldersync() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_foldersync"));
    command.stdout(Stdio::null()).stderr(Stdio::piped());
    command
}

fn args(trees: &Trees, log: &Path, interval: &str) -> Vec<String> {
    vec![
        trees.source.display().to_string(),
        trees.replica.display().to_string(),
        interval.to_string(),
        log.display().to_string(),
    ]
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(20));
    }
    None
}

#[test]
fn test_wrong_argument_count_exits_1_with_usage() {
    let output = foldersync().arg("only-one").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("usage"));
}

#[test]
fn test_help_exits_0() {
    let output = foldersync().arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_unparsable_interval_exits_1() {
    let trees = Trees::new();
    let log = trees.source.parent().unwrap().join("sync.log");

    let output = foldersync().args(args(&trees, &log, "soon")).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_source_exits_1() {
    let trees = Trees::new();
    let log = trees.source.parent().unwrap().join("sync.log");
    fs::remove_dir(&trees.source).unwrap();

    let output = foldersync().args(args(&trees, &log, "1")).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
    assert!(!trees.replica.exists());
}

#[test]
fn test_nested_roots_exit_1() {
    let trees = Trees::new();
    let log = trees.source.parent().unwrap().join("sync.log");
    put(&trees.source, "a.txt", b"a");
    let inner = trees.source.join("mirror");

    let output = foldersync()
        .arg(&trees.source)
        .arg(&inner)
        .arg("1")
        .arg(&log)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!inner.exists());
}

#[test]
fn test_once_mirrors_and_exits_0() {
    let trees = Trees::new();
    let log = trees.source.parent().unwrap().join("sync.log");
    put(&trees.source, "docs/a.txt", b"a");

    let output = foldersync().args(args(&trees, &log, "60")).arg("--once").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(fs::read(trees.replica.join("docs/a.txt")).unwrap(), b"a");

    let lines = fs::read_to_string(&log).unwrap();
    assert!(lines.contains(" - INFO - File copied: "));
    assert!(lines.contains("Sync process terminated."));
}

#[test]
fn test_once_with_failed_pass_exits_1() {
    let trees = Trees::new();
    let scratch = trees.source.parent().unwrap().to_path_buf();
    let log = scratch.join("sync.log");
    let blocker = scratch.join("blocker");
    fs::write(&blocker, b"file").unwrap();

    let output = foldersync()
        .arg(&trees.source)
        .arg(blocker.join("replica"))
        .arg("1")
        .arg(&log)
        .arg("--once")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(fs::read_to_string(&log).unwrap().contains(" - ERROR - Sync pass aborted"));
}

#[cfg(unix)]
#[test]
fn test_sigterm_stops_cleanly_with_exit_0() {
    let trees = Trees::new();
    let log = trees.source.parent().unwrap().join("sync.log");
    put(&trees.source, "a.txt", b"a");

    let mut child = foldersync()
        .stderr(Stdio::null())
        .args(args(&trees, &log, "3600"))
        .spawn()
        .unwrap();

    // The first pass has run once the file shows up in the replica
    let copied = trees.replica.join("a.txt");
    let deadline = Instant::now() + Duration::from_secs(10);
    while !copied.exists() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(copied.exists());

    let kill = Command::new("kill")
        .arg("-TERM")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(kill.success());

    let status = match wait_with_timeout(&mut child, Duration::from_secs(10)) {
        Some(status) => status,
        None => {
            let _ = child.kill();
            panic!("foldersync did not stop after SIGTERM");
        }
    };

    assert_eq!(status.code(), Some(0));
    let lines = fs::read_to_string(&log).unwrap();
    assert!(lines.contains("Received termination signal. Shutting down sync process..."));
    assert!(lines.contains("Sync process terminated."));
}
