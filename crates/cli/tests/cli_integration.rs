//! End-to-end tests for the `cpw` binary

#[macro_use]
mod common;

use common::{wait_until, CpwCommand};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const USAGE_LINE: &str = "Usage: cpw <source> <destination>";

#[test]
fn test_version_flag() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    for flag in ["-version", "--version"] {
        let result = cpw!(temp_dir.path(), flag).assert_success()?;
        assert!(result.contains_stdout("cpw version "), "{}", result.stdout);
        assert!(result.contains_stdout("(commit: "));
    }

    Ok(())
}

#[test]
fn test_wrong_argument_count_prints_usage() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    let result = CpwCommand::new(temp_dir.path()).assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stdout(USAGE_LINE));

    let result = cpw!(temp_dir.path(), "a", "b", "c").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stdout(USAGE_LINE));

    Ok(())
}

#[test]
fn test_unknown_flag_prints_usage() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    let result = cpw!(temp_dir.path(), "--bogus", "a", "b").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stdout(USAGE_LINE));
    assert!(!result.stderr.is_empty());

    Ok(())
}

#[test]
fn test_missing_source_is_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    let result = CpwCommand::new(temp_dir.path())
        .path(temp_dir.path().join("missing"))
        .path(temp_dir.path().join("dst"))
        .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("error accessing source"), "{}", result.stderr);
    assert!(!temp_dir.path().join("dst").exists());

    Ok(())
}

#[test]
fn test_directory_onto_file_is_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let src = temp_dir.path().join("src");
    let dst = temp_dir.path().join("dst.txt");
    fs::create_dir(&src)?;
    fs::write(&dst, b"not a directory")?;

    let result = CpwCommand::new(temp_dir.path())
        .path(&src)
        .path(&dst)
        .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("is not a directory"), "{}", result.stderr);
    assert_eq!(fs::read(&dst)?, b"not a directory");

    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let src = temp_dir.path().join("src");
    fs::create_dir(&src)?;
    let config = temp_dir.path().join("cpw.toml");
    fs::write(&config, "[mirror]\nno_such_key = 1\n")?;

    let result = CpwCommand::new(temp_dir.path())
        .args(&["--config"])
        .path(&config)
        .path(&src)
        .path(temp_dir.path().join("dst"))
        .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("failed to parse config"), "{}", result.stderr);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_mirror_until_terminated() -> anyhow::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let temp_dir = TempDir::new()?;
    let src = temp_dir.path().join("src");
    let dst = temp_dir.path().join("dst");
    fs::create_dir_all(src.join("sub"))?;
    fs::write(src.join("a.txt"), b"hello")?;

    let mut child = CpwCommand::new(temp_dir.path())
        .path(&src)
        .path(&dst)
        .spawn()?;

    let copied = wait_until(Duration::from_secs(10), || {
        fs::read(dst.join("a.txt")).map(|c| c == b"hello").unwrap_or(false)
    });
    assert!(copied, "initial copy never reached the destination");

    fs::write(src.join("sub/b.txt"), b"world")?;
    let mirrored = wait_until(Duration::from_secs(10), || {
        fs::read(dst.join("sub/b.txt")).map(|c| c == b"world").unwrap_or(false)
    });

    // Signal handlers are installed just after the initial copy
    std::thread::sleep(Duration::from_millis(200));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM)?;
    let output = child.wait_with_output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(mirrored, "new file was not mirrored");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("File watcher started. Press Ctrl+C to stop."), "{}", stdout);

    Ok(())
}
