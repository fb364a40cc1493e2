//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test project directory that checker assets and config files are
/// written into
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestProject {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Write an `omnicheck.yml` into the project
  pub fn write_config(&self, yaml: &str) -> Result<()> {
    std::fs::write(self.path.join("omnicheck.yml"), yaml)?;
    Ok(())
  }

  /// Write an executable checker asset script implementing the asset
  /// protocol. `check_lines` is the shell body of the `check` subcommand;
  /// issue JSON lines it prints become check output.
  pub fn write_asset(
    &self,
    file_name: &str,
    checker_type: &str,
    priority: i64,
    multi_cpu: bool,
    check_lines: &str,
  ) -> Result<PathBuf> {
    let script = format!(
      r#"#!/bin/sh
case "$1" in
  type) printf '"%s"\n' '{checker_type}' ;;
  priority) printf '%s\n' '{priority}' ;;
  multi-cpu) printf '%s\n' '{multi_cpu}' ;;
  verify-config) exit 0 ;;
  check)
{check_lines}
    ;;
  run-check-cmd)
    shift 3
    printf 'ran with args: %s\n' "$*"
    ;;
esac
"#
    );
    self.write_script(file_name, &script)
  }

  /// Write an executable script verbatim
  pub fn write_script(&self, file_name: &str, script: &str) -> Result<PathBuf> {
    let asset_path = self.path.join(file_name);
    std::fs::write(&asset_path, script)?;
    let mut perms = std::fs::metadata(&asset_path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&asset_path, perms)?;
    Ok(asset_path)
  }
}

/// Run the omnicheck binary and return its raw output; check failures exit
/// non-zero by design, so callers inspect the status themselves
pub fn run_omnicheck(cwd: &Path, args: &[&str]) -> Result<Output> {
  let omnicheck_bin = env!("CARGO_BIN_EXE_omnicheck");
  Command::new(omnicheck_bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run omnicheck")
}

pub fn stdout_of(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr_of(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
