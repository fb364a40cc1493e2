//! Asset-backed checkers
//!
//! An asset is an externally supplied executable implementing a small
//! subcommand protocol: `type`, `priority` and `multi-cpu` print a JSON
//! value to stdout; `verify-config` exits zero iff the given YAML is
//! acceptable; `check` streams newline-delimited JSON issues; `run-check-cmd`
//! is a raw passthrough. The asset's exit code from `check` is never used to
//! decide success — only the presence of emitted issue lines is.

use crate::checker::{Checker, CheckerPriority, CheckerType};
use crate::core::error::{OmniError, OmniResult};
use crate::core::issue::{Issue, write_error_as_issue};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const TYPE_CMD: &str = "type";
const PRIORITY_CMD: &str = "priority";
const MULTI_CPU_CMD: &str = "multi-cpu";
const VERIFY_CONFIG_CMD: &str = "verify-config";
const CHECK_CMD: &str = "check";
const RUN_CHECK_CMD: &str = "run-check-cmd";
const CONFIG_YML_FLAG: &str = "--config-yml";
const PROJECT_DIR_FLAG: &str = "--project-dir";

/// Metadata advertised by an asset executable
#[derive(Debug, Clone)]
pub struct AssetMetadata {
  pub checker_type: CheckerType,
  pub priority: CheckerPriority,
  pub multi_cpu: bool,
}

/// Query an asset for its type, priority and concurrency class.
///
/// `type` and `priority` failures are errors; a `multi-cpu` failure (older
/// assets do not implement the subcommand) defaults to false.
pub fn discover_metadata(asset_path: &Path) -> OmniResult<AssetMetadata> {
  let checker_type: CheckerType = query_json(asset_path, TYPE_CMD)?;
  let priority: CheckerPriority = query_json(asset_path, PRIORITY_CMD)?;
  let multi_cpu: bool = query_json(asset_path, MULTI_CPU_CMD).unwrap_or(false);
  Ok(AssetMetadata {
    checker_type,
    priority,
    multi_cpu,
  })
}

fn query_json<T: serde::de::DeserializeOwned>(asset_path: &Path, subcommand: &str) -> OmniResult<T> {
  let output = Command::new(asset_path)
    .arg(subcommand)
    .output()
    .map_err(|err| OmniError::metadata(format!("failed to invoke {} {}: {}", asset_path.display(), subcommand, err)))?;
  if !output.status.success() {
    return Err(OmniError::metadata(format!(
      "{} {} exited with {}: {}",
      asset_path.display(),
      subcommand,
      output.status,
      String::from_utf8_lossy(&output.stderr).trim()
    )));
  }
  serde_json::from_slice(&output.stdout).map_err(|err| {
    OmniError::metadata(format!(
      "failed to decode output of {} {}: {}",
      asset_path.display(),
      subcommand,
      err
    ))
  })
}

/// A checker backed by an asset executable
pub struct AssetChecker {
  asset_path: PathBuf,
  cfg_yaml: String,
  metadata: AssetMetadata,
}

impl AssetChecker {
  /// Bind an asset to its configuration, asking the asset to verify it
  pub fn new(asset_path: PathBuf, metadata: AssetMetadata, cfg_yaml: String) -> OmniResult<Self> {
    let checker = AssetChecker {
      asset_path,
      cfg_yaml,
      metadata,
    };
    checker.verify_config()?;
    Ok(checker)
  }

  fn verify_config(&self) -> OmniResult<()> {
    let output = Command::new(&self.asset_path)
      .arg(VERIFY_CONFIG_CMD)
      .arg(CONFIG_YML_FLAG)
      .arg(&self.cfg_yaml)
      .output()
      .map_err(|err| OmniError::config(format!("failed to invoke {}: {}", self.asset_path.display(), err)))?;
    if !output.status.success() {
      return Err(OmniError::config(format!(
        "{} rejected configuration for check '{}': {}",
        self.asset_path.display(),
        self.metadata.checker_type,
        String::from_utf8_lossy(&output.stderr).trim()
      )));
    }
    Ok(())
  }
}

impl Checker for AssetChecker {
  fn checker_type(&self) -> OmniResult<CheckerType> {
    Ok(self.metadata.checker_type.clone())
  }

  fn priority(&self) -> OmniResult<CheckerPriority> {
    Ok(self.metadata.priority)
  }

  fn multi_cpu(&self) -> bool {
    self.metadata.multi_cpu
  }

  fn check(&self, pkg_paths: &[String], project_dir: &Path, output: &mut dyn Write) {
    let mut cmd = Command::new(&self.asset_path);
    cmd
      .arg(CHECK_CMD)
      .arg(CONFIG_YML_FLAG)
      .arg(&self.cfg_yaml)
      .arg(PROJECT_DIR_FLAG)
      .arg(project_dir)
      .args(pkg_paths)
      .current_dir(project_dir);
    run_and_stream_issues(cmd, Issue::from_json_line, output);
  }

  fn run_check_cmd(&self, args: &[String], output: &mut dyn Write) {
    let mut cmd = Command::new(&self.asset_path);
    cmd.arg(RUN_CHECK_CMD).arg(CONFIG_YML_FLAG).arg(&self.cfg_yaml).args(args);
    run_and_copy_output(cmd, output);
  }
}

/// Run a command, merging its stdout and stderr into one pipe, and re-encode
/// every line the given parser turns into a non-empty issue as an issue JSON
/// line on `output`.
///
/// The pipe is drained while the child runs, so a child that writes more than
/// the pipe capacity cannot deadlock against a reader that has not started.
/// Only a failure to launch the process becomes an issue; a non-zero exit
/// from a launched child is ignored because it cannot be distinguished from a
/// check that ran fine and found issues.
pub fn run_and_stream_issues(mut cmd: Command, parse_line: fn(&str) -> Issue, output: &mut dyn Write) {
  let (reader, writer) = match io::pipe() {
    Ok(pipe) => pipe,
    Err(err) => {
      write_error_as_issue(&format!("failed to create pipe: {}", err), output);
      return;
    }
  };
  let writer_clone = match writer.try_clone() {
    Ok(clone) => clone,
    Err(err) => {
      write_error_as_issue(&format!("failed to clone pipe writer: {}", err), output);
      return;
    }
  };
  cmd.stdout(Stdio::from(writer)).stderr(Stdio::from(writer_clone));

  let mut child = match cmd.spawn() {
    Ok(child) => child,
    Err(err) => {
      write_error_as_issue(&format!("failed to run command {:?}: {}", cmd, err), output);
      return;
    }
  };
  // the Command retains the parent's pipe ends; drop it so the reader sees
  // end-of-stream once the child exits
  drop(cmd);

  for line in BufReader::new(reader).lines() {
    let line = match line {
      Ok(line) => line,
      Err(err) => {
        write_error_as_issue(&format!("error reading command output: {}", err), output);
        break;
      }
    };
    let issue = parse_line(&line);
    if issue.is_empty() {
      continue;
    }
    match serde_json::to_string(&issue) {
      Ok(encoded) => {
        let _ = writeln!(output, "{}", encoded);
      }
      Err(err) => write_error_as_issue(&format!("failed to encode issue as JSON: {}", err), output),
    }
  }

  // exit status intentionally unused, see above
  let _ = child.wait();
}

/// Run a command and copy its merged stdout and stderr verbatim to `output`
fn run_and_copy_output(mut cmd: Command, output: &mut dyn Write) {
  let (mut reader, writer) = match io::pipe() {
    Ok(pipe) => pipe,
    Err(err) => {
      let _ = writeln!(output, "failed to create pipe: {}", err);
      return;
    }
  };
  let writer_clone = match writer.try_clone() {
    Ok(clone) => clone,
    Err(err) => {
      let _ = writeln!(output, "failed to clone pipe writer: {}", err);
      return;
    }
  };
  cmd.stdout(Stdio::from(writer)).stderr(Stdio::from(writer_clone));

  let mut child = match cmd.spawn() {
    Ok(child) => child,
    Err(err) => {
      let _ = writeln!(output, "failed to run command {:?}: {}", cmd, err);
      return;
    }
  };
  drop(cmd);

  let _ = io::copy(&mut reader, output);
  let _ = child.wait();
}
