//! `omnicheck check` - Run checks and aggregate a single result
//!
//! Loads project configuration and checker assets, resolves which checker
//! types to run, and hands the plan to the engine. With no positional
//! arguments every known checker runs; otherwise only the named ones do, and
//! unknown names fail fast before anything executes.

use crate::checker::{CheckerFactory, CheckerType};
use crate::checker::registry::CheckerRegistry;
use crate::core::error::{OmniError, OmniResult};
use crate::engine::{self, OutputSink, RunRequest};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;

/// Run the check command
pub fn run_check(
  checks: Vec<String>,
  config_path: &Path,
  project_dir: PathBuf,
  asset_paths: &[PathBuf],
  pkg_paths: Vec<String>,
  parallel: bool,
) -> OmniResult<()> {
  let config = super::load_config(config_path)?;
  let registry = CheckerRegistry::from_asset_paths(asset_paths)?;
  let project_param = config.to_param(&registry)?;

  // every type either configured or provided by an asset, sorted
  let known_types: BTreeSet<CheckerType> = project_param
    .checks
    .keys()
    .cloned()
    .chain(registry.types())
    .collect();

  let checkers_to_run: Vec<CheckerType> = if checks.is_empty() {
    known_types.iter().cloned().collect()
  } else {
    let mut requested = Vec::with_capacity(checks.len());
    for name in checks {
      let checker_type = CheckerType::new(name);
      if !known_types.contains(&checker_type) {
        return Err(OmniError::with_help(
          format!("unknown check '{}'", checker_type),
          format!(
            "valid checks: [{}]",
            known_types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
          ),
        ));
      }
      requested.push(checker_type);
    }
    requested
  };

  let pkg_paths = if pkg_paths.is_empty() {
    vec![".".to_string()]
  } else {
    pkg_paths
  };
  let parallelism = if parallel {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
  } else {
    1
  };

  let request = RunRequest {
    project_param,
    checkers_to_run,
    pkg_paths,
    project_dir,
    parallelism,
  };
  engine::run(request, Some(&registry), &OutputSink::to_stdout())
}
