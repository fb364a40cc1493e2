//! `omnicheck run-check` - Invoke a checker's underlying tool directly
//!
//! Resolves one checker (with its configured settings applied) and passes the
//! remaining arguments straight through to it, streaming the raw tool output
//! without issue parsing, filtering or exclusion. Useful for running a tool
//! ad hoc with the same configuration the check command would use.

use crate::checker::registry::CheckerRegistry;
use crate::checker::{CheckerFactory, CheckerType};
use crate::core::error::OmniResult;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run the run-check command
pub fn run_run_check(check: String, config_path: &Path, asset_paths: &[PathBuf], args: Vec<String>) -> OmniResult<()> {
  let config = super::load_config(config_path)?;
  let registry = CheckerRegistry::from_asset_paths(asset_paths)?;
  let project_param = config.to_param(&registry)?;

  let checker_type = CheckerType::new(check);
  let checker = match project_param.checks.get(&checker_type) {
    Some(param) => param.checker.clone(),
    None => registry.new_checker(&checker_type, None)?,
  };

  let stdout = io::stdout();
  let mut stdout = stdout.lock();
  checker.run_check_cmd(&args, &mut stdout);
  let _ = stdout.flush();
  Ok(())
}
