//! `omnicheck checkers` - List available checker types
//!
//! Prints every checker type the loaded assets provide, with its priority and
//! concurrency class, plus whether the project configuration skips it or
//! overrides its priority.

use crate::checker::registry::CheckerRegistry;
use crate::core::error::OmniResult;
use std::path::{Path, PathBuf};

/// Run the checkers command
pub fn run_checkers(config_path: &Path, asset_paths: &[PathBuf]) -> OmniResult<()> {
  let config = super::load_config(config_path)?;
  let registry = CheckerRegistry::from_asset_paths(asset_paths)?;

  for creator in registry.creators() {
    let mut line = format!(
      "{} (priority {}, {})",
      creator.checker_type,
      creator.priority,
      if creator.multi_cpu { "multi-cpu" } else { "exclusive" }
    );
    if let Some(checker_config) = config.checks.get(&creator.checker_type) {
      if checker_config.skip {
        line.push_str(" [skipped]");
      }
      if let Some(priority) = checker_config.priority {
        line.push_str(&format!(" [priority override {}]", priority));
      }
    }
    println!("{}", line);
  }
  Ok(())
}
