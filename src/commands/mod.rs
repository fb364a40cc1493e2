//! CLI commands for omnicheck
//!
//! - **check**: run configured checks and aggregate a pass/fail result
//! - **run-check**: invoke one checker's underlying tool directly with
//!   passthrough arguments
//! - **checkers**: list the checker types the loaded assets provide

pub mod check;
pub mod checkers;
pub mod run_check;

pub use check::run_check;
pub use checkers::run_checkers;
pub use run_check::run_run_check;

use crate::core::config::ProjectConfig;
use crate::core::error::OmniResult;
use std::path::Path;

/// Load project configuration, treating a missing file as an empty
/// configuration so projects without an `omnicheck.yml` still work
pub(crate) fn load_config(path: &Path) -> OmniResult<ProjectConfig> {
  if path.exists() {
    ProjectConfig::load(path)
  } else {
    Ok(ProjectConfig::default())
  }
}
