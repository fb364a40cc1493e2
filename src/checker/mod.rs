//! Checker abstraction
//!
//! A checker is a pluggable analysis unit producing zero or more issues. The
//! `Checker` trait is the capability set every backend implements, whether it
//! wraps an external asset executable or an in-process test double. The
//! engine never learns which kind it is holding.

pub mod asset;
pub mod registry;

use crate::core::error::OmniResult;
use crate::core::exclude::ExcludeMatcher;
use crate::core::filter::Filter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Opaque identifier naming a checker kind. Ordered lexicographically; must
/// be unique across all registered checkers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckerType(String);

impl CheckerType {
  pub fn new(name: impl Into<String>) -> Self {
    CheckerType(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CheckerType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for CheckerType {
  fn from(name: &str) -> Self {
    CheckerType::new(name)
  }
}

/// Scheduling priority: lower runs earlier
pub type CheckerPriority = i64;

/// A pluggable analysis unit
///
/// `check` deliberately returns nothing: a checker's exit code is not a
/// reliable success signal (many checkers exit non-zero exactly when they
/// found issues), so all failure detail must flow through the issue stream.
/// Any output written to the sink means the check failed.
pub trait Checker: Send + Sync {
  /// The type of this checker. Fails if the identity cannot be determined,
  /// e.g. the backing executable cannot be invoked.
  fn checker_type(&self) -> OmniResult<CheckerType>;

  /// The intrinsic priority of this checker. Lower runs earlier.
  fn priority(&self) -> OmniResult<CheckerPriority>;

  /// Whether this checker may run concurrently with other checkers. A
  /// checker that answers false is presumed to consume most available CPU
  /// and is scheduled alone. Implementations must answer false when the
  /// capability cannot be queried; the question never aborts a run.
  fn multi_cpu(&self) -> bool {
    false
  }

  /// Run the check on the given package paths. Every line written to
  /// `output` must be the JSON serialization of an `Issue`; execution errors
  /// are reported the same way (content-only issues), never returned.
  fn check(&self, pkg_paths: &[String], project_dir: &Path, output: &mut dyn Write);

  /// Run the underlying check command directly with the provided arguments
  /// and write its unaltered output to `output` (bypasses JSON framing).
  fn run_check_cmd(&self, args: &[String], output: &mut dyn Write);
}

/// Materializes checkers from their type name and optional YAML configuration
pub trait CheckerFactory: Send + Sync {
  /// All checker types this factory can construct, sorted
  fn types(&self) -> Vec<CheckerType>;

  /// Construct a checker, verifying the configuration if one is given
  fn new_checker(&self, checker_type: &CheckerType, cfg_yaml: Option<&serde_yaml::Value>)
  -> OmniResult<Arc<dyn Checker>>;
}

/// A configured checker bound to its per-project overrides
pub struct CheckerParam {
  /// Skip this checker entirely
  pub skip: bool,
  /// Per-project priority override; effective priority = override if
  /// present, else the checker's intrinsic priority
  pub priority_override: Option<CheckerPriority>,
  /// The checker itself
  pub checker: Arc<dyn Checker>,
  /// Suppression filters applied to each decoded issue
  pub filters: Vec<Box<dyn Filter>>,
  /// Union of checker-specific and project-global path excludes
  pub exclude: ExcludeMatcher,
}

impl CheckerParam {
  /// A zero-configuration param wrapping a bare checker
  pub fn bare(checker: Arc<dyn Checker>) -> Self {
    CheckerParam {
      skip: false,
      priority_override: None,
      checker,
      filters: Vec::new(),
      exclude: ExcludeMatcher::none(),
    }
  }
}

/// The fully resolved execution plan consumed by the engine
#[derive(Default)]
pub struct ProjectParam {
  /// Optional release-tag environment hint
  pub release_tag: Option<String>,
  /// Per-type checker parameters
  pub checks: BTreeMap<CheckerType, CheckerParam>,
}
