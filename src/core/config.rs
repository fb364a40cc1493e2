//! Project configuration
//!
//! An `omnicheck.yml` maps checker type names to their per-project settings
//! (skip flag, priority override, checker-specific YAML, filters and
//! excludes) plus a project-global exclude applied to every check:
//!
//! ```yaml
//! release-tag: stable
//! checks:
//!   lint:
//!     skip: false
//!     priority: 10
//!     config:
//!       strictness: high
//!     filters:
//!       - type: message
//!         value: "should have comment"
//!     exclude:
//!       paths:
//!         - "generated/*"
//! exclude:
//!   names:
//!     - ".*_test\\.rs"
//!   paths:
//!     - "vendor"
//! ```
//!
//! `to_param` resolves this into the `ProjectParam` the engine consumes,
//! materializing each configured checker through the factory.

use crate::checker::{CheckerFactory, CheckerParam, CheckerPriority, CheckerType, ProjectParam};
use crate::core::error::{OmniError, OmniResult};
use crate::core::exclude::ExcludeConfig;
use crate::core::filter::{Filter, FilterConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
  /// Newest release build tag supported by the codebase being checked.
  /// Passed through to the engine as an environment hint.
  #[serde(rename = "release-tag", default, skip_serializing_if = "Option::is_none")]
  pub release_tag: Option<String>,

  /// Per-check configuration, keyed by checker type name
  #[serde(default)]
  pub checks: BTreeMap<CheckerType, CheckerConfig>,

  /// Paths excluded from all checks
  #[serde(default)]
  pub exclude: ExcludeConfig,
}

/// Configuration for a single check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckerConfig {
  /// Skip this check entirely
  #[serde(default)]
  pub skip: bool,

  /// Priority override; if set, used instead of the checker's intrinsic
  /// priority
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<CheckerPriority>,

  /// Checker-specific YAML configuration, passed through opaquely
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<serde_yaml::Value>,

  /// Issue suppression filters
  #[serde(default)]
  pub filters: Vec<FilterConfig>,

  /// Paths excluded from this check (unioned with the global exclude)
  #[serde(default)]
  pub exclude: ExcludeConfig,
}

impl ProjectConfig {
  /// Load configuration from a YAML file
  pub fn load(path: &Path) -> OmniResult<ProjectConfig> {
    let contents = std::fs::read_to_string(path)
      .map_err(|err| OmniError::config(format!("failed to read {}: {}", path.display(), err)))?;
    ProjectConfig::from_yaml(&contents)
  }

  /// Parse configuration from a YAML string
  pub fn from_yaml(yaml: &str) -> OmniResult<ProjectConfig> {
    Ok(serde_yaml::from_str(yaml)?)
  }

  /// Resolve into the execution plan the engine consumes. Fails fast on the
  /// first checker the factory cannot construct or filter/exclude that does
  /// not compile.
  pub fn to_param(&self, factory: &dyn CheckerFactory) -> OmniResult<ProjectParam> {
    let mut checks = BTreeMap::new();
    for (checker_type, checker_config) in &self.checks {
      let param = checker_config.to_param(checker_type, factory, &self.exclude)?;
      checks.insert(checker_type.clone(), param);
    }
    Ok(ProjectParam {
      release_tag: self.release_tag.clone(),
      checks,
    })
  }
}

impl CheckerConfig {
  /// Resolve into a `CheckerParam`, materializing the checker via the
  /// factory and unioning this check's excludes with the global excludes
  pub fn to_param(
    &self,
    checker_type: &CheckerType,
    factory: &dyn CheckerFactory,
    global_exclude: &ExcludeConfig,
  ) -> OmniResult<CheckerParam> {
    if checker_type.as_str().is_empty() {
      return Err(OmniError::config("checker type name must be non-empty"));
    }
    let checker = factory.new_checker(checker_type, self.config.as_ref())?;

    let mut filters: Vec<Box<dyn Filter>> = Vec::with_capacity(self.filters.len());
    for filter_config in &self.filters {
      filters.push(filter_config.to_filter()?);
    }

    Ok(CheckerParam {
      skip: self.skip,
      priority_override: self.priority,
      checker,
      filters,
      exclude: self.exclude.to_matcher()?.union(global_exclude.to_matcher()?),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checker::Checker;
  use crate::core::issue::Issue;
  use std::io::Write;
  use std::sync::Arc;

  struct StubChecker {
    checker_type: CheckerType,
    cfg: Option<serde_yaml::Value>,
  }

  impl Checker for StubChecker {
    fn checker_type(&self) -> OmniResult<CheckerType> {
      Ok(self.checker_type.clone())
    }

    fn priority(&self) -> OmniResult<CheckerPriority> {
      Ok(0)
    }

    fn check(&self, _pkg_paths: &[String], _project_dir: &Path, output: &mut dyn Write) {
      if self.cfg.is_some() {
        let issue = Issue::from_content("configured");
        let _ = writeln!(output, "{}", serde_json::to_string(&issue).unwrap());
      }
    }

    fn run_check_cmd(&self, _args: &[String], _output: &mut dyn Write) {}
  }

  struct StubFactory;

  impl CheckerFactory for StubFactory {
    fn types(&self) -> Vec<CheckerType> {
      vec![CheckerType::from("lint"), CheckerType::from("vet")]
    }

    fn new_checker(
      &self,
      checker_type: &CheckerType,
      cfg_yaml: Option<&serde_yaml::Value>,
    ) -> OmniResult<Arc<dyn Checker>> {
      Ok(Arc::new(StubChecker {
        checker_type: checker_type.clone(),
        cfg: cfg_yaml.cloned(),
      }))
    }
  }

  const SAMPLE: &str = r#"
release-tag: stable
checks:
  lint:
    priority: 7
    config:
      strictness: high
    filters:
      - type: message
        value: "should have comment"
    exclude:
      paths:
        - "generated/*"
  vet:
    skip: true
exclude:
  names:
    - ".*_test\\.rs"
"#;

  #[test]
  fn test_parse_full_document() {
    let config = ProjectConfig::from_yaml(SAMPLE).unwrap();
    assert_eq!(config.release_tag.as_deref(), Some("stable"));
    assert_eq!(config.checks.len(), 2);

    let lint = &config.checks[&CheckerType::from("lint")];
    assert_eq!(lint.priority, Some(7));
    assert!(!lint.skip);
    assert_eq!(lint.filters.len(), 1);
    assert!(config.checks[&CheckerType::from("vet")].skip);
  }

  #[test]
  fn test_unknown_fields_rejected() {
    assert!(ProjectConfig::from_yaml("cheks: {}").is_err());
  }

  #[test]
  fn test_to_param_resolves_overrides_and_excludes() {
    let config = ProjectConfig::from_yaml(SAMPLE).unwrap();
    let param = config.to_param(&StubFactory).unwrap();

    assert_eq!(param.release_tag.as_deref(), Some("stable"));
    let lint = &param.checks[&CheckerType::from("lint")];
    assert_eq!(lint.priority_override, Some(7));
    assert_eq!(lint.filters.len(), 1);
    // checker-specific exclude unioned with the global names exclude
    assert!(lint.exclude.matches("generated/api.rs"));
    assert!(lint.exclude.matches("src/thing_test.rs"));
    assert!(!lint.exclude.matches("src/thing.rs"));

    let vet = &param.checks[&CheckerType::from("vet")];
    assert!(vet.skip);
    assert!(vet.exclude.matches("src/thing_test.rs"));
  }

  #[test]
  fn test_to_param_passes_checker_config_through() {
    let config = ProjectConfig::from_yaml(SAMPLE).unwrap();
    let param = config.to_param(&StubFactory).unwrap();

    let mut buf = Vec::new();
    param.checks[&CheckerType::from("lint")]
      .checker
      .check(&[], Path::new("."), &mut buf);
    assert!(String::from_utf8(buf).unwrap().contains("configured"));
  }

  #[test]
  fn test_invalid_filter_regex_fails_resolution() {
    let config = ProjectConfig::from_yaml(
      r#"
checks:
  lint:
    filters:
      - value: "(unclosed"
"#,
    )
    .unwrap();
    assert!(config.to_param(&StubFactory).is_err());
  }
}
