//! Path exclusion matching
//!
//! Excludes are declared as `names` (regexes matched against the final path
//! component) and `paths` (glob patterns matched against the whole
//! repository-relative path; a pattern that names a directory also excludes
//! everything under it). Each checker's matcher is the union of its own
//! excludes and the project-global excludes.

use crate::core::error::OmniResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exclusion rules as they appear in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeConfig {
  /// Regexes matched against the final path component
  #[serde(default)]
  pub names: Vec<String>,

  /// Glob patterns matched against the whole path
  #[serde(default)]
  pub paths: Vec<String>,
}

impl ExcludeConfig {
  /// Compile into a matcher
  pub fn to_matcher(&self) -> OmniResult<ExcludeMatcher> {
    let mut name_res = Vec::with_capacity(self.names.len());
    for name in &self.names {
      name_res.push(regex::Regex::new(name)?);
    }
    let mut path_globs = Vec::with_capacity(self.paths.len());
    for path in &self.paths {
      path_globs.push(glob::Pattern::new(path)?);
    }
    Ok(ExcludeMatcher { name_res, path_globs })
  }
}

/// Compiled path-exclusion predicate
#[derive(Debug, Default)]
pub struct ExcludeMatcher {
  name_res: Vec<regex::Regex>,
  path_globs: Vec<glob::Pattern>,
}

impl ExcludeMatcher {
  /// Matcher that excludes nothing
  pub fn none() -> Self {
    ExcludeMatcher::default()
  }

  /// Union of two matchers: matches if either matches
  pub fn union(mut self, other: ExcludeMatcher) -> Self {
    self.name_res.extend(other.name_res);
    self.path_globs.extend(other.path_globs);
    self
  }

  /// Whether the path is excluded
  pub fn matches(&self, path: &str) -> bool {
    if let Some(file_name) = Path::new(path).file_name().and_then(|n| n.to_str())
      && self.name_res.iter().any(|re| re.is_match(file_name))
    {
      return true;
    }
    self.path_globs.iter().any(|pattern| {
      pattern.matches(path)
        || Path::new(path)
          .ancestors()
          .skip(1)
          .any(|dir| dir.to_str().is_some_and(|d| !d.is_empty() && pattern.matches(d)))
    })
  }
}
