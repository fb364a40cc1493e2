//! Checker registry
//!
//! Maps checker type names to creators and implements `CheckerFactory` for
//! the engine and the config resolver. Registries are usually populated from
//! asset executables; metadata discovery for many assets runs concurrently
//! and fails fast on the first asset that cannot be queried.

use crate::checker::asset::{AssetChecker, discover_metadata};
use crate::checker::{Checker, CheckerFactory, CheckerPriority, CheckerType};
use crate::core::error::{OmniError, OmniResult};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type CreateFn = Box<dyn Fn(Option<&serde_yaml::Value>) -> OmniResult<Arc<dyn Checker>> + Send + Sync>;

/// Constructor for one checker type
pub struct CheckerCreator {
  pub checker_type: CheckerType,
  pub priority: CheckerPriority,
  pub multi_cpu: bool,
  create: CreateFn,
}

impl CheckerCreator {
  pub fn new(
    checker_type: CheckerType,
    priority: CheckerPriority,
    multi_cpu: bool,
    create: CreateFn,
  ) -> Self {
    CheckerCreator {
      checker_type,
      priority,
      multi_cpu,
      create,
    }
  }
}

/// Registry of known checker types
#[derive(Default)]
pub struct CheckerRegistry {
  creators: BTreeMap<CheckerType, CheckerCreator>,
}

impl CheckerRegistry {
  pub fn new() -> Self {
    CheckerRegistry::default()
  }

  /// Register a creator. Two creators for the same type is a configuration
  /// error.
  pub fn register(&mut self, creator: CheckerCreator) -> OmniResult<()> {
    let checker_type = creator.checker_type.clone();
    if self.creators.contains_key(&checker_type) {
      return Err(OmniError::config(format!(
        "checker type '{}' registered more than once",
        checker_type
      )));
    }
    self.creators.insert(checker_type, creator);
    Ok(())
  }

  /// Build a registry from asset executables.
  ///
  /// Metadata discovery runs concurrently, bounded only by the number of
  /// assets; any single discovery failure aborts the whole registration.
  pub fn from_asset_paths(asset_paths: &[PathBuf]) -> OmniResult<Self> {
    let discovered = asset_paths
      .par_iter()
      .map(|path| discover_metadata(path).map(|metadata| (path.clone(), metadata)))
      .collect::<OmniResult<Vec<_>>>()?;

    // detect checker types provided by more than one asset before registering
    let mut assets_by_type: BTreeMap<CheckerType, Vec<String>> = BTreeMap::new();
    for (path, metadata) in &discovered {
      assets_by_type
        .entry(metadata.checker_type.clone())
        .or_default()
        .push(path.display().to_string());
    }
    for (checker_type, mut assets) in assets_by_type {
      if assets.len() > 1 {
        assets.sort();
        return Err(OmniError::config(format!(
          "checker type '{}' provided by multiple assets: [{}]",
          checker_type,
          assets.join(", ")
        )));
      }
    }

    let mut registry = CheckerRegistry::new();
    for (path, metadata) in discovered {
      let creator_metadata = metadata.clone();
      registry.register(CheckerCreator::new(
        metadata.checker_type,
        metadata.priority,
        metadata.multi_cpu,
        Box::new(move |cfg| {
          let cfg_yaml = match cfg {
            Some(value) => serde_yaml::to_string(value)?,
            None => String::new(),
          };
          let checker = AssetChecker::new(path.clone(), creator_metadata.clone(), cfg_yaml)?;
          Ok(Arc::new(checker) as Arc<dyn Checker>)
        }),
      ))?;
    }
    Ok(registry)
  }

  /// All registered creators, sorted by type
  pub fn creators(&self) -> impl Iterator<Item = &CheckerCreator> {
    self.creators.values()
  }
}

impl CheckerFactory for CheckerRegistry {
  fn types(&self) -> Vec<CheckerType> {
    self.creators.keys().cloned().collect()
  }

  fn new_checker(
    &self,
    checker_type: &CheckerType,
    cfg_yaml: Option<&serde_yaml::Value>,
  ) -> OmniResult<Arc<dyn Checker>> {
    let creator = self.creators.get(checker_type).ok_or_else(|| OmniError::Resolution {
      checker_type: checker_type.to_string(),
      reason: "no registered asset provides this checker type".to_string(),
    })?;
    (creator.create)(cfg_yaml)
  }
}
