//! Run context - build once, pass everywhere
//!
//! `RunContext` is built in main.rs from the CLI flags and the config file,
//! then passed by reference to every command. It carries explicit paths only;
//! no step relies on the process current directory after this point.

use crate::core::config::{ConfigOverrides, UpkeepConfig};
use crate::core::error::{ConfigError, UpkeepError, UpkeepResult};
use crate::package::{PackageDir, scan};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunContext {
  /// Directory upkeep was started from (absolute path)
  pub cwd: PathBuf,

  /// Resolved configuration (absolute packages/envs dirs)
  pub config: UpkeepConfig,

  /// Date written into changelog entries
  pub today: NaiveDate,
}

impl RunContext {
  /// Build the context: load config, apply CLI overrides, capture today's date
  pub fn build(cwd: &Path, config_path: Option<&Path>, overrides: &ConfigOverrides) -> UpkeepResult<Self> {
    let config = UpkeepConfig::load(cwd, config_path, overrides)?;
    Ok(Self {
      cwd: cwd.to_path_buf(),
      config,
      today: chrono::Local::now().date_naive(),
    })
  }

  /// All opted-in packages, sorted by name
  pub fn packages(&self) -> UpkeepResult<Vec<PackageDir>> {
    scan(&self.config.packages_dir, &self.config.sentinel)
  }

  /// Opted-in packages restricted to `only` (all of them when `only` is empty).
  /// Every requested name must be an opted-in package.
  pub fn select_packages(&self, only: &[String]) -> UpkeepResult<Vec<PackageDir>> {
    let packages = self.packages()?;
    if only.is_empty() {
      return Ok(packages);
    }

    if let Some(unknown) = only.iter().find(|name| !packages.iter().any(|p| &p.name == *name)) {
      return Err(UpkeepError::Config(ConfigError::UnknownPackage { name: unknown.clone() }));
    }
    Ok(packages.into_iter().filter(|p| only.contains(&p.name)).collect())
  }

  /// Find one opted-in package by directory name
  pub fn package(&self, name: &str) -> UpkeepResult<PackageDir> {
    self
      .select_packages(&[name.to_string()])?
      .into_iter()
      .next()
      .ok_or_else(|| UpkeepError::Config(ConfigError::UnknownPackage { name: name.to_string() }))
  }

  /// Metadata file path for a package
  pub fn metadata_path(&self, package: &PackageDir) -> PathBuf {
    package
      .sentinel_dir(&self.config.sentinel)
      .join(&self.config.metadata_file)
  }
}
