//! Directory Scanner
//!
//! Lists immediate subdirectories of the packages root and keeps only those
//! that contain the sentinel directory. No recursion.

use crate::core::error::{ConfigError, ResultExt, UpkeepError, UpkeepResult};
use std::fs;
use std::path::{Path, PathBuf};

/// One opted-in package checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDir {
  /// Directory name (used for environment lookup and module fallback)
  pub name: String,
  /// Absolute path of the checkout
  pub root: PathBuf,
}

impl PackageDir {
  /// Path of the sentinel directory inside this package
  pub fn sentinel_dir(&self, sentinel: &str) -> PathBuf {
    self.root.join(sentinel)
  }
}

/// Find all opted-in packages under `packages_dir`, sorted by name.
///
/// Entries that are not directories, have non-UTF-8 names, or lack the
/// sentinel subdirectory are skipped silently.
pub fn scan(packages_dir: &Path, sentinel: &str) -> UpkeepResult<Vec<PackageDir>> {
  if !packages_dir.is_dir() {
    return Err(UpkeepError::Config(ConfigError::PackagesDirMissing {
      path: packages_dir.to_path_buf(),
    }));
  }

  let entries = fs::read_dir(packages_dir)
    .with_context(|| format!("Failed to read packages directory {}", packages_dir.display()))?;

  let mut packages = Vec::new();
  for entry in entries {
    let entry = entry?;
    let root = entry.path();
    if !root.is_dir() || !root.join(sentinel).is_dir() {
      continue;
    }
    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
      tracing::warn!(path = %root.display(), "skipping package with non-UTF-8 name");
      continue;
    };
    packages.push(PackageDir { name, root });
  }

  packages.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(packages)
}
