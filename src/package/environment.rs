//! Environment Resolver

use crate::core::error::{PackageError, UpkeepResult};
use std::path::{Path, PathBuf};

/// `{envs_dir}/{package}/{executable}`, which must exist
pub fn resolve_executable(envs_dir: &Path, package: &str, executable: &Path) -> UpkeepResult<PathBuf> {
  let path = executable_path(envs_dir, package, executable);
  if !path.exists() {
    return Err(
      PackageError::MissingEnvironment {
        package: package.to_string(),
        path,
      }
      .into(),
    );
  }
  Ok(path)
}

/// Expected executable path, whether or not it exists
pub fn executable_path(envs_dir: &Path, package: &str, executable: &Path) -> PathBuf {
  envs_dir.join(package).join(executable)
}
