//! Package metadata from the sentinel directory
//!
//! The metadata file is not parsed as a language; only these key/value
//! assignments are recognized (either `key = "value"` or the keyword-argument
//! form `key="value"`, single or double quotes):
//!
//! - `main_branch`: branch maintenance starts from; defaults to `master`
//! - `module_name`: directory holding `__init__.py`
//! - `package_name`: fallback for the module name (`-` becomes `_`)
//!
//! Each key may appear at most once. A repeated key is a parse error rather
//! than "first one wins".

use crate::core::error::{PackageError, ResultExt, UpkeepResult};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Branch used when the metadata file has no `main_branch` assignment
pub const DEFAULT_MAIN_BRANCH: &str = "master";

/// Metadata resolved for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
  pub main_branch: String,
  pub module_name: String,
}

impl PackageMetadata {
  /// Read the metadata file; `dir_name` is the fallback module source
  pub fn load(path: &Path, dir_name: &str) -> UpkeepResult<Self> {
    let content = read_metadata(path)?;
    Self::parse(&content, path, dir_name)
  }

  /// Parse metadata text; `path` is only used in error messages
  pub fn parse(content: &str, path: &Path, dir_name: &str) -> UpkeepResult<Self> {
    let main_branch = main_branch_in(content, path)?;

    let module_name = match find_assignment(content, "module_name", path)? {
      Some(module) => module,
      None => find_assignment(content, "package_name", path)?
        .map(|name| name.replace('-', "_"))
        .unwrap_or_else(|| dir_name.replace('-', "_")),
    };

    Ok(Self {
      main_branch,
      module_name,
    })
  }

  /// `{root}/{module}/__init__.py`
  pub fn version_file(&self, root: &Path) -> PathBuf {
    root.join(&self.module_name).join("__init__.py")
  }
}

/// Main branch named in a metadata file.
///
/// The file must exist; a missing `main_branch` key yields `master`.
/// Other keys are not looked at, so a bad `module_name` does not hide it.
pub fn main_branch_name(path: &Path) -> UpkeepResult<String> {
  let content = read_metadata(path)?;
  main_branch_in(&content, path)
}

fn main_branch_in(content: &str, path: &Path) -> UpkeepResult<String> {
  Ok(find_assignment(content, "main_branch", path)?.unwrap_or_else(|| DEFAULT_MAIN_BRANCH.to_string()))
}

fn read_metadata(path: &Path) -> UpkeepResult<String> {
  if !path.is_file() {
    return Err(
      PackageError::FileNotFound {
        kind: "metadata file",
        path: path.to_path_buf(),
      }
      .into(),
    );
  }
  fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn assignment_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"\b(main_branch|module_name|package_name)\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)')"#)
      .expect("assignment pattern is valid")
  })
}

/// Value of a single `key = "value"` assignment, or None when absent
fn find_assignment(content: &str, key: &str, path: &Path) -> UpkeepResult<Option<String>> {
  let mut values = assignment_pattern()
    .captures_iter(content)
    .filter(|caps| &caps[1] == key)
    .filter_map(|caps| caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str().trim().to_string()));

  let Some(value) = values.next() else {
    return Ok(None);
  };
  if values.next().is_some() {
    return Err(
      PackageError::Parse {
        path: path.to_path_buf(),
        reason: format!("`{}` is assigned more than once", key),
      }
      .into(),
    );
  }
  if value.is_empty() {
    return Err(
      PackageError::Parse {
        path: path.to_path_buf(),
        reason: format!("`{}` is empty", key),
      }
      .into(),
    );
  }
  Ok(Some(value))
}
