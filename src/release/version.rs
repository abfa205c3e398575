//! Version Editor

use crate::core::error::{PackageError, ResultExt, UpkeepError, UpkeepResult};
use regex::Regex;
use semver::Version;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"\b__version__\s*=\s*"(\d+)\.(\d+)\.(\d+)""#).expect("version pattern is valid")
  })
}

/// The single version assignment found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDeclaration {
  pub version: Version,
  /// Byte range of `MAJOR.MINOR.PATCH` inside the quotes
  pub span: Range<usize>,
}

/// Locate the version assignment; errors name the reason, not the file
pub fn parse_declaration(content: &str) -> Result<VersionDeclaration, String> {
  let mut matches = version_pattern().captures_iter(content);

  let caps = matches
    .next()
    .ok_or_else(|| "no `__version__ = \"MAJOR.MINOR.PATCH\"` assignment found".to_string())?;
  if matches.next().is_some() {
    return Err("more than one `__version__` assignment found".to_string());
  }

  let number = |i: usize| -> Result<u64, String> {
    caps[i]
      .parse::<u64>()
      .map_err(|e| format!("version component '{}' is out of range: {}", &caps[i], e))
  };
  let version = Version::new(number(1)?, number(2)?, number(3)?);

  // groups 1..=3 always participate when the pattern matches
  let span = match (caps.get(1), caps.get(3)) {
    (Some(start), Some(end)) => start.start()..end.end(),
    _ => return Err("malformed version assignment".to_string()),
  };

  Ok(VersionDeclaration { version, span })
}

/// Next patch release: `a.b.c` -> `a.b.(c+1)`
pub fn next_patch(current: &Version) -> Result<Version, String> {
  let patch = current
    .patch
    .checked_add(1)
    .ok_or_else(|| "patch component cannot be incremented".to_string())?;
  Ok(Version::new(current.major, current.minor, patch))
}

fn parse_error(path: &Path, reason: String) -> UpkeepError {
  UpkeepError::from(PackageError::Parse {
    path: path.to_path_buf(),
    reason,
  })
}

fn read_declaration(path: &Path) -> UpkeepResult<(String, VersionDeclaration)> {
  if !path.is_file() {
    return Err(
      PackageError::FileNotFound {
        kind: "version file",
        path: path.to_path_buf(),
      }
      .into(),
    );
  }

  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let declaration = parse_declaration(&content).map_err(|reason| parse_error(path, reason))?;
  Ok((content, declaration))
}

/// Next patch version declared in `path`; the file is not modified
pub fn peek_next_version(path: &Path) -> UpkeepResult<Version> {
  let (_, declaration) = read_declaration(path)?;
  next_patch(&declaration.version).map_err(|reason| parse_error(path, reason))
}

/// Rewrite `path` with the next patch version and return it.
///
/// Only the version number inside the quotes is replaced; every other byte
/// of the file is preserved.
pub fn commit_increment(path: &Path) -> UpkeepResult<Version> {
  let (mut content, declaration) = read_declaration(path)?;
  let next = next_patch(&declaration.version).map_err(|reason| parse_error(path, reason))?;

  content.replace_range(declaration.span, &next.to_string());
  fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

  tracing::debug!(path = %path.display(), from = %declaration.version, to = %next, "bumped version");
  Ok(next)
}
