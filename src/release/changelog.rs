//! Changelog Editor
//!
//! A new entry always lands at line index 2, below the title block that
//! changelogs in these packages start with:
//!
//! ```text
//! # Changelog
//!
//! **1.2.4** (2024-05-01)
//!   * Maintenance updates via ambient-package-update
//!
//! **1.2.3** (2024-03-12)
//! ```
//!
//! Files shorter than that are padded with blank lines first. Inserting is
//! not idempotent; the workflow calls it once per version.

use crate::core::error::{PackageError, ResultExt, UpkeepResult};
use chrono::NaiveDate;
use semver::Version;
use std::fs;
use std::path::Path;

/// Line index the entry header is inserted at (0-based)
pub const ENTRY_LINE: usize = 2;

/// Minimum line count before insertion
const MIN_LINES: usize = 3;

/// One maintenance changelog entry
#[derive(Debug, Clone)]
pub struct ChangelogEntry {
  pub version: Version,
  pub date: NaiveDate,
  pub bullet: String,
}

impl ChangelogEntry {
  pub fn new(version: Version, date: NaiveDate, bullet: impl Into<String>) -> Self {
    Self {
      version,
      date,
      bullet: bullet.into(),
    }
  }

  /// `**{version}** ({date})`
  pub fn header(&self) -> String {
    format!("**{}** ({})", self.version, self.date.format("%Y-%m-%d"))
  }

  /// Header, bullet, blank separator
  fn lines(&self) -> [String; 3] {
    [self.header(), self.bullet.clone(), String::new()]
  }
}

/// Insert `entry` into changelog text and return the new text.
///
/// Existing line endings are kept; new lines use `\r\n` if the file already
/// does, `\n` otherwise. A missing newline on the last line is added so the
/// entry never merges with existing text.
pub fn insert_entry(content: &str, entry: &ChangelogEntry) -> String {
  let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

  let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
  if let Some(last) = lines.last_mut()
    && !last.ends_with('\n')
  {
    last.push_str(newline);
  }
  while lines.len() < MIN_LINES {
    lines.push(newline.to_string());
  }

  let block = entry.lines().map(|line| format!("{}{}", line, newline));
  lines.splice(ENTRY_LINE..ENTRY_LINE, block);
  lines.concat()
}

/// Insert a maintenance entry into the changelog at `path`
pub fn append_entry(path: &Path, entry: &ChangelogEntry) -> UpkeepResult<()> {
  if !path.is_file() {
    return Err(
      PackageError::FileNotFound {
        kind: "changelog",
        path: path.to_path_buf(),
      }
      .into(),
    );
  }

  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let updated = insert_entry(&content, entry);
  fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}
