//! Per-package maintenance states and outcomes

use serde::Serialize;
use std::fmt;

/// Where a package workflow currently is.
///
/// ```text
/// CleanCheck -> ToolUpdate -> BranchSetup -> Render -> DiffCheck -+-> Skipped
///                                                                 |
///                    Done <- Push <- Commit <- Verify <- Mutate <-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
  CleanCheck,
  ToolUpdate,
  BranchSetup,
  Render,
  DiffCheck,
  Mutate,
  Verify,
  Commit,
  Push,
  Done,
  Skipped,
}

impl MaintenanceState {
  pub fn label(&self) -> &'static str {
    match self {
      Self::CleanCheck => "clean check",
      Self::ToolUpdate => "tool update",
      Self::BranchSetup => "branch setup",
      Self::Render => "render",
      Self::DiffCheck => "diff check",
      Self::Mutate => "version bump",
      Self::Verify => "verify",
      Self::Commit => "commit",
      Self::Push => "push",
      Self::Done => "done",
      Self::Skipped => "skipped",
    }
  }
}

impl fmt::Display for MaintenanceState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// How one package's run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageOutcome {
  /// Maintenance commit pushed
  Done { version: String, branch: String },
  /// Rendering changed nothing
  Skipped {
    version: String,
    branch: String,
    branch_removed: bool,
  },
  /// Dry run: what a real run would start with
  Planned {
    version: String,
    branch: String,
    branch_exists: bool,
  },
  /// Failed in `state`; only recorded when the run continues past failures
  Failed { state: MaintenanceState, error: String },
}

impl PackageOutcome {
  pub fn is_failure(&self) -> bool {
    matches!(self, Self::Failed { .. })
  }
}
