//! Branch Coordinator
//!
//! Maintenance branches are named after the version they will release:
//! `maintenance/v{next}`. A branch left over from an earlier run is reused;
//! otherwise a new one is cut from the main branch. A branch this run created
//! is deleted again if rendering produced no changes.

use crate::core::error::UpkeepResult;
use crate::core::vcs::SystemGit;
use semver::Version;

pub const BRANCH_PREFIX: &str = "maintenance/v";

/// `maintenance/v{version}`
pub fn maintenance_branch_name(version: &Version) -> String {
  format!("{}{}", BRANCH_PREFIX, version)
}

/// The branch a workflow is working on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSetup {
  pub name: String,
  /// Created by this run (as opposed to reused)
  pub created: bool,
}

pub struct BranchCoordinator<'a> {
  git: &'a SystemGit,
  main_branch: &'a str,
}

impl<'a> BranchCoordinator<'a> {
  pub fn new(git: &'a SystemGit, main_branch: &'a str) -> Self {
    Self { git, main_branch }
  }

  pub fn main_branch(&self) -> &str {
    self.main_branch
  }

  pub fn checkout_main(&self) -> UpkeepResult<()> {
    self.git.checkout_branch(self.main_branch)
  }

  /// Switch to the maintenance branch for `next`, creating it if needed.
  /// Expects the main branch to be checked out.
  pub fn setup(&self, next: &Version) -> UpkeepResult<BranchSetup> {
    let name = maintenance_branch_name(next);
    if self.git.branch_exists(&name)? {
      tracing::info!(branch = %name, "reusing existing maintenance branch");
      self.git.checkout_branch(&name)?;
      Ok(BranchSetup { name, created: false })
    } else {
      tracing::info!(branch = %name, from = %self.main_branch, "creating maintenance branch");
      self.git.create_and_checkout_branch(&name)?;
      Ok(BranchSetup { name, created: true })
    }
  }

  /// Leave a branch that got no changes: back to main, and delete it if this
  /// run created it. Returns whether the branch was deleted.
  pub fn discard(&self, setup: &BranchSetup) -> UpkeepResult<bool> {
    self.checkout_main()?;
    if setup.created {
      self.git.delete_branch(&setup.name)?;
    }
    Ok(setup.created)
  }

  /// Make sure the branch for `version` is checked out before committing.
  ///
  /// Normally this is the branch from [`setup`](Self::setup). It differs when
  /// a reused branch already carried a bumped version file.
  pub fn ensure(&self, version: &Version) -> UpkeepResult<BranchSetup> {
    let name = maintenance_branch_name(version);
    if self.git.current_branch()? == name {
      return Ok(BranchSetup { name, created: false });
    }
    if self.git.branch_exists(&name)? {
      self.git.checkout_branch(&name)?;
      Ok(BranchSetup { name, created: false })
    } else {
      self.git.create_and_checkout_branch(&name)?;
      Ok(BranchSetup { name, created: true })
    }
  }
}
