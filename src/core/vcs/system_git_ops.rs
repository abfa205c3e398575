//! Branch, staging, commit and push operations for SystemGit

use super::system_git::SystemGit;
use crate::core::error::{GitError, ResultExt, UpkeepError, UpkeepResult};

impl SystemGit {
  /// `git status --porcelain` output; empty means a clean tree
  pub fn status_porcelain(&self) -> UpkeepResult<String> {
    let output = self.run(&["status", "--porcelain"])?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }

  /// True when there are no staged, unstaged or untracked changes
  pub fn is_clean(&self) -> UpkeepResult<bool> {
    Ok(self.status_porcelain()?.trim().is_empty())
  }

  /// Check for a local branch with exactly this name
  pub fn branch_exists(&self, branch_name: &str) -> UpkeepResult<bool> {
    let output = self.run(&["branch", "--list", "--format=%(refname:short)", branch_name])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().any(|line| line.trim() == branch_name))
  }

  /// Checkout a branch
  pub fn checkout_branch(&self, branch_name: &str) -> UpkeepResult<()> {
    self.run(&["checkout", branch_name])?;
    Ok(())
  }

  /// Create and checkout a branch from the current HEAD
  pub fn create_and_checkout_branch(&self, branch_name: &str) -> UpkeepResult<()> {
    self.run(&["checkout", "-b", branch_name])?;
    Ok(())
  }

  /// Force-delete a local branch (must not be checked out)
  pub fn delete_branch(&self, branch_name: &str) -> UpkeepResult<()> {
    self.run(&["branch", "-D", branch_name])?;
    Ok(())
  }

  /// Stage every change, including untracked and deleted files
  pub fn stage_all(&self) -> UpkeepResult<()> {
    self.run(&["add", "-A"])?;
    Ok(())
  }

  /// Commit staged changes
  pub fn commit(&self, message: &str) -> UpkeepResult<()> {
    self.run(&["commit", "-m", message])?;
    Ok(())
  }

  /// Push a branch and set it as upstream
  pub fn push_upstream(&self, remote_name: &str, branch: &str) -> UpkeepResult<()> {
    let output = self
      .git_cmd()
      .args(["push", "-u", remote_name, branch])
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(UpkeepError::Git(GitError::PushFailed {
        remote: remote_name.to_string(),
        branch: branch.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }
}
