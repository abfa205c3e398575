//! System git backend
//!
//! Each [`SystemGit`] is bound to one package checkout and runs every command
//! as `git -C <root>`, so nothing depends on the process working directory.

use crate::core::error::{GitError, ResultExt, UpkeepError, UpkeepResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables passed through to git (everything else is cleared).
///
/// Credential helpers run as children of `git push` and read their own
/// configuration and keyring session from these.
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "USERPROFILE",
  "SYSTEMROOT",
  "APPDATA",
  "LOCALAPPDATA",
  "XDG_CONFIG_HOME",
  "XDG_RUNTIME_DIR",
  "DBUS_SESSION_BUS_ADDRESS",
  "TMPDIR",
  "TEMP",
  "TMP",
  "SSH_AUTH_SOCK",
  "SSH_ASKPASS",
  "GIT_SSH_COMMAND",
  "GIT_ASKPASS",
  "GIT_TERMINAL_PROMPT",
];

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> UpkeepResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(UpkeepError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(UpkeepError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root as reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get current branch name
  pub fn current_branch(&self) -> UpkeepResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git command and fail with the full command line on non-zero exit
  pub(crate) fn run(&self, args: &[&str]) -> UpkeepResult<Output> {
    tracing::debug!(repo = %self.repo_path.display(), args = ?args, "git");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(UpkeepError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables, passing through only [`PASSTHROUGH_ENV`]
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust GIT_DIR & co. from the caller)
    cmd.env_clear();
    for key in PASSTHROUGH_ENV {
      if let Some(value) = std::env::var_os(key) {
        cmd.env(key, value);
      }
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("color.ui=false");

    cmd
  }
}
