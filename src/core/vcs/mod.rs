pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

/// Fresh repository on `main` with one commit, for unit tests
#[cfg(test)]
pub(crate) fn test_repo() -> (tempfile::TempDir, SystemGit) {
  use std::process::Command;

  let tmp = tempfile::TempDir::new().unwrap();
  let git = |args: &[&str]| {
    let status = Command::new("git").current_dir(tmp.path()).args(args).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
  };
  git(&["init", "--initial-branch=main"]);
  git(&["config", "user.name", "Test User"]);
  git(&["config", "user.email", "test@example.com"]);
  std::fs::write(tmp.path().join("README.md"), "demo\n").unwrap();
  git(&["add", "."]);
  git(&["commit", "-m", "init"]);

  let sys = SystemGit::open(tmp.path()).unwrap();
  (tmp, sys)
}
