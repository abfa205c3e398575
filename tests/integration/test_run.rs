//! Integration tests for `upkeep run`

use crate::helpers::{TestPackages, git, run_upkeep, run_upkeep_raw, stdout_json};
use anyhow::Result;

#[test]
fn test_run_commits_and_pushes_maintenance_branch() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.render_tracked_changes()?;

  let output = run_upkeep(&pkgs.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Processing alpha..."), "stdout: {}", stdout);
  assert!(!stdout.contains("skipping"), "stdout: {}", stdout);

  assert!(pkgs.read_file("alpha", "alpha/__init__.py")?.contains("__version__ = \"1.2.4\""));

  let changes = pkgs.read_file("alpha", "CHANGES.md")?;
  let lines: Vec<&str> = changes.lines().collect();
  assert_eq!(lines[0], "# Changelog");
  let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
  assert_eq!(lines[2], format!("**1.2.4** ({})", today), "changelog: {}", changes);
  assert_eq!(lines[3], "  * Maintenance updates via ambient-package-update");
  assert!(changes.contains("**1.2.3** (2024-01-15)"));

  assert_eq!(pkgs.current_branch("alpha")?, "maintenance/v1.2.4");
  assert_eq!(
    pkgs.log_subjects("alpha", "HEAD", 2)?,
    vec!["Maintenance (v1.2.4)", "Initial commit"]
  );
  assert!(pkgs.remote_has_branch("alpha", "maintenance/v1.2.4")?);

  let upstream = git(
    &pkgs.package_path("alpha"),
    &["rev-parse", "--abbrev-ref", "maintenance/v1.2.4@{upstream}"],
  )?;
  assert_eq!(String::from_utf8_lossy(&upstream.stdout).trim(), "origin/maintenance/v1.2.4");

  assert_eq!(pkgs.read_file("alpha", ".editorconfig")?, "root = true\nindent_size = 4\n");

  // Rendered edit and bookkeeping edits all landed in the one commit
  let status = git(&pkgs.package_path("alpha"), &["status", "--porcelain"])?;
  assert!(status.stdout.is_empty());
  let committed = git(
    &pkgs.package_path("alpha"),
    &["show", "--name-only", "--format=", "HEAD"],
  )?;
  let committed = String::from_utf8_lossy(&committed.stdout);
  for file in [".editorconfig", "CHANGES.md", "alpha/__init__.py"] {
    assert!(committed.lines().any(|line| line == file), "committed: {}", committed);
  }
  Ok(())
}

#[test]
fn test_run_without_changes_skips_and_removes_branch() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;

  let output = run_upkeep(&pkgs.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("skipping"), "stdout: {}", stdout);

  assert_eq!(pkgs.current_branch("alpha")?, "main");
  assert!(!pkgs.branch_exists("alpha", "maintenance/v1.2.4")?);
  assert!(pkgs.read_file("alpha", "alpha/__init__.py")?.contains("__version__ = \"1.2.3\""));
  assert!(!pkgs.remote_has_branch("alpha", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_run_defaults_to_master_branch() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("legacy", "master")?;
  pkgs.render_changes()?;

  run_upkeep(&pkgs.path, &["run"])?;
  assert_eq!(
    pkgs.log_subjects("legacy", "maintenance/v1.2.4", 2)?,
    vec!["Maintenance (v1.2.4)", "Initial commit"]
  );
  Ok(())
}

#[test]
fn test_run_reuses_existing_branch() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  let alpha = pkgs.add_package("alpha", "main")?;
  git(&alpha, &["checkout", "-b", "maintenance/v1.2.4"])?;
  std::fs::write(alpha.join("NOTES.txt"), "from an earlier run\n")?;
  git(&alpha, &["add", "."])?;
  git(&alpha, &["commit", "-m", "Earlier work"])?;
  git(&alpha, &["checkout", "main"])?;
  pkgs.render_changes()?;

  run_upkeep(&pkgs.path, &["run"])?;

  assert_eq!(
    pkgs.log_subjects("alpha", "maintenance/v1.2.4", 3)?,
    vec!["Maintenance (v1.2.4)", "Earlier work", "Initial commit"]
  );
  assert!(pkgs.package_path("alpha").join("NOTES.txt").exists());
  Ok(())
}

#[test]
fn test_run_keeps_reused_branch_without_changes() -> Result<()> {
  let pkgs = TestPackages::new()?;
  let alpha = pkgs.add_package("alpha", "main")?;
  git(&alpha, &["branch", "maintenance/v1.2.4"])?;

  let output = run_upkeep(&pkgs.path, &["run", "--json"])?;
  let summary = stdout_json(&output)?;
  let report = &summary["packages"][0];
  assert_eq!(report["name"], "alpha");
  assert_eq!(report["status"], "skipped");
  assert_eq!(report["branch_removed"], false);

  assert!(pkgs.branch_exists("alpha", "maintenance/v1.2.4")?);
  assert_eq!(pkgs.current_branch("alpha")?, "main");
  Ok(())
}

#[test]
fn test_run_ignores_directories_without_sentinel() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.add_repo("gamma", "main", None)?;
  pkgs.render_changes()?;

  let output = run_upkeep(&pkgs.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(!stdout.contains("gamma"), "stdout: {}", stdout);
  assert!(!pkgs.package_path("gamma").join("RENDERED.txt").exists());
  assert_eq!(pkgs.current_branch("gamma")?, "main");
  Ok(())
}

#[test]
fn test_run_missing_environment_aborts_run() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_repo("alpha", "main", Some("main_branch = \"main\"\n"))?;
  pkgs.add_package("beta", "main")?;
  pkgs.render_changes()?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--json"])?;
  assert_eq!(output.status.code(), Some(1));

  let summary = stdout_json(&output)?;
  assert_eq!(summary["packages"][0]["name"], "alpha");
  assert_eq!(summary["packages"][0]["status"], "failed");
  assert_eq!(summary["not_started"][0], "beta");

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("alpha"), "stderr: {}", stderr);

  assert!(!pkgs.branch_exists("beta", "maintenance/v1.2.4")?);
  assert!(!pkgs.package_path("beta").join("RENDERED.txt").exists());
  Ok(())
}

#[test]
fn test_run_skip_policy_continues_after_failure() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_repo("alpha", "main", Some("main_branch = \"main\"\n"))?;
  pkgs.add_package("beta", "main")?;
  pkgs.render_changes()?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--on-failure", "skip"])?;
  assert_eq!(output.status.code(), Some(1));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("1 done, 0 skipped, 1 failed"), "stdout: {}", stdout);
  assert!(pkgs.remote_has_branch("beta", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_run_dirty_tree_fails_clean_check() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  let alpha = pkgs.add_package("alpha", "main")?;
  std::fs::write(alpha.join("scratch.txt"), "uncommitted\n")?;
  pkgs.render_changes()?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--json"])?;
  assert_eq!(output.status.code(), Some(1));

  let summary = stdout_json(&output)?;
  assert_eq!(summary["packages"][0]["status"], "failed");
  assert_eq!(summary["packages"][0]["state"], "clean_check");
  assert!(!pkgs.package_path("alpha").join("RENDERED.txt").exists());
  Ok(())
}

#[test]
fn test_run_failing_tests_stop_before_commit() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.render_changes()?;
  pkgs.set_step("test", "echo 2 failed >&2; exit 1")?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--json"])?;
  assert_eq!(output.status.code(), Some(1));

  let summary = stdout_json(&output)?;
  assert_eq!(summary["packages"][0]["state"], "verify");
  assert!(
    summary["packages"][0]["error"]
      .as_str()
      .unwrap_or_default()
      .contains("2 failed")
  );

  assert_eq!(pkgs.log_subjects("alpha", "HEAD", 1)?, vec!["Initial commit"]);
  assert!(!pkgs.remote_has_branch("alpha", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_run_best_effort_lint_failure_is_tolerated_once() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.render_changes()?;
  // Fails the first time, passes once the marker exists
  pkgs.set_step("lint", "if [ -f .linted ]; then rm .linted; else touch .linted; exit 1; fi")?;

  run_upkeep(&pkgs.path, &["run"])?;
  assert!(pkgs.remote_has_branch("alpha", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_run_announces_disabled_lint_for_both_passes() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.render_changes()?;
  pkgs.disable_step("lint")?;

  let output = run_upkeep(&pkgs.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(
    stdout.contains("> Linting and formatting\n> (disabled)\n"),
    "stdout: {}",
    stdout
  );
  assert!(
    stdout.contains("> Re-running linting and formatting\n> (disabled)\n"),
    "stdout: {}",
    stdout
  );
  assert!(pkgs.remote_has_branch("alpha", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.render_changes()?;

  let output = run_upkeep(&pkgs.path, &["run", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("maintenance/v1.2.4"), "stdout: {}", stdout);
  assert!(stdout.contains("planned"), "stdout: {}", stdout);

  assert_eq!(pkgs.current_branch("alpha")?, "main");
  assert!(!pkgs.branch_exists("alpha", "maintenance/v1.2.4")?);
  assert!(!pkgs.package_path("alpha").join("RENDERED.txt").exists());
  Ok(())
}

#[test]
fn test_run_only_selects_packages() -> Result<()> {
  let mut pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.add_package("beta", "main")?;
  pkgs.render_changes()?;

  run_upkeep(&pkgs.path, &["run", "--only", "beta"])?;
  assert!(pkgs.remote_has_branch("beta", "maintenance/v1.2.4")?);
  assert!(!pkgs.branch_exists("alpha", "maintenance/v1.2.4")?);
  Ok(())
}

#[test]
fn test_run_only_unknown_package_is_usage_error() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--only", "nope"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}

#[test]
fn test_run_missing_explicit_config_is_usage_error() -> Result<()> {
  let pkgs = TestPackages::new()?;

  let output = run_upkeep_raw(&pkgs.path, &["run", "--config", "missing.toml"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}
