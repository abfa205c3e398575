//! Integration tests for `upkeep next-version`

use crate::helpers::{TestPackages, git, run_upkeep, run_upkeep_raw};
use anyhow::Result;

#[test]
fn test_next_version_prints_patch_bump() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;

  let output = run_upkeep(&pkgs.path, &["next-version", "alpha"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1.2.4");

  // Peeking never writes
  let status = git(&pkgs.package_path("alpha"), &["status", "--porcelain"])?;
  assert!(status.stdout.is_empty());
  Ok(())
}

#[test]
fn test_next_version_follows_module_name() -> Result<()> {
  let pkgs = TestPackages::new()?;
  let pkg = pkgs.add_repo(
    "ai-core",
    "main",
    Some("package_name = \"ai-core\"\nmodule_name = \"ai_django_core\"\n"),
  )?;
  std::fs::create_dir_all(pkg.join("ai_django_core"))?;
  std::fs::write(pkg.join("ai_django_core/__init__.py"), "__version__ = \"7.0.19\"\n")?;
  git(&pkg, &["add", "."])?;
  git(&pkg, &["commit", "-m", "Add module"])?;

  let output = run_upkeep(&pkgs.path, &["next-version", "ai-core"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7.0.20");
  Ok(())
}

#[test]
fn test_next_version_missing_version_file_fails() -> Result<()> {
  let pkgs = TestPackages::new()?;
  let pkg = pkgs.add_package("alpha", "main")?;
  std::fs::remove_file(pkg.join("alpha/__init__.py"))?;

  let output = run_upkeep_raw(&pkgs.path, &["next-version", "alpha"])?;
  assert_eq!(output.status.code(), Some(1));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Version file not found"), "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_next_version_unknown_package_is_usage_error() -> Result<()> {
  let pkgs = TestPackages::new()?;

  let output = run_upkeep_raw(&pkgs.path, &["next-version", "nope"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}
