//! Integration tests for `upkeep list`

use crate::helpers::{TestPackages, run_upkeep, stdout_json};
use anyhow::Result;

#[test]
fn test_list_shows_opted_in_packages() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_package("django-demo", "main")?;
  pkgs.add_repo("not-opted-in", "main", None)?;

  let output = run_upkeep(&pkgs.path, &["list"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("django-demo"), "stdout: {}", stdout);
  assert!(stdout.contains("django_demo"), "stdout: {}", stdout);
  assert!(stdout.contains("1.2.4"), "stdout: {}", stdout);
  assert!(!stdout.contains("not-opted-in"), "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_list_json_reports_problems_per_package() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_package("alpha", "main")?;
  pkgs.add_repo("beta", "master", Some("main_branch = \"main\"\nmain_branch = \"develop\"\n"))?;

  let output = run_upkeep(&pkgs.path, &["list", "--json"])?;
  let listings = stdout_json(&output)?;
  let listings = listings.as_array().expect("array of packages");
  assert_eq!(listings.len(), 2);

  assert_eq!(listings[0]["name"], "alpha");
  assert_eq!(listings[0]["main_branch"], "main");
  assert_eq!(listings[0]["module"], "alpha");
  assert_eq!(listings[0]["next_version"], "1.2.4");
  assert_eq!(listings[0]["environment_exists"], true);
  assert!(listings[0]["error"].is_null());

  assert_eq!(listings[1]["name"], "beta");
  assert_eq!(listings[1]["environment_exists"], false);
  assert!(
    listings[1]["error"]
      .as_str()
      .unwrap_or_default()
      .contains("more than once")
  );
  Ok(())
}

#[test]
fn test_list_keeps_main_branch_when_module_keys_are_broken() -> Result<()> {
  let pkgs = TestPackages::new()?;
  pkgs.add_repo(
    "gamma",
    "main",
    Some("main_branch = \"main\"\nmodule_name = \"a\"\nmodule_name = \"b\"\n"),
  )?;

  let output = run_upkeep(&pkgs.path, &["list", "--json"])?;
  let listings = stdout_json(&output)?;
  let gamma = &listings[0];
  assert_eq!(gamma["name"], "gamma");
  assert_eq!(gamma["main_branch"], "main");
  assert!(gamma["module"].is_null());
  assert!(gamma["next_version"].is_null());
  assert!(gamma["error"].as_str().unwrap_or_default().contains("`module_name`"));
  Ok(())
}
