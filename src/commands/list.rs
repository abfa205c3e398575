use serde::Serialize;
use std::path::PathBuf;

use crate::core::context::RunContext;
use crate::core::error::{UpkeepError, UpkeepResult};
use crate::package::environment::executable_path;
use crate::package::{PackageDir, PackageMetadata, main_branch_name};
use crate::release::peek_next_version;
use crate::ui::output;

/// What upkeep resolved for one opted-in package
#[derive(Debug, Clone, Serialize)]
pub struct PackageListing {
  pub name: String,
  pub root: PathBuf,
  pub main_branch: Option<String>,
  pub module: Option<String>,
  pub next_version: Option<String>,
  pub environment: PathBuf,
  pub environment_exists: bool,
  /// First problem found while resolving (metadata or version file)
  pub error: Option<String>,
}

fn describe(ctx: &RunContext, package: &PackageDir) -> PackageListing {
  let environment = executable_path(&ctx.config.envs_dir, &package.name, &ctx.config.environment.executable);
  let mut listing = PackageListing {
    name: package.name.clone(),
    root: package.root.clone(),
    main_branch: None,
    module: None,
    next_version: None,
    environment_exists: environment.exists(),
    environment,
    error: None,
  };

  let metadata_path = ctx.metadata_path(package);
  match PackageMetadata::load(&metadata_path, &package.name) {
    Ok(metadata) => {
      match peek_next_version(&metadata.version_file(&package.root)) {
        Ok(next) => listing.next_version = Some(next.to_string()),
        Err(e) => listing.error = Some(e.to_string()),
      }
      listing.main_branch = Some(metadata.main_branch);
      listing.module = Some(metadata.module_name);
    }
    Err(e) => {
      listing.main_branch = main_branch_name(&metadata_path).ok();
      listing.error = Some(e.to_string());
    }
  }
  listing
}

/// List opted-in packages. Problems are reported per package, not as a failure.
pub fn run_list(ctx: &RunContext, json: bool) -> UpkeepResult<()> {
  let listings: Vec<PackageListing> = ctx.packages()?.iter().map(|p| describe(ctx, p)).collect();

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&listings).map_err(|e| UpkeepError::message(format!("Serialization error: {}", e)))?
    );
    return Ok(());
  }

  if listings.is_empty() {
    output::info(&format!(
      "No packages opted in under {}",
      ctx.config.packages_dir.display()
    ));
    return Ok(());
  }

  println!(
    "{:<32} {:<20} {:<12} {:<12} ENV",
    "PACKAGE", "MODULE", "BRANCH", "NEXT"
  );
  println!("{:-<90}", "");
  for listing in &listings {
    let dash = || "-".to_string();
    println!(
      "{:<32} {:<20} {:<12} {:<12} {}",
      listing.name,
      listing.module.clone().unwrap_or_else(dash),
      listing.main_branch.clone().unwrap_or_else(dash),
      listing.next_version.clone().unwrap_or_else(dash),
      if listing.environment_exists { "ok" } else { "missing" }
    );
    if let Some(error) = &listing.error {
      output::failure(&format!("  {}", error));
    }
  }
  Ok(())
}
