use crate::core::context::RunContext;
use crate::core::error::{UpkeepError, UpkeepResult};
use crate::ui::output;
use crate::workflow::{PackageOutcome, RunSummary, run_all};

/// Run maintenance for every selected package.
///
/// Returns an error when any package failed, after the summary is printed.
pub fn run_maintenance(ctx: &RunContext, only: &[String], dry_run: bool, json: bool) -> UpkeepResult<()> {
  let packages = ctx.select_packages(only)?;
  if packages.is_empty() {
    output::info(&format!(
      "No packages opted in under {} (looking for '{}' directories)",
      ctx.config.packages_dir.display(),
      ctx.config.sentinel
    ));
  }

  tracing::info!(count = packages.len(), dry_run, policy = ?ctx.config.on_failure, "starting run");
  let summary = run_all(ctx, &packages, dry_run);

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&summary).map_err(|e| UpkeepError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_summary(&summary);
  }

  if summary.has_failures() {
    let failed = summary.failures();
    return Err(UpkeepError::with_help(
      format!("{} package{} failed", failed, if failed == 1 { "" } else { "s" }),
      "Fix the reported problem and re-run; an existing maintenance branch is reused",
    ));
  }
  Ok(())
}

fn print_summary(summary: &RunSummary) {
  if summary.packages.is_empty() && summary.not_started.is_empty() {
    return;
  }

  output::plain("");
  output::info("Summary");
  output::plain(&format!("{:<32} {:<10} {:<12} DETAIL", "PACKAGE", "STATUS", "VERSION"));
  output::plain(&format!("{:-<90}", ""));

  for report in &summary.packages {
    let (status, version, detail) = match &report.outcome {
      PackageOutcome::Done { version, branch } => ("done", version.as_str(), format!("pushed {}", branch)),
      PackageOutcome::Skipped {
        version,
        branch,
        branch_removed,
      } => (
        "skipped",
        version.as_str(),
        if *branch_removed {
          format!("no changes, removed {}", branch)
        } else {
          format!("no changes, kept {}", branch)
        },
      ),
      PackageOutcome::Planned {
        version,
        branch,
        branch_exists,
      } => (
        "planned",
        version.as_str(),
        format!("{} ({})", branch, if *branch_exists { "reuse" } else { "new" }),
      ),
      PackageOutcome::Failed { state, error } => (
        "failed",
        "-",
        format!("{}: {}", state, error.lines().next().unwrap_or_default()),
      ),
    };
    output::plain(&format!("{:<32} {:<10} {:<12} {}", report.name, status, version, detail));
  }

  for name in &summary.not_started {
    output::plain(&format!("{:<32} {:<10} {:<12} aborted before start", name, "-", "-"));
  }
  output::plain("");

  let line = format!(
    "{} done, {} skipped, {} failed",
    summary.done(),
    summary.skipped(),
    summary.failures()
  );
  if summary.has_failures() {
    output::failure(&line);
  } else {
    output::success(&line);
  }
}
