//! Maintenance workflow
//!
//! - **state**: per-package states and outcomes
//! - **branch**: maintenance branch naming and lifecycle
//! - **package**: the per-package sequence
//!
//! [`run_all`] processes packages strictly one after another, in name order.

pub mod branch;
pub mod package;
pub mod state;

pub use package::PackageWorkflow;
pub use state::{MaintenanceState, PackageOutcome};

use crate::core::config::FailurePolicy;
use crate::core::context::RunContext;
use crate::core::error::print_error;
use crate::package::PackageDir;
use serde::Serialize;

/// Outcome for one package, as reported in the run summary
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
  pub name: String,
  #[serde(flatten)]
  pub outcome: PackageOutcome,
}

/// Everything a run did, in processing order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
  pub packages: Vec<PackageReport>,
  /// Packages never reached because the run aborted
  pub not_started: Vec<String>,
}

impl RunSummary {
  pub fn failures(&self) -> usize {
    self.packages.iter().filter(|r| r.outcome.is_failure()).count()
  }

  pub fn has_failures(&self) -> bool {
    self.failures() > 0
  }

  fn count(&self, pred: impl Fn(&PackageOutcome) -> bool) -> usize {
    self.packages.iter().filter(|r| pred(&r.outcome)).count()
  }

  pub fn done(&self) -> usize {
    self.count(|o| matches!(o, PackageOutcome::Done { .. }))
  }

  pub fn skipped(&self) -> usize {
    self.count(|o| matches!(o, PackageOutcome::Skipped { .. }))
  }
}

/// Run (or plan) every package.
///
/// A failing package is reported immediately. Under [`FailurePolicy::Abort`]
/// the remaining packages are listed as not started; under
/// [`FailurePolicy::Skip`] the run moves on to the next one.
pub fn run_all(ctx: &RunContext, packages: &[PackageDir], dry_run: bool) -> RunSummary {
  let mut summary = RunSummary::default();

  for (index, package) in packages.iter().enumerate() {
    let mut workflow = PackageWorkflow::new(ctx, package);
    let result = if dry_run { workflow.plan() } else { workflow.run() };

    match result {
      Ok(outcome) => {
        tracing::info!(package = %package.name, state = %workflow.state(), "package finished");
        summary.packages.push(PackageReport {
          name: package.name.clone(),
          outcome,
        });
      }
      Err(err) => {
        let state = workflow.state();
        tracing::warn!(package = %package.name, %state, error = %err, "package failed");
        print_error(&err);
        summary.packages.push(PackageReport {
          name: package.name.clone(),
          outcome: PackageOutcome::Failed {
            state,
            error: err.to_string(),
          },
        });

        if ctx.config.on_failure == FailurePolicy::Abort {
          summary.not_started = packages[index + 1..].iter().map(|p| p.name.clone()).collect();
          break;
        }
      }
    }
  }

  summary
}
