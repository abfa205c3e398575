//! Package Workflow - one package, start to finish
//!
//! clean check -> tool update -> branch setup -> render -> diff check
//! -> (skip | version bump + changelog -> lint/tests -> commit -> push)
//!
//! Every file and process operation takes the package root explicitly.

use super::branch::{BranchCoordinator, maintenance_branch_name};
use super::state::{MaintenanceState, PackageOutcome};
use crate::core::config::CommandSpec;
use crate::core::context::RunContext;
use crate::core::error::{CommandError, UpkeepResult};
use crate::core::exec::{CommandRunner, Placeholders, PreparedCommand};
use crate::core::vcs::SystemGit;
use crate::package::{PackageDir, PackageMetadata, resolve_executable};
use crate::release::{ChangelogEntry, append_entry, commit_increment, peek_next_version};
use crate::ui::output;
use std::path::PathBuf;

/// Everything resolved about a package before any step runs
struct Prepared {
  python: PathBuf,
  metadata: PackageMetadata,
  git: SystemGit,
  placeholders: Placeholders,
}

pub struct PackageWorkflow<'a> {
  ctx: &'a RunContext,
  package: &'a PackageDir,
  runner: CommandRunner,
  state: MaintenanceState,
}

impl<'a> PackageWorkflow<'a> {
  pub fn new(ctx: &'a RunContext, package: &'a PackageDir) -> Self {
    Self {
      ctx,
      package,
      runner: CommandRunner::new(),
      state: MaintenanceState::CleanCheck,
    }
  }

  /// Last state entered (the failing one, after an error)
  pub fn state(&self) -> MaintenanceState {
    self.state
  }

  fn enter(&mut self, state: MaintenanceState) {
    tracing::debug!(package = %self.package.name, from = %self.state, to = %state, "transition");
    self.state = state;
  }

  fn prepare(&self) -> UpkeepResult<Prepared> {
    let config = &self.ctx.config;
    let python = resolve_executable(&config.envs_dir, &self.package.name, &config.environment.executable)?;
    let metadata = PackageMetadata::load(&self.ctx.metadata_path(self.package), &self.package.name)?;
    let git = SystemGit::open(&self.package.root)?;
    let placeholders = Placeholders::new()
      .with("python", python.to_string_lossy())
      .with("package", self.package.name.as_str())
      .with("module", metadata.module_name.as_str());

    tracing::info!(
      package = %self.package.name,
      work_tree = %git.work_tree().display(),
      main_branch = %metadata.main_branch,
      module = %metadata.module_name,
      "prepared package"
    );

    Ok(Prepared {
      python,
      metadata,
      git,
      placeholders,
    })
  }

  fn prepared_command(&self, spec: &CommandSpec, placeholders: &Placeholders) -> Option<PreparedCommand> {
    PreparedCommand::from_spec(spec, placeholders, &self.package.root)
  }

  /// Run a required step; a disabled step is announced and skipped
  fn run_step(&self, label: &str, spec: &CommandSpec, placeholders: &Placeholders) -> UpkeepResult<()> {
    output::step(label);
    match self.prepared_command(spec, placeholders) {
      Some(cmd) => {
        self.runner.run(label, &cmd)?;
      }
      None => output::success("> (disabled)"),
    }
    Ok(())
  }

  fn run_best_effort_step(&self, label: &str, spec: &CommandSpec, placeholders: &Placeholders) -> UpkeepResult<()> {
    output::step(label);
    match self.prepared_command(spec, placeholders) {
      Some(cmd) => {
        self.runner.run_best_effort(label, &cmd)?;
      }
      None => output::success("> (disabled)"),
    }
    Ok(())
  }

  fn require_clean(&self, git: &SystemGit) -> UpkeepResult<()> {
    let status = git.status_porcelain()?;
    if !status.trim().is_empty() {
      return Err(
        CommandError::DirtyTree {
          path: self.package.root.clone(),
          status,
        }
        .into(),
      );
    }
    Ok(())
  }

  /// Run the full maintenance workflow.
  ///
  /// Errors leave [`state`](Self::state) pointing at the step that failed.
  pub fn run(&mut self) -> UpkeepResult<PackageOutcome> {
    let span = tracing::info_span!("package", package = %self.package.name);
    let _guard = span.enter();

    output::info(&format!("Processing {}...", self.package.name));
    let Prepared {
      python: _,
      metadata,
      git,
      placeholders,
    } = self.prepare()?;
    let ctx = self.ctx;
    let steps = &ctx.config.steps;
    let branches = BranchCoordinator::new(&git, &metadata.main_branch);
    let version_file = metadata.version_file(&self.package.root);

    self.enter(MaintenanceState::CleanCheck);
    output::step("Check if repo is clean and contains no uncommitted changes");
    self.require_clean(&git)?;
    output::success("> Working tree clean");

    self.enter(MaintenanceState::ToolUpdate);
    self.run_step("Self-updating pip", &steps.self_update, &placeholders)?;
    self.run_step("Updating ambient package updater", &steps.update_tool, &placeholders)?;

    self.enter(MaintenanceState::BranchSetup);
    output::step(&format!("Switching to {}", branches.main_branch()));
    branches.checkout_main()?;
    let next = peek_next_version(&version_file)?;
    let setup = branches.setup(&next)?;
    let verb = if setup.created { "Created" } else { "Reusing" };
    output::success(&format!("> {} branch {}", verb, setup.name));

    self.enter(MaintenanceState::Render);
    self.run_step("Rendering configuration templates", &steps.render_templates, &placeholders)?;

    self.enter(MaintenanceState::DiffCheck);
    output::step("Checking for changes");
    if git.is_clean()? {
      let branch_removed = branches.discard(&setup)?;
      self.enter(MaintenanceState::Skipped);
      output::info(&format!("> No changes for {}, skipping", self.package.name));
      return Ok(PackageOutcome::Skipped {
        version: next.to_string(),
        branch: setup.name,
        branch_removed,
      });
    }

    self.enter(MaintenanceState::Mutate);
    output::step("Incrementing version patch release");
    let version = commit_increment(&version_file)?;
    output::success(&format!("> {}", version));

    output::step("Adding release notes to changelog");
    let changelog = self.package.root.join(&ctx.config.changelog.file);
    let entry = ChangelogEntry::new(version.clone(), ctx.today, ctx.config.changelog.bullet.as_str());
    append_entry(&changelog, &entry)?;
    output::success(&format!("> {}", entry.header()));

    self.enter(MaintenanceState::Verify);
    // The formatter fixes what it can on the first pass; the second pass decides
    self.run_best_effort_step("Linting and formatting", &steps.lint, &placeholders)?;
    self.run_step("Re-running linting and formatting", &steps.lint, &placeholders)?;
    self.run_step("Running unit-tests", &steps.test, &placeholders)?;

    self.enter(MaintenanceState::Commit);
    let branch = branches.ensure(&version)?;
    let message = format!("Maintenance (v{})", version);
    output::step(&format!("Committing '{}' on {}", message, branch.name));
    git.stage_all()?;
    git.commit(&message)?;
    self.require_clean(&git)?;

    self.enter(MaintenanceState::Push);
    output::step(&format!("Pushing {} to {}", branch.name, ctx.config.remote));
    git.push_upstream(&ctx.config.remote, &branch.name)?;
    output::success(&format!("> Pushed {}/{}", ctx.config.remote, branch.name));

    self.enter(MaintenanceState::Done);
    Ok(PackageOutcome::Done {
      version: version.to_string(),
      branch: branch.name,
    })
  }

  /// Resolve what a run would do without running anything.
  ///
  /// The version is read from whatever branch is currently checked out.
  pub fn plan(&mut self) -> UpkeepResult<PackageOutcome> {
    output::info(&format!("Planning {}...", self.package.name));
    let prepared = self.prepare()?;
    let ctx = self.ctx;
    let steps = &ctx.config.steps;

    self.enter(MaintenanceState::BranchSetup);
    let next = peek_next_version(&prepared.metadata.version_file(&self.package.root))?;
    let branch = maintenance_branch_name(&next);
    let branch_exists = prepared.git.branch_exists(&branch)?;

    output::plain(&format!("  Environment:  {}", prepared.python.display()));
    output::plain(&format!("  Main branch:  {}", prepared.metadata.main_branch));
    output::plain(&format!("  Next version: {}", next));
    output::plain(&format!(
      "  Branch:       {} ({})",
      branch,
      if branch_exists { "exists, reuse" } else { "new" }
    ));
    output::plain("  Steps:");
    let planned = [
      ("self-update", &steps.self_update),
      ("update tool", &steps.update_tool),
      ("render", &steps.render_templates),
      ("lint", &steps.lint),
      ("test", &steps.test),
    ];
    for (label, spec) in planned {
      let line = self
        .prepared_command(spec, &prepared.placeholders)
        .map(|cmd| cmd.display())
        .unwrap_or_else(|| "(disabled)".to_string());
      output::plain(&format!("    {:<12} {}", label, line));
    }

    Ok(PackageOutcome::Planned {
      version: next.to_string(),
      branch,
      branch_exists,
    })
  }
}
