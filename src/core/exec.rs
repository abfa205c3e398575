//! External command execution
//!
//! Every tool invocation (installer, template renderer, linter, test runner)
//! goes through [`CommandRunner`]. Commands always run with an explicit
//! working directory; the process-wide current directory is never touched.
//!
//! Outcomes:
//! - exit 0: captured stdout is echoed as a green `> ...` line
//! - non-zero: returned as [`CommandError::Failed`] carrying stderr (or stdout
//!   if stderr is empty); the caller decides what a failure means for the run
//! - best-effort: stdout is printed and the exit status is ignored

use crate::core::config::CommandSpec;
use crate::core::error::{CommandError, UpkeepResult};
use crate::ui::output;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Values substituted into `{name}` placeholders of a command
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
  values: BTreeMap<&'static str, String>,
}

impl Placeholders {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
    self.values.insert(key, value.into());
    self
  }

  /// Replace every known `{key}`; unknown braces are left alone
  pub fn expand(&self, input: &str) -> String {
    let mut out = input.to_string();
    for (key, value) in &self.values {
      out = out.replace(&format!("{{{}}}", key), value);
    }
    out
  }
}

/// Result of one finished external invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub command: String,
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  /// stderr if present, otherwise stdout
  pub fn failure_text(&self) -> &str {
    if self.stderr.trim().is_empty() { &self.stdout } else { &self.stderr }
  }
}

/// A command bound to a working directory, ready to run
#[derive(Debug, Clone)]
pub struct PreparedCommand {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
}

impl PreparedCommand {
  /// Expand placeholders and turn a [`CommandSpec`] into a program + argv.
  /// Returns `None` for a disabled (empty) spec.
  pub fn from_spec(spec: &CommandSpec, placeholders: &Placeholders, cwd: &Path) -> Option<Self> {
    if spec.is_disabled() {
      return None;
    }
    let (program, args) = match spec {
      CommandSpec::Args(argv) => {
        let mut argv = argv.iter().map(|a| placeholders.expand(a));
        let program = argv.next()?;
        (program, argv.collect())
      }
      CommandSpec::Shell(line) => {
        let line = placeholders.expand(line);
        if cfg!(windows) {
          ("cmd".to_string(), vec!["/C".to_string(), line])
        } else {
          ("sh".to_string(), vec!["-c".to_string(), line])
        }
      }
    };
    Some(Self {
      program,
      args,
      cwd: cwd.to_path_buf(),
    })
  }

  /// Human-readable command line
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Runs prepared commands synchronously, capturing output
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
  pub fn new() -> Self {
    Self
  }

  /// Spawn and wait, without interpreting the exit status
  pub fn capture(&self, cmd: &PreparedCommand) -> UpkeepResult<CommandOutput> {
    let command = cmd.display();
    tracing::debug!(command = %command, cwd = %cmd.cwd.display(), "spawning");

    let output = Command::new(&cmd.program)
      .args(&cmd.args)
      .current_dir(&cmd.cwd)
      .output()
      .map_err(|e| CommandError::SpawnFailed {
        command: command.clone(),
        reason: e.to_string(),
      })?;

    let result = CommandOutput {
      command,
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!(command = %result.command, code = ?result.code, "finished");
    Ok(result)
  }

  /// Run a step that must succeed; echoes stdout in green on success
  pub fn run(&self, step: &str, cmd: &PreparedCommand) -> UpkeepResult<CommandOutput> {
    let result = self.capture(cmd)?;
    if !result.success() {
      return Err(
        CommandError::Failed {
          step: step.to_string(),
          command: result.command.clone(),
          code: result.code,
          output: result.failure_text().to_string(),
        }
        .into(),
      );
    }
    output::success(&format!("> {}", result.stdout));
    Ok(result)
  }

  /// Run a step whose exit status is informational only
  pub fn run_best_effort(&self, step: &str, cmd: &PreparedCommand) -> UpkeepResult<CommandOutput> {
    let result = self.capture(cmd)?;
    if !result.success() {
      tracing::info!(step, code = ?result.code, "best-effort step exited non-zero");
    }
    output::plain(&result.stdout);
    Ok(result)
  }
}
