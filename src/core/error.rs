//! Error types for upkeep with contextual messages and exit codes
//!
//! Every failure in a maintenance run ends up here. The orchestrator (not the
//! code that hit the failure) decides whether it aborts the run or only the
//! current package; see `core::config::FailurePolicy`.

use crate::ui::output;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for upkeep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// A package step failed (command, git, version/changelog file, environment)
  Failure = 1,
  /// Configuration or usage error, nothing was attempted
  Usage = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for upkeep
#[derive(Debug)]
pub enum UpkeepError {
  /// Configuration errors
  Config(ConfigError),

  /// Package layout errors (version file, changelog, metadata, environment)
  Package(PackageError),

  /// External command errors
  Command(CommandError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl UpkeepError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    UpkeepError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    UpkeepError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      UpkeepError::Message { message, context, help } => UpkeepError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      UpkeepError::Io(e) => UpkeepError::Message {
        message: ctx_str,
        context: Some(e.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      UpkeepError::Config(_) => ExitCode::Usage,
      _ => ExitCode::Failure,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      UpkeepError::Config(e) => e.help_message(),
      UpkeepError::Package(e) => e.help_message(),
      UpkeepError::Command(e) => e.help_message(),
      UpkeepError::Git(e) => e.help_message(),
      UpkeepError::Message { help, .. } => help.clone(),
      UpkeepError::Io(_) => None,
    }
  }
}

impl fmt::Display for UpkeepError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UpkeepError::Config(e) => write!(f, "{}", e),
      UpkeepError::Package(e) => write!(f, "{}", e),
      UpkeepError::Command(e) => write!(f, "{}", e),
      UpkeepError::Git(e) => write!(f, "{}", e),
      UpkeepError::Io(e) => write!(f, "I/O error: {}", e),
      UpkeepError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for UpkeepError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      UpkeepError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for UpkeepError {
  fn from(err: io::Error) -> Self {
    UpkeepError::Io(err)
  }
}

impl From<String> for UpkeepError {
  fn from(msg: String) -> Self {
    UpkeepError::message(msg)
  }
}

impl From<&str> for UpkeepError {
  fn from(msg: &str) -> Self {
    UpkeepError::message(msg)
  }
}

impl From<toml_edit::de::Error> for UpkeepError {
  fn from(err: toml_edit::de::Error) -> Self {
    UpkeepError::Config(ConfigError::Invalid {
      reason: format!("TOML deserialization error: {}", err),
    })
  }
}

impl From<serde_json::Error> for UpkeepError {
  fn from(err: serde_json::Error) -> Self {
    UpkeepError::message(format!("JSON error: {}", err))
  }
}

impl From<PackageError> for UpkeepError {
  fn from(err: PackageError) -> Self {
    UpkeepError::Package(err)
  }
}

impl From<CommandError> for UpkeepError {
  fn from(err: CommandError) -> Self {
    UpkeepError::Command(err)
  }
}

impl From<GitError> for UpkeepError {
  fn from(err: GitError) -> Self {
    UpkeepError::Git(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// Config parsed but failed validation
  Invalid { reason: String },

  /// Root packages directory is missing
  PackagesDirMissing { path: PathBuf },

  /// --only named a package that is not opted in
  UnknownPackage { name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::PackagesDirMissing { .. } => {
        Some("Set `packages_dir` in upkeep.toml or pass --packages-dir.".to_string())
      }
      ConfigError::UnknownPackage { .. } => Some("Run `upkeep list` to see the opted-in packages.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::Invalid { reason } => write!(f, "Invalid configuration: {}", reason),
      ConfigError::PackagesDirMissing { path } => {
        write!(f, "Packages directory does not exist: {}", path.display())
      }
      ConfigError::UnknownPackage { name } => {
        write!(f, "Package '{}' is not an opted-in package directory", name)
      }
    }
  }
}

/// Package layout errors
#[derive(Debug)]
pub enum PackageError {
  /// Required file (version declaration, changelog, metadata) is missing
  FileNotFound { kind: &'static str, path: PathBuf },

  /// File exists but does not follow the expected grammar
  Parse { path: PathBuf, reason: String },

  /// Isolated executable for the package does not exist
  MissingEnvironment { package: String, path: PathBuf },
}

impl PackageError {
  fn help_message(&self) -> Option<String> {
    match self {
      PackageError::FileNotFound { kind: "metadata file", path } => Some(format!(
        "Create {} with a `main_branch = \"...\"` assignment.",
        path.display()
      )),
      PackageError::MissingEnvironment { package, .. } => Some(format!(
        "Create the environment for '{}' or point `envs_dir` at the right directory.",
        package
      )),
      PackageError::Parse { path, .. } if path.ends_with("__init__.py") => {
        Some("The file must contain exactly one `__version__ = \"MAJOR.MINOR.PATCH\"` assignment.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for PackageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackageError::FileNotFound { kind, path } => {
        write!(f, "{} not found: {}", capitalize(kind), path.display())
      }
      PackageError::Parse { path, reason } => write!(f, "Failed to parse {}: {}", path.display(), reason),
      PackageError::MissingEnvironment { package, path } => {
        write!(f, "Environment for '{}' not found at {}", package, path.display())
      }
    }
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// External command errors
#[derive(Debug)]
pub enum CommandError {
  /// Process could not be started
  SpawnFailed { command: String, reason: String },

  /// Process exited non-zero; `output` is stderr if non-empty, else stdout
  Failed {
    step: String,
    command: String,
    code: Option<i32>,
    output: String,
  },

  /// Working tree had uncommitted changes where a clean tree was required
  DirtyTree { path: PathBuf, status: String },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::SpawnFailed { .. } => Some("Check that the program exists and is executable.".to_string()),
      CommandError::DirtyTree { .. } => Some("Commit or stash the changes, then rerun.".to_string()),
      CommandError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::SpawnFailed { command, reason } => write!(f, "Failed to start `{}`: {}", command, reason),
      CommandError::Failed {
        step,
        command,
        code,
        output,
      } => {
        let code = code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
        write!(f, "{} failed (exit {}): {}", step, code, command)?;
        if !output.trim().is_empty() {
          write!(f, "\n{}", output.trim_end())?;
        }
        Ok(())
      }
      CommandError::DirtyTree { path, status } => {
        write!(f, "Working tree is not clean: {}\n{}", path.display(), status.trim_end())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote branch has commits you don't have. Resolve it manually, then rerun.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Every opted-in package must be a git checkout: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason.trim_end())
      }
    }
  }
}

/// Result type alias for upkeep
pub type UpkeepResult<T> = Result<T, UpkeepError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> UpkeepResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> UpkeepResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<UpkeepError>,
{
  fn context(self, ctx: impl Into<String>) -> UpkeepResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> UpkeepResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error in red, followed by help text
pub fn print_error(error: &UpkeepError) {
  output::failure(&format!("> {}", error));

  if let Some(help) = error.help_message() {
    output::plain(&format!("  Help: {}", help));
  }
}
