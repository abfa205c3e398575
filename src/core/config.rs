use crate::core::error::{ConfigError, ResultExt, UpkeepError, UpkeepResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for upkeep
/// Searched in order: upkeep.toml, .upkeep.toml, .config/upkeep.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpkeepConfig {
  /// Root directory holding one subdirectory per package checkout
  #[serde(default = "default_packages_dir")]
  pub packages_dir: PathBuf,

  /// Root directory holding one isolated environment per package name
  #[serde(default = "default_envs_dir")]
  pub envs_dir: PathBuf,

  /// Name of the opt-in marker directory inside a package
  #[serde(default = "default_sentinel")]
  pub sentinel: String,

  /// Metadata file inside the sentinel directory
  #[serde(default = "default_metadata_file")]
  pub metadata_file: String,

  /// What to do when a package fails
  #[serde(default)]
  pub on_failure: FailurePolicy,

  /// Remote the maintenance branch is pushed to
  #[serde(default = "default_remote")]
  pub remote: String,

  #[serde(default)]
  pub environment: EnvironmentConfig,

  #[serde(default)]
  pub steps: StepsConfig,

  #[serde(default)]
  pub changelog: ChangelogConfig,
}

fn default_packages_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_envs_dir() -> PathBuf {
  PathBuf::from("~/.virtualenvs")
}

fn default_sentinel() -> String {
  ".ambient-package-update".to_string()
}

fn default_metadata_file() -> String {
  "metadata.py".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

/// Whether a failing package stops the whole run or only itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
  /// Stop at the first failure, leaving remaining packages untouched
  #[default]
  Abort,
  /// Record the failure and continue with the next package
  Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
  /// Executable path relative to `{envs_dir}/{package}`
  #[serde(default = "default_executable")]
  pub executable: PathBuf,
}

fn default_executable() -> PathBuf {
  if cfg!(windows) {
    PathBuf::from("Scripts").join("python.exe")
  } else {
    PathBuf::from("bin").join("python")
  }
}

impl Default for EnvironmentConfig {
  fn default() -> Self {
    Self {
      executable: default_executable(),
    }
  }
}

/// A command is either an argv array or a shell string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
  Args(Vec<String>),
  Shell(String),
}

impl CommandSpec {
  fn args(args: &[&str]) -> Self {
    CommandSpec::Args(args.iter().map(|s| s.to_string()).collect())
  }

  /// An empty argv or blank shell string disables the step
  pub fn is_disabled(&self) -> bool {
    match self {
      CommandSpec::Args(args) => args.is_empty(),
      CommandSpec::Shell(line) => line.trim().is_empty(),
    }
  }
}

/// External tool invocations, in workflow order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepsConfig {
  #[serde(default = "default_self_update")]
  pub self_update: CommandSpec,
  #[serde(default = "default_update_tool")]
  pub update_tool: CommandSpec,
  #[serde(default = "default_render_templates")]
  pub render_templates: CommandSpec,
  #[serde(default = "default_lint")]
  pub lint: CommandSpec,
  #[serde(default = "default_test")]
  pub test: CommandSpec,
}

fn default_self_update() -> CommandSpec {
  CommandSpec::args(&["{python}", "-m", "pip", "install", "--upgrade", "pip"])
}

fn default_update_tool() -> CommandSpec {
  CommandSpec::args(&["{python}", "-m", "pip", "install", "-U", "ambient-package-update"])
}

fn default_render_templates() -> CommandSpec {
  CommandSpec::args(&["{python}", "-m", "ambient_package_update.cli", "render-templates"])
}

fn default_lint() -> CommandSpec {
  CommandSpec::args(&["pre-commit", "run", "--all-files", "--hook-stage", "push"])
}

fn default_test() -> CommandSpec {
  CommandSpec::args(&["{python}", "-m", "pytest", "--ds", "settings", "tests"])
}

impl Default for StepsConfig {
  fn default() -> Self {
    Self {
      self_update: default_self_update(),
      update_tool: default_update_tool(),
      render_templates: default_render_templates(),
      lint: default_lint(),
      test: default_test(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogConfig {
  /// Changelog path relative to the package root
  #[serde(default = "default_changelog_file")]
  pub file: PathBuf,

  /// Bullet line written under each maintenance entry
  #[serde(default = "default_bullet")]
  pub bullet: String,
}

fn default_changelog_file() -> PathBuf {
  PathBuf::from("CHANGES.md")
}

fn default_bullet() -> String {
  "  * Maintenance updates via ambient-package-update".to_string()
}

impl Default for ChangelogConfig {
  fn default() -> Self {
    Self {
      file: default_changelog_file(),
      bullet: default_bullet(),
    }
  }
}

impl Default for UpkeepConfig {
  fn default() -> Self {
    Self {
      packages_dir: default_packages_dir(),
      envs_dir: default_envs_dir(),
      sentinel: default_sentinel(),
      metadata_file: default_metadata_file(),
      on_failure: FailurePolicy::default(),
      remote: default_remote(),
      environment: EnvironmentConfig::default(),
      steps: StepsConfig::default(),
      changelog: ChangelogConfig::default(),
    }
  }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  pub packages_dir: Option<PathBuf>,
  pub envs_dir: Option<PathBuf>,
  pub on_failure: Option<FailurePolicy>,
}

impl UpkeepConfig {
  /// Find config file in search order: upkeep.toml, .upkeep.toml, .config/upkeep.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("upkeep.toml"),
      path.join(".upkeep.toml"),
      path.join(".config").join("upkeep.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Parse a config from TOML text
  pub fn parse(content: &str) -> UpkeepResult<Self> {
    let config: UpkeepConfig = toml_edit::de::from_str(content)?;
    Ok(config)
  }

  /// Load config for a run started in `cwd`.
  ///
  /// An explicit path must exist. Without one, the search order above is used
  /// and defaults apply when nothing is found. Relative paths are resolved
  /// against the config file's directory (or `cwd`), and `~` is expanded.
  pub fn load(cwd: &Path, explicit: Option<&Path>, overrides: &ConfigOverrides) -> UpkeepResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        let path = cwd.join(path);
        if !path.is_file() {
          return Err(UpkeepError::Config(ConfigError::NotFound { path }));
        }
        Some(path)
      }
      None => Self::find_config_path(cwd),
    };

    let (mut config, base) = match config_path {
      Some(path) => {
        let content =
          fs::read_to_string(&path).with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = Self::parse(&content).map_err(|e| match e {
          UpkeepError::Config(ConfigError::Invalid { reason }) => UpkeepError::Config(ConfigError::Invalid {
            reason: format!("{} ({})", reason, path.display()),
          }),
          other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
        (config, base)
      }
      None => (Self::default(), cwd.to_path_buf()),
    };

    config.packages_dir = resolve_path(&base, &config.packages_dir);
    config.envs_dir = resolve_path(&base, &config.envs_dir);

    if let Some(dir) = &overrides.packages_dir {
      config.packages_dir = resolve_path(cwd, dir);
    }
    if let Some(dir) = &overrides.envs_dir {
      config.envs_dir = resolve_path(cwd, dir);
    }
    if let Some(policy) = overrides.on_failure {
      config.on_failure = policy;
    }

    config.validate()?;
    Ok(config)
  }

  /// Validate values that serde cannot check
  pub fn validate(&self) -> UpkeepResult<()> {
    if self.sentinel.trim().is_empty() {
      return Err(invalid("`sentinel` must not be empty"));
    }
    if self.sentinel.contains('/') || self.sentinel.contains('\\') {
      return Err(invalid(format!(
        "`sentinel` must be a single directory name, got '{}'",
        self.sentinel
      )));
    }
    if self.metadata_file.trim().is_empty() {
      return Err(invalid("`metadata_file` must not be empty"));
    }
    if self.remote.trim().is_empty() {
      return Err(invalid("`remote` must not be empty"));
    }
    if self.steps.render_templates.is_disabled() {
      return Err(invalid("`steps.render_templates` cannot be disabled"));
    }
    Ok(())
  }
}

fn invalid(reason: impl Into<String>) -> UpkeepError {
  UpkeepError::Config(ConfigError::Invalid { reason: reason.into() })
}

/// Expand a leading `~` and make relative paths absolute against `base`
fn resolve_path(base: &Path, path: &Path) -> PathBuf {
  if let Ok(rest) = path.strip_prefix("~")
    && let Some(home) = home_dir()
  {
    return home.join(rest);
  }
  if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME")
    .or_else(|| std::env::var_os("USERPROFILE"))
    .map(PathBuf::from)
}
