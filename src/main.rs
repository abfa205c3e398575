mod commands;
mod core;
mod package;
mod release;
mod ui;
mod workflow;

use clap::{Args, Parser, Subcommand};
use core::config::{ConfigOverrides, FailurePolicy};
use core::context::RunContext;
use core::error::{UpkeepError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Run recurring maintenance across a directory of package checkouts
#[derive(Parser)]
#[command(name = "upkeep")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct UpkeepCli {
  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
  /// Config file (default: upkeep.toml, .upkeep.toml or .config/upkeep.toml)
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Directory holding one subdirectory per package checkout
  #[arg(long, global = true, value_name = "DIR")]
  packages_dir: Option<PathBuf>,

  /// Directory holding one environment per package
  #[arg(long, global = true, value_name = "DIR")]
  envs_dir: Option<PathBuf>,

  /// More log output on stderr (-v info, -vv debug); UPKEEP_LOG overrides
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// Render templates, bump, commit and push every opted-in package
  Run {
    /// Only process these packages (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,
    /// What a failing package does to the rest of the run
    #[arg(long, value_enum)]
    on_failure: Option<FailurePolicy>,
    /// Show what would happen without running anything
    #[arg(long)]
    dry_run: bool,
    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
  },

  /// List opted-in packages
  List {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the next patch version of a package
  NextVersion {
    /// Package directory name
    package: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  let filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .with_env_var("UPKEEP_LOG")
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() {
  let cli = UpkeepCli::parse();
  init_logging(cli.global.verbose);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(UpkeepError::from(e).context("Failed to get current directory")),
  };

  let on_failure = match &cli.command {
    Commands::Run { on_failure, .. } => *on_failure,
    _ => None,
  };
  let overrides = ConfigOverrides {
    packages_dir: cli.global.packages_dir,
    envs_dir: cli.global.envs_dir,
    on_failure,
  };

  if let Commands::Run { json: true, .. } | Commands::List { json: true } = &cli.command {
    ui::output::set_machine_mode(true);
  }

  let ctx = match RunContext::build(&cwd, cli.global.config.as_deref(), &overrides) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Run {
      only, dry_run, json, ..
    } => commands::run_maintenance(&ctx, &only, dry_run, json),
    Commands::List { json } => commands::run_list(&ctx, json),
    Commands::NextVersion { package } => commands::run_next_version(&ctx, &package),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: UpkeepError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
