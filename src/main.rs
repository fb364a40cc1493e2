mod checker;
mod commands;
mod core;
mod engine;

use clap::{Parser, Subcommand};
use crate::core::error::{OmniError, print_error};
use std::path::PathBuf;

/// Run pluggable static-analysis checks and aggregate one result
#[derive(Parser)]
#[command(name = "omnicheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run checks and fail if any produce output
  Check {
    /// Checker types to run (default: all known checkers)
    checks: Vec<String>,
    /// Path to the project configuration file
    #[arg(long, default_value = "omnicheck.yml")]
    config: PathBuf,
    /// Project root directory checks run against
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
    /// Checker asset executable (repeatable)
    #[arg(long = "asset")]
    assets: Vec<PathBuf>,
    /// Package path to check (repeatable, default: ".")
    #[arg(long = "pkg")]
    pkgs: Vec<String>,
    /// Run concurrency-safe checks in parallel
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", default_value_t = true)]
    parallel: bool,
  },

  /// Invoke a checker's underlying tool directly
  RunCheck {
    /// Checker type whose tool to invoke
    check: String,
    /// Path to the project configuration file
    #[arg(long, default_value = "omnicheck.yml")]
    config: PathBuf,
    /// Checker asset executable (repeatable)
    #[arg(long = "asset")]
    assets: Vec<PathBuf>,
    /// Arguments passed through to the tool verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
  },

  /// List available checkers with priority and concurrency class
  Checkers {
    /// Path to the project configuration file
    #[arg(long, default_value = "omnicheck.yml")]
    config: PathBuf,
    /// Checker asset executable (repeatable)
    #[arg(long = "asset")]
    assets: Vec<PathBuf>,
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

fn main() {
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Check {
      checks,
      config,
      project_dir,
      assets,
      pkgs,
      parallel,
    } => commands::run_check(checks, &config, project_dir, &assets, pkgs, parallel),
    Commands::RunCheck {
      check,
      config,
      assets,
      args,
    } => commands::run_run_check(check, &config, &assets, args),
    Commands::Checkers { config, assets } => commands::run_checkers(&config, &assets),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: OmniError) -> ! {
  // check failures were already reported line by line on stdout; anything
  // else gets the pretty-printer
  if !matches!(err, OmniError::ChecksFailed) {
    print_error(&err);
  }
  std::process::exit(err.exit_code().as_i32());
}
