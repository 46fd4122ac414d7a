mod commands;
mod core;
mod release;
mod telemetry;
#[cfg(test)]
mod testing;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{RolloutError, print_error};

/// Check, version, tag and publish npm packages
#[derive(Parser)]
#[command(name = "rollout")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Show debug diagnostics on stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Emit diagnostics as JSON lines
  #[arg(long, global = true)]
  log_json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Publish a new version of the package in the current directory
  Release(commands::ReleaseArgs),
}

fn main() {
  let cli = Cli::parse();
  telemetry::init_tracing(cli.log_json, telemetry::default_level(cli.verbose));

  let result = match cli.command {
    Commands::Release(args) => commands::run_release(args),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RolloutError) -> ! {
  tracing::debug!(error = %err, exit_code = err.exit_code().as_i32(), "release failed");
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
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
