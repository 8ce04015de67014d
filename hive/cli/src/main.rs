use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use hive_lib::setup::{Runner, default_plan};
use hive_lib::{HiveConfig, Platform, detect, doctor};

mod output;

use output::ConsoleObserver;

/// Install and health-check the hive-mcp environment
#[derive(Parser)]
#[command(name = "hive", version, about, after_help = AFTER_HELP)]
struct Cli {
    /// Config file (defaults to ~/.config/hive/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report what is installed and running, without changing anything
    Detect {
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Install and configure every component, skipping what is already done
    Setup {
        /// Where to clone hive-mcp
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Undo the steps this run performed, newest first, when a step fails
        #[arg(long)]
        rollback_on_failure: bool,
    },

    /// Diagnose an existing installation
    #[command(visible_aliases = ["dr", "diagnose"])]
    Doctor {
        /// Attempt automatic fixes for fixable issues
        #[arg(short, long)]
        fix: bool,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

const AFTER_HELP: &str = "\
SETUP STEPS:
  1. Clone hive-mcp repository
  2. Configure shell environment (HIVE_MCP_DIR, BB_MCP_DIR)
  3. Install system prerequisites
  4. Download Clojure dependencies
  5. Sync Doom Emacs packages
  6. Start Docker services (Chroma)
  7. Setup Ollama with the embedding model
  8. Start Emacs daemon
  9. Register MCP server with Claude CLI

  Steps that are already done are skipped, so setup can be re-run safely.
";

fn init_logging(verbose: bool) {
    // Without RUST_LOG or -v no subscriber is installed.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else if verbose {
        tracing_subscriber::EnvFilter::new("hive_lib=debug,hive=debug")
    } else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = HiveConfig::load(cli.config.as_deref()).wrap_err("failed to load config")?;

    match cli.command {
        Command::Detect { json } => run_detect(&config, json),
        Command::Setup {
            dir,
            rollback_on_failure,
        } => {
            let config = match dir {
                Some(dir) => config.with_dir(dir),
                None => config,
            };
            run_setup(&config, rollback_on_failure)
        }
        Command::Doctor { fix, json } => run_doctor(&config, fix, json),
    }
}

fn run_detect(config: &HiveConfig, json: bool) -> color_eyre::Result<ExitCode> {
    let platform = Platform::detect();
    if !json {
        println!("Detecting system configuration...");
        println!();
    }

    let report = detect::run(config, &platform)?;
    if json {
        output::print_json(&report)?;
    } else {
        output::print_detection(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_setup(config: &HiveConfig, rollback_on_failure: bool) -> color_eyre::Result<ExitCode> {
    let platform = Platform::detect();
    tracing::debug!(%platform, dir = %config.hive_mcp_dir.display(), "Starting setup");

    output::print_setup_header(config);
    let steps = default_plan(config, &platform).wrap_err("failed to build setup plan")?;

    let mut runner = Runner::with_observer(&steps, Box::new(ConsoleObserver));
    match runner.run_all() {
        Ok(()) => {
            output::print_setup_complete();
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output::print_setup_failed(&err);
            if rollback_on_failure {
                output::print_rollback(&runner.rollback_attempted());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_doctor(config: &HiveConfig, fix: bool, json: bool) -> color_eyre::Result<ExitCode> {
    if !json {
        println!("Running hive-mcp health checks...");
    }

    let report = doctor::run(config)?;
    if json {
        output::print_json(&report)?;
    } else {
        output::print_doctor(&report);
    }

    if !fix {
        return Ok(ExitCode::SUCCESS);
    }

    if report.fixable().is_empty() {
        println!("\nNo fixable issues found.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("\nAttempting automatic fixes...");
    let tally = report.run_fixes(config, output::print_fix_outcome);
    println!("\nFixed {} issue(s), {} failed", tally.fixed, tally.failed);

    if tally.fixed > 0 {
        println!("\nRe-running health checks...");
        let report = doctor::run(config)?;
        output::print_doctor(&report);
    }
    Ok(ExitCode::SUCCESS)
}
