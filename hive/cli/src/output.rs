use hive_lib::detect::{DetectionReport, Status, Summary};
use hive_lib::doctor::{CheckResult, DoctorReport};
use hive_lib::setup::{RunObserver, Step};
use hive_lib::{HiveConfig, RunnerError, StepError};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Colors a status symbol for stdout.
fn symbol(status: Status) -> String {
    let sym = status.symbol();
    match status {
        Status::Ok => sym.if_supports_color(Stream::Stdout, |t| t.green()).to_string(),
        Status::Warning => sym
            .if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string(),
        Status::Error | Status::Missing => {
            sym.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
        }
        Status::Unknown => sym.to_string(),
    }
}

fn dimmed(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.dimmed())
        .to_string()
}

pub fn print_json<T: Serialize>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints setup progress as each step starts and finishes.
pub struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn on_start(&mut self, step: &dyn Step) {
        println!("→ {}...", step.name());
    }

    fn on_done(&mut self, step: &dyn Step, skipped: bool, error: Option<&StepError>) {
        let name = step.name();
        match error {
            Some(err) => println!("  {} {name}: {err}", symbol(Status::Error)),
            None if skipped => println!(
                "  {} {name} {}",
                symbol(Status::Ok),
                dimmed("(already done)")
            ),
            None => println!("  {} {name}", symbol(Status::Ok)),
        }
    }
}

pub fn print_setup_header(config: &HiveConfig) {
    println!(
        "{}",
        "🐝 hive-mcp setup".if_supports_color(Stream::Stdout, |t| t.bold())
    );
    println!("   {}", dimmed(&config.hive_mcp_dir.display().to_string()));
    println!();
}

pub fn print_setup_complete() {
    println!();
    println!(
        "{}",
        "Setup complete!".if_supports_color(Stream::Stdout, |t| t.green())
    );
    println!();
    println!("Next steps:");
    println!("  1. Restart your shell or run: source ~/.bashrc");
    println!("  2. Verify with: hive doctor");
    println!("  3. Start using: claude");
    println!();
}

pub fn print_setup_failed(err: &RunnerError) {
    println!();
    println!(
        "{} {err}",
        "Setup failed:".if_supports_color(Stream::Stdout, |t| t.red())
    );
    println!("Run 'hive doctor' to diagnose issues.");
}

pub fn print_rollback(errors: &[RunnerError]) {
    println!();
    if errors.is_empty() {
        println!("Rolled back completed steps.");
        return;
    }
    println!("Rollback finished with {} error(s):", errors.len());
    for err in errors {
        println!("  {} {err}", symbol(Status::Error));
    }
}

fn print_summary(summary: Summary) {
    println!();
    println!("{}", rule());
    let mut parts = Vec::new();
    if summary.ok > 0 {
        parts.push(
            format!("{} passed", summary.ok)
                .if_supports_color(Stream::Stdout, |t| t.green())
                .to_string(),
        );
    }
    if summary.warn > 0 {
        parts.push(
            format!("{} warnings", summary.warn)
                .if_supports_color(Stream::Stdout, |t| t.yellow())
                .to_string(),
        );
    }
    if summary.fail > 0 {
        parts.push(
            format!("{} failed", summary.fail)
                .if_supports_color(Stream::Stdout, |t| t.red())
                .to_string(),
        );
    }
    println!("Summary: {}", parts.join(", "));
}

pub fn print_detection(report: &DetectionReport) {
    println!("System Detection Results");
    println!("{}", rule());

    let platform = &report.platform;
    println!("\nPlatform:");
    let distro = match (&platform.distro, &platform.version) {
        (Some(distro), Some(version)) => format!(" {distro} {version}"),
        (Some(distro), None) => format!(" {distro}"),
        _ => String::new(),
    };
    println!(
        "  {} {}{distro} ({}) {}",
        symbol(platform.status),
        platform.os,
        platform.package_manager.as_deref().unwrap_or("no package manager"),
        dimmed(&platform.arch)
    );

    let shell = &report.shell;
    println!("\nShell:");
    match &shell.version {
        Some(version) => println!("  {} {} {}", symbol(shell.status), shell.name, dimmed(version)),
        None => println!("  {} {}", symbol(shell.status), shell.name),
    }
    if let Some(file) = &shell.config_file {
        println!("    Config: {}", file.display());
    }

    println!("\nPrerequisites:");
    for prereq in &report.prereqs {
        println!(
            "  {} {}: {} (requires {})",
            symbol(prereq.status),
            prereq.name,
            prereq.version.as_deref().unwrap_or("not found"),
            prereq.required
        );
    }

    println!("\nServices:");
    for service in &report.services {
        if service.status == Status::Ok {
            match &service.endpoint {
                Some(endpoint) => println!(
                    "  {} {}: running at {endpoint}",
                    symbol(service.status),
                    service.name
                ),
                None => println!("  {} {}: running", symbol(service.status), service.name),
            }
        } else {
            let detail = service.message.as_deref().unwrap_or("not running");
            println!("  {} {}: {detail}", symbol(service.status), service.name);
        }
    }

    println!("\nEnvironment Variables:");
    for var in &report.env_vars {
        match &var.value {
            Some(value) => println!("  {} {}: {value}", symbol(var.status), var.name),
            None if var.required => {
                println!("  {} {}: not set (required)", symbol(var.status), var.name)
            }
            None => println!("  {} {}: not set (optional)", symbol(var.status), var.name),
        }
    }

    print_summary(report.summary());

    println!();
    if report.is_ready() {
        println!("{} System is ready for hive-mcp setup", symbol(Status::Ok));
    } else {
        println!(
            "{} Please resolve issues before running setup",
            symbol(Status::Error)
        );
    }
}

fn print_check(check: &CheckResult) {
    if check.message.is_empty() {
        println!("  {} {}", symbol(check.status), check.name);
    } else {
        println!("  {} {}: {}", symbol(check.status), check.name, check.message);
    }

    if check.is_ok() {
        return;
    }
    if let Some(details) = &check.details {
        println!("    {}", dimmed(details));
    }
    if let Some(hint) = &check.fix_hint {
        println!(
            "    {} {hint}",
            "Fix:".if_supports_color(Stream::Stdout, |t| t.cyan())
        );
    }
}

pub fn print_doctor(report: &DoctorReport) {
    println!();
    println!("hive-mcp Health Check");
    println!("{}", rule());

    for category in &report.categories {
        println!("\n{}:", category.name);
        for check in &category.checks {
            print_check(check);
        }
    }

    print_summary(report.summary());

    println!();
    if report.is_healthy() {
        println!("{} hive-mcp is healthy", symbol(Status::Ok));
    } else {
        println!("{} Some issues need attention", symbol(Status::Error));
        let fixable = report.fixable().len();
        if fixable > 0 {
            println!(
                "\nRun 'hive doctor --fix' to attempt automatic fixes for {fixable} issue(s)"
            );
        }
    }
}

pub fn print_fix_outcome(check: &CheckResult, error: Option<&StepError>) {
    match error {
        None => println!(
            "Fixing {}... {}",
            check.name,
            "done".if_supports_color(Stream::Stdout, |t| t.green())
        ),
        Some(err) => println!(
            "Fixing {}... {}",
            check.name,
            format!("failed: {err}").if_supports_color(Stream::Stdout, |t| t.red())
        ),
    }
}
