//! lane-report - ordered test result reporting for parallel lanes
//!
//! A test task runs every test once per lane (one lane per browser), and the
//! lanes finish tests at different times. lane-report aggregates the per-lane
//! results into one result per test and reports them to a single reporter in
//! the order the tests were scheduled, with a fixture header before each
//! group of tests.
//!
//! ## Usage
//!
//! ```bash
//! # Write an example task file
//! lane-report init task.yaml
//!
//! # Replay it and report results
//! lane-report run task.yaml
//!
//! # Hold early completions instead of rejecting them
//! lane-report --ordering buffered --format json-pretty run task.yaml
//!
//! # Check a task file
//! lane-report validate task.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

mod cli;
mod config;
mod executor;
mod models;
mod output;
mod reporter;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig, ReporterConfig};
use executor::{TaskRunner, TaskScript};
use output::{ResultFormatter, StreamPlugin};
use reporter::OrderingPolicy;
use utils::{init_logger, LogLevel, Timer};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let config = resolve_config(&args, &env)?;
    init_logger(config.log_level);

    if env.has_any() {
        info!("Applied LANE_REPORT_* environment overrides");
    }

    match args.command {
        cli::Command::Run(run_args) => {
            let all_passed = run_task(run_args, config).await?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        cli::Command::Validate { task_file } => {
            validate_task(&task_file)?;
        }
        cli::Command::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Task file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }
            TaskScript::example().save(&output)?;
            println!("✓ Task file created: {}", output.display());
            println!("\nRun it with: lane-report run {}", output.display());
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &config)?;
        }
    }

    Ok(())
}

/// Merge configuration: command line over environment over file over defaults
fn resolve_config(args: &Args, env: &EnvConfig) -> Result<ReporterConfig> {
    let file = match (&args.config, &env.config_file) {
        (Some(path), _) => ConfigFile::load(path)?,
        (None, Some(path)) => ConfigFile::load(path)?,
        (None, None) => ConfigFile::load_default()?,
    };

    let mut config = file.reporter;
    config.apply_env(env)?;

    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if let Some(ordering) = &args.ordering {
        config.ordering = OrderingPolicy::from_str(ordering)
            .ok_or_else(|| anyhow::anyhow!("Unknown ordering policy: {ordering}"))?;
    }
    if let Some(level) = &args.log_level {
        config.log_level = LogLevel::from_str(level)
            .ok_or_else(|| anyhow::anyhow!("Unknown log level: {level}"))?;
    }
    if args.no_color {
        config.color = false;
    }

    config.output_format()?;
    Ok(config)
}

/// Replay a task file; returns whether every test passed
async fn run_task(args: cli::RunArgs, mut config: ReporterConfig) -> Result<bool> {
    let script = TaskScript::load(&args.task_file)?;
    config.realtime |= args.realtime;

    let mut formatter = ResultFormatter::new(config.output_format()?);
    if !config.color || args.output.is_some() {
        formatter = formatter.no_color();
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(io::stdout()),
    };

    info!(
        "Running {} ({} tests, {} lanes, {} ordering)",
        args.task_file.display(),
        script.test_count(),
        script.user_agents.len(),
        config.ordering
    );

    let timer = Timer::start("task");
    let runner = TaskRunner::new()
        .with_ordering(config.ordering)
        .with_realtime(config.realtime);
    let (summary, plugin) = runner
        .run(&script, StreamPlugin::new(out, formatter))
        .await?;
    timer.stop();

    let mut out = plugin.finish().context("Failed to write report")?;
    out.flush().context("Failed to write report")?;

    if let Some(path) = &args.output {
        println!("✓ Report saved to: {}", path.display());
    }
    for warning in &summary.warnings {
        warn!("{warning}");
    }
    info!("{summary}");

    Ok(summary.is_all_passed())
}

fn validate_task(path: &Path) -> Result<()> {
    let script = TaskScript::load(path)?;

    match script.validate() {
        Ok(()) => {
            println!("✓ Task file is valid: {}", path.display());
            println!(
                "  {} user agents, {} fixtures, {} tests",
                script.user_agents.len(),
                script.fixtures.len(),
                script.test_count()
            );
        }
        Err(e) => {
            println!("✗ Task file is invalid: {}", path.display());
            println!("  Error: {e}");
            return Err(e);
        }
    }

    let warnings = script.warnings();
    if !warnings.is_empty() {
        println!("\nWarnings ({}):", warnings.len());
        for warning in warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, effective: &ReporterConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show { json } => {
            let file = ConfigFile {
                reporter: effective.clone(),
                ..ConfigFile::default()
            };
            let output = if json {
                serde_json::to_string_pretty(&file)?
            } else {
                serde_yaml::to_string(&file)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }
            ConfigFile::default().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            EnvConfig::load().print_summary();
        }
    }

    Ok(())
}
