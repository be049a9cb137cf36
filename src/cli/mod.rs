//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ordered test result reporting across parallel browser lanes
#[derive(Parser, Debug)]
#[command(name = "lane-report")]
#[command(version = "0.1.0")]
#[command(about = "Replay a test task across parallel lanes and report results in order")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (spec, list, minimal, json, json-pretty)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Ordering policy for completions ahead of the queue front (strict, buffered)
    #[arg(long, global = true)]
    pub ordering: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a task file and report its results
    Run(RunArgs),

    /// Check a task file without running it
    Validate {
        /// Task file (YAML or JSON)
        task_file: PathBuf,
    },

    /// Write an example task file
    Init {
        /// Output path
        #[arg(default_value = "task.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Task file (YAML or JSON)
    pub task_file: PathBuf,

    /// Sleep for the scripted test durations
    #[arg(long)]
    pub realtime: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Create a configuration file with default values
    Init {
        #[arg(default_value = "./lane-report.yaml")]
        output: PathBuf,

        #[arg(long)]
        force: bool,
    },

    /// Show environment variables and their current values
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "lane-report",
            "run",
            "task.yaml",
            "--realtime",
            "--format",
            "list",
            "--ordering",
            "buffered",
        ]);
        assert_eq!(args.format.as_deref(), Some("list"));
        assert_eq!(args.ordering.as_deref(), Some("buffered"));
        assert!(!args.no_color);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.task_file, PathBuf::from("task.yaml"));
                assert!(run_args.realtime);
                assert!(run_args.output.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_config_args() {
        let args = Args::parse_from(["lane-report", "--no-color", "config", "show", "--json"]);
        assert!(args.no_color);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Show { json },
            }) => assert!(json),
            _ => panic!("Expected Config Show command"),
        }
    }

    #[test]
    fn test_init_default_output() {
        let args = Args::parse_from(["lane-report", "init"]);
        match args.command {
            Command::Init { output, force } => {
                assert_eq!(output, PathBuf::from("task.yaml"));
                assert!(!force);
            }
            _ => panic!("Expected Init command"),
        }
    }
}
