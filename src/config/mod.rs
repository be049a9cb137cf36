//! Configuration module
//!
//! Handles loading and merging reporter configuration from files, the
//! environment, and the command line.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;
pub(crate) use file::is_yaml_file;

use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;
use crate::reporter::OrderingPolicy;
use crate::utils::LogLevel;

/// Reporter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Output format name (spec, list, minimal, json, json-pretty)
    pub format: String,

    /// How completions ahead of the queue front are handled
    pub ordering: OrderingPolicy,

    /// Colorize terminal output
    pub color: bool,

    pub log_level: LogLevel,

    /// Sleep for scripted test durations while replaying
    pub realtime: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            format: "spec".to_string(),
            ordering: OrderingPolicy::Strict,
            color: true,
            log_level: LogLevel::Warn,
            realtime: false,
        }
    }
}

impl ReporterConfig {
    /// Apply environment overrides on top of this configuration
    pub fn apply_env(&mut self, env: &EnvConfig) -> anyhow::Result<()> {
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(ordering) = &env.ordering {
            self.ordering = OrderingPolicy::from_str(ordering)
                .ok_or_else(|| anyhow::anyhow!("Unknown ordering policy: {ordering}"))?;
        }
        if let Some(level) = &env.log_level {
            self.log_level = LogLevel::from_str(level)
                .ok_or_else(|| anyhow::anyhow!("Unknown log level: {level}"))?;
        }
        if env.no_color == Some(true) {
            self.color = false;
        }
        if let Some(realtime) = env.realtime {
            self.realtime = realtime;
        }
        Ok(())
    }

    pub fn output_format(&self) -> anyhow::Result<OutputFormat> {
        OutputFormat::from_str(&self.format)
            .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", self.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReporterConfig::default();
        assert_eq!(config.format, "spec");
        assert_eq!(config.ordering, OrderingPolicy::Strict);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Spec);
    }

    #[test]
    fn test_apply_env() {
        let mut config = ReporterConfig::default();
        let env = EnvConfig {
            format: Some("json".to_string()),
            ordering: Some("Buffered".to_string()),
            no_color: Some(true),
            ..EnvConfig::default()
        };

        config.apply_env(&env).unwrap();
        assert_eq!(config.output_format().unwrap(), OutputFormat::Json);
        assert_eq!(config.ordering, OrderingPolicy::Buffered);
        assert!(!config.color);
    }

    #[test]
    fn test_apply_env_rejects_unknown_ordering() {
        let mut config = ReporterConfig::default();
        let env = EnvConfig {
            ordering: Some("sometimes".to_string()),
            ..EnvConfig::default()
        };
        assert!(config.apply_env(&env).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ReporterConfig = serde_yaml::from_str("ordering: buffered").unwrap();
        assert_eq!(config.ordering, OrderingPolicy::Buffered);
        assert_eq!(config.format, "spec");
        assert!(config.color);
    }
}
