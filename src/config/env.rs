//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "LANE_REPORT";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Output format from LANE_REPORT_FORMAT
    pub format: Option<String>,
    /// Ordering policy from LANE_REPORT_ORDERING
    pub ordering: Option<String>,
    /// Log level from LANE_REPORT_LOG_LEVEL
    pub log_level: Option<String>,
    /// Disable color from LANE_REPORT_NO_COLOR
    pub no_color: Option<bool>,
    /// Realtime replay from LANE_REPORT_REALTIME
    pub realtime: Option<bool>,
    /// Config file from LANE_REPORT_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            format: get_env("FORMAT"),
            ordering: get_env("ORDERING"),
            log_level: get_env("LOG_LEVEL"),
            no_color: get_env_bool("NO_COLOR"),
            realtime: get_env_bool("REALTIME"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.format.is_some()
            || self.ordering.is_some()
            || self.log_level.is_some()
            || self.no_color.is_some()
            || self.realtime.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_FORMAT:     {:?}", ENV_PREFIX, self.format);
        println!("  {}_ORDERING:   {:?}", ENV_PREFIX, self.ordering);
        println!("  {}_LOG_LEVEL:  {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_NO_COLOR:   {:?}", ENV_PREFIX, self.no_color);
        println!("  {}_REALTIME:   {:?}", ENV_PREFIX, self.realtime);
        println!("  {}_CONFIG:     {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all LANE_REPORT environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_FORMAT      Output format (spec, list, minimal, json, json-pretty)");
    println!("  {ENV_PREFIX}_ORDERING    Ordering policy (strict, buffered)");
    println!("  {ENV_PREFIX}_LOG_LEVEL   Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_NO_COLOR    Disable colored output (true/false)");
    println!("  {ENV_PREFIX}_REALTIME    Sleep for scripted durations (true/false)");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_ORDERING=buffered");
    println!("  lane-report run task.yaml");
}
