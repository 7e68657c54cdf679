use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;

pub const DEFAULT_TICK_MS: u64 = 1000;
pub const MIN_TICK_MS: u64 = 10;
pub const MAX_TICK_MS: u64 = 60_000;

const ENV_TICK_MS: &str = "TASKBOARD_TICK_MS";
const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid tick interval `{0}`: expected milliseconds between 10 and 60000")]
    InvalidTick(String),
    #[error("unsupported log level `{0}`; expected error|warn|info|debug|trace")]
    UnknownLogLevel(String),
    #[error("log directory cannot be empty")]
    EmptyLogDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

/// Runtime settings. Each value comes from the command line, then the
/// environment, then the built-in default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tick_interval: Duration,
    pub log_level: LogLevel,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_sources(cli, |key| std::env::var(key).ok())
    }

    fn from_sources(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tick_ms = match (cli.tick_ms, env(ENV_TICK_MS)) {
            (Some(ms), _) => ms,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTick(raw.clone()))?,
            (None, None) => DEFAULT_TICK_MS,
        };
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&tick_ms) {
            return Err(ConfigError::InvalidTick(tick_ms.to_string()));
        }

        let log_level = match cli.log_level.clone().or_else(|| env(ENV_LOG_LEVEL)) {
            Some(raw) => raw.parse()?,
            None => LogLevel::Info,
        };

        let log_dir = match cli.log_dir.clone().or_else(|| env(ENV_LOG_DIR).map(PathBuf::from)) {
            Some(dir) if dir.as_os_str().is_empty() => return Err(ConfigError::EmptyLogDir),
            Some(dir) => dir,
            None => {
                let home_dir = env("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home_dir).join(".taskboard").join("logs")
            }
        };

        Ok(Config {
            tick_interval: Duration::from_millis(tick_ms),
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn resolve(args: &[&str], vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let argv = std::iter::once("taskboard").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(&cli, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = resolve(&[], &[("HOME", "/home/ada")]).unwrap();
        assert_eq!(
            config,
            Config {
                tick_interval: Duration::from_secs(1),
                log_level: LogLevel::Info,
                log_dir: PathBuf::from("/home/ada/.taskboard/logs"),
            }
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = resolve(
            &[],
            &[
                ("TASKBOARD_TICK_MS", "500"),
                ("TASKBOARD_LOG_LEVEL", "DEBUG"),
                ("TASKBOARD_LOG_DIR", "/tmp/tb"),
            ],
        )
        .unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(500));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/tb"));
    }

    #[test]
    fn flags_override_environment() {
        let config = resolve(
            &["--tick-ms", "250", "--log-level", "trace", "--log-dir", "/var/log/tb"],
            &[("TASKBOARD_TICK_MS", "500"), ("TASKBOARD_LOG_LEVEL", "warn")],
        )
        .unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/tb"));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            resolve(&["--tick-ms", "0"], &[]),
            Err(ConfigError::InvalidTick("0".to_string()))
        );
        assert_eq!(
            resolve(&[], &[("TASKBOARD_TICK_MS", "soon")]),
            Err(ConfigError::InvalidTick("soon".to_string()))
        );
        assert_eq!(
            resolve(&["--log-level", "loud"], &[]),
            Err(ConfigError::UnknownLogLevel("loud".to_string()))
        );
        assert_eq!(
            resolve(&[], &[("TASKBOARD_LOG_DIR", "")]),
            Err(ConfigError::EmptyLogDir)
        );
    }

    #[test]
    fn warning_is_an_alias_for_warn() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
