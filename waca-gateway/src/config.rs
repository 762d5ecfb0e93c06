//! Process-wide configuration, loaded once at startup.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file named by `WACA_CONFIG` (default `waca.toml`, optional)
//! 3. environment variables (`PORT`, `WACA_HOST`, `WACA_ARDUINO_INVOCATION`,
//!    `WACA_VERBOSE`, `WACA_COMPILE_TIMEOUT_SECS`)

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use waca_executor::{ArduinoCli, AuxiliaryFiles, CompileSettings};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "WACA_CONFIG";

/// Config file read when `WACA_CONFIG` is unset. Absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "waca.toml";

/// Errors loading the configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Shell fragment that starts the toolchain.
    pub arduino_invocation: String,
    pub host: String,
    pub port: u16,
    /// Log at `info` instead of `warn` when `RUST_LOG` is unset.
    pub verbose: bool,
    pub compile_timeout_secs: u64,
    pub query_timeout_secs: u64,
    /// Directory holding the LCD support files.
    pub extra_libs_dir: PathBuf,
    /// Board family that may receive the LCD support files.
    pub lcd_board_prefix: String,
    /// Parent of every workspace; the system temp dir if unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            arduino_invocation: "arduino-cli".to_owned(),
            host: "0.0.0.0".to_owned(),
            port: 80,
            verbose: false,
            compile_timeout_secs: 120,
            query_timeout_secs: 30,
            extra_libs_dir: PathBuf::from("extra-libs"),
            lcd_board_prefix: "attinycore:avr".to_owned(),
            temp_root: None,
        }
    }
}

impl GatewayConfig {
    /// Load from the config file and the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file is unreadable or malformed, or an
    /// environment override does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    /// Load using `env` in place of the process environment.
    ///
    /// # Errors
    /// See [`GatewayConfig::load`].
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (path, explicit) = match env(CONFIG_PATH_VAR) {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?,
            Err(e) if !explicit && e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(port) = env("PORT") {
            self.port = parse_env("PORT", port)?;
        }
        if let Some(host) = env("WACA_HOST") {
            self.host = host;
        }
        if let Some(invocation) = env("WACA_ARDUINO_INVOCATION") {
            self.arduino_invocation = invocation;
        }
        if let Some(verbose) = env("WACA_VERBOSE") {
            self.verbose = parse_env("WACA_VERBOSE", verbose)?;
        }
        if let Some(secs) = env("WACA_COMPILE_TIMEOUT_SECS") {
            self.compile_timeout_secs = parse_env("WACA_COMPILE_TIMEOUT_SECS", secs)?;
        }
        Ok(())
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    #[must_use]
    pub fn toolchain(&self) -> ArduinoCli {
        ArduinoCli::new(
            self.arduino_invocation.clone(),
            Duration::from_secs(self.query_timeout_secs),
        )
    }

    #[must_use]
    pub fn compile_settings(&self) -> CompileSettings {
        CompileSettings::new(
            Duration::from_secs(self.compile_timeout_secs),
            self.temp_root.clone(),
            AuxiliaryFiles::new(self.extra_libs_dir.clone(), self.lcd_board_prefix.clone()),
        )
    }
}

fn parse_env<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        reason: e.to_string(),
        var,
        value,
    })
}
