//! Configuration loading from a TOML file with environment variable overrides.
//!
//! Looks for `simhome.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use simhome_adapter_simulator_tcp::SimulatorConfig;
use simhome_app::controllers::{ClimateConfig, IrrigationConfig};
use simhome_app::monitor::MonitorConfig;
use simhome_domain::automation::Rule;
use simhome_domain::time::parse_time_of_day;

const DEFAULT_RULES: &str = include_str!("default_rules.toml");

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which program to run.
    pub mode: Mode,
    pub simulator: SimulatorSection,
    pub monitor: MonitorSection,
    pub irrigation: IrrigationSection,
    pub climate: ClimateSection,
    pub logging: LoggingConfig,
    /// Automation rules; the built-in set is used when empty.
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Smart-home automation with the interactive console.
    #[default]
    Home,
    /// Irrigation timer on a virtual valve.
    Irrigation,
    /// Climate controller on a virtual probe and output.
    Climate,
}

impl std::str::FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "irrigation" => Ok(Self::Irrigation),
            "climate" => Ok(Self::Climate),
            other => Err(ConfigError::Validation(format!("unknown mode {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Network simulator over TCP.
    #[default]
    Tcp,
    /// In-process simulator.
    Virtual,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown simulator backend {other:?}"
            ))),
        }
    }
}

/// Device simulator selection and connection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    pub backend: BackendKind,
    #[serde(flatten)]
    pub connection: SimulatorConfig,
}

/// Monitoring loop timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub interval_ms: u64,
    pub stop_timeout_ms: u64,
}

/// Irrigation timer settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IrrigationSection {
    /// Start time as `HH:MM`.
    pub start_time: String,
    pub duration_secs: u64,
    pub poll_interval_secs: u64,
    /// Together with `duration_secs`, must outlast the start minute.
    pub cooldown_secs: u64,
}

/// Climate controller settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClimateSection {
    pub threshold_celsius: f64,
    pub poll_interval_secs: u64,
    /// Reading of the virtual probe at startup.
    pub initial_celsius: f64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `simhome.toml` (if present), apply
    /// environment-variable overrides, then fill in the built-in rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("simhome.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.fill_default_rules()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("SIMHOME_MODE") {
            self.mode = val.parse()?;
        }
        if let Some(val) = lookup("SIMHOME_BACKEND") {
            self.simulator.backend = val.parse()?;
        }
        if let Some(val) = lookup("SIMHOME_SIMULATOR_HOST") {
            self.simulator.connection.host = val;
        }
        if let Some(val) = lookup("SIMHOME_SIMULATOR_PORT") {
            self.simulator.connection.port = val.parse().map_err(|_| {
                ConfigError::Validation(format!("SIMHOME_SIMULATOR_PORT is not a port: {val:?}"))
            })?;
        }
        if let Some(val) = lookup("SIMHOME_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn fill_default_rules(&mut self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            self.rules = default_rules()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulator.connection.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.simulator.connection.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.monitor.interval_ms == 0 || self.monitor.stop_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "monitor intervals must be non-zero".to_string(),
            ));
        }
        if self.irrigation.poll_interval_secs == 0 || self.climate.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll intervals must be non-zero".to_string(),
            ));
        }
        if self.irrigation.duration_secs.saturating_add(self.irrigation.cooldown_secs) < 60 {
            return Err(ConfigError::Validation(
                "irrigation duration_secs + cooldown_secs must be at least 60".to_string(),
            ));
        }
        parse_time_of_day(&self.irrigation.start_time).map_err(|_| {
            ConfigError::Validation(format!(
                "irrigation start_time must be HH:MM, got {:?}",
                self.irrigation.start_time
            ))
        })?;

        let mut names = HashSet::new();
        for rule in &self.rules {
            rule.validate()
                .map_err(|err| ConfigError::Validation(format!("rule {:?}: {err}", rule.name)))?;
            if !names.insert(rule.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate rule name {:?}",
                    rule.name
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_millis(self.monitor.interval_ms),
            stop_timeout: Duration::from_millis(self.monitor.stop_timeout_ms),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `start_time` is not `HH:MM`.
    pub fn irrigation_config(&self) -> Result<IrrigationConfig, ConfigError> {
        let start_time = parse_time_of_day(&self.irrigation.start_time).map_err(|_| {
            ConfigError::Validation(format!(
                "irrigation start_time must be HH:MM, got {:?}",
                self.irrigation.start_time
            ))
        })?;
        Ok(IrrigationConfig {
            start_time,
            duration: Duration::from_secs(self.irrigation.duration_secs),
            poll_interval: Duration::from_secs(self.irrigation.poll_interval_secs),
            cooldown: Duration::from_secs(self.irrigation.cooldown_secs),
        })
    }

    #[must_use]
    pub fn climate_config(&self) -> ClimateConfig {
        ClimateConfig {
            threshold_celsius: self.climate.threshold_celsius,
            poll_interval: Duration::from_secs(self.climate.poll_interval_secs),
        }
    }
}

/// The built-in automation rules.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the embedded rule file is malformed.
pub fn default_rules() -> Result<Vec<Rule>, ConfigError> {
    #[derive(Deserialize)]
    struct RuleFile {
        rules: Vec<Rule>,
    }
    let file: RuleFile = toml::from_str(DEFAULT_RULES)?;
    Ok(file.rules)
}

impl Default for MonitorSection {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            interval_ms: millis(defaults.interval),
            stop_timeout_ms: millis(defaults.stop_timeout),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for IrrigationSection {
    fn default() -> Self {
        let defaults = IrrigationConfig::default();
        Self {
            start_time: defaults.start_time.format("%H:%M").to_string(),
            duration_secs: defaults.duration.as_secs(),
            poll_interval_secs: defaults.poll_interval.as_secs(),
            cooldown_secs: defaults.cooldown.as_secs(),
        }
    }
}

impl Default for ClimateSection {
    fn default() -> Self {
        let defaults = ClimateConfig::default();
        Self {
            threshold_celsius: defaults.threshold_celsius,
            poll_interval_secs: defaults.poll_interval.as_secs(),
            initial_celsius: 22.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "simhomed=info,simhome=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
