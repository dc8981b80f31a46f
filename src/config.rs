//! TOML-based exporter configuration.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

/// Top-level exporter configuration parsed from TOML.
///
/// All fields have defaults describing the residential and
/// commercial/industrial classes. Load from TOML with
/// [`ExporterConfig::from_toml_file`] or use [`ExporterConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// Collection window around "now".
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Program classes, each processed independently.
    #[serde(default = "default_classes")]
    pub classes: Vec<ClassConfig>,
    /// Upstream record location.
    #[serde(default)]
    pub source: SourceConfig,
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Collection window around "now".
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Days of event log requested before "now" (must be >= 1).
    pub days_in_past: u32,
    /// Days requested after "now", so today and tomorrow are covered.
    pub days_ahead: u32,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            days_in_past: 7,
            days_ahead: 2,
        }
    }
}

/// One program class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassConfig {
    /// Class name used in metric labels, e.g. `"R"`.
    pub name: String,
    /// Event log code for this class, e.g. `"RES"`.
    pub history_code: String,
    /// Class label used by the forecast, e.g. `"Residential"`.
    pub forecast_label: String,
}

impl ClassConfig {
    pub fn new(name: &str, history_code: &str, forecast_label: &str) -> Self {
        Self {
            name: name.to_string(),
            history_code: history_code.to_string(),
            forecast_label: forecast_label.to_string(),
        }
    }
}

fn default_classes() -> Vec<ClassConfig> {
    vec![
        ClassConfig::new("R", "RES", "Residential"),
        ClassConfig::new("CI", "CI", "CI"),
    ]
}

/// Upstream record location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Directory holding `history/<code>.csv`, `forecast.json` and `shed_counts.json`.
    pub data_dir: PathBuf,
    /// IANA zone of the utility's local time, e.g. `"America/Chicago"`.
    pub time_zone: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            time_zone: "America/Chicago".to_string(),
        }
    }
}

impl SourceConfig {
    /// The local time zone, or `None` if the name is not a known IANA zone.
    pub fn tz(&self) -> Option<Tz> {
        self.time_zone.parse().ok()
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:2024"`.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:2024".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"collection.days_in_past"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            collection: CollectionConfig::default(),
            classes: default_classes(),
            source: SourceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl ExporterConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies `LISTEN` and `PORT` overrides from `lookup`.
    ///
    /// `LISTEN` replaces the whole listen address; otherwise `PORT` binds
    /// that port on all interfaces.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(listen) = lookup("LISTEN").filter(|v| !v.is_empty()) {
            self.server.listen = listen;
        } else if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.listen = format!("0.0.0.0:{port}");
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(1..=3650).contains(&self.collection.days_in_past) {
            errors.push(ConfigError {
                field: "collection.days_in_past".into(),
                message: "must be in [1, 3650]".into(),
            });
        }
        if self.collection.days_ahead > 3650 {
            errors.push(ConfigError {
                field: "collection.days_ahead".into(),
                message: "must be <= 3650".into(),
            });
        }

        if self.classes.is_empty() {
            errors.push(ConfigError {
                field: "classes".into(),
                message: "at least one class is required".into(),
            });
        }
        let mut seen = HashSet::new();
        for (i, class) in self.classes.iter().enumerate() {
            if class.name.is_empty() {
                errors.push(ConfigError {
                    field: format!("classes[{i}].name"),
                    message: "must not be empty".into(),
                });
            } else if !seen.insert(class.name.as_str()) {
                errors.push(ConfigError {
                    field: format!("classes[{i}].name"),
                    message: format!("duplicate class \"{}\"", class.name),
                });
            }
            if class.history_code.is_empty() {
                errors.push(ConfigError {
                    field: format!("classes[{i}].history_code"),
                    message: "must not be empty".into(),
                });
            }
            if class.forecast_label.is_empty() {
                errors.push(ConfigError {
                    field: format!("classes[{i}].forecast_label"),
                    message: "must not be empty".into(),
                });
            }
        }

        if self.source.tz().is_none() {
            errors.push(ConfigError {
                field: "source.time_zone".into(),
                message: format!("\"{}\" is not a known IANA time zone", self.source.time_zone),
            });
        }

        if self.server.listen.parse::<SocketAddr>().is_err() {
            errors.push(ConfigError {
                field: "server.listen".into(),
                message: format!("\"{}\" is not a socket address", self.server.listen),
            });
        }

        errors
    }
}
