//! Configuration for the annotation services.
//!
//! Settings come from a TOML file found by [`Settings::discover`], then
//! `MIDAS_*` environment variables on top. Every field has a default, so an
//! empty or missing file is valid.

use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::labeling::{
    LabelPair, SplitterOptions, WindowConfig, DEFAULT_BATCH_SIZE, DEFAULT_CACHE_CAPACITY,
    DEFAULT_MAX_CONCURRENT_CALLS, DEFAULT_SPAN_SIZE, DEFAULT_STRIDE_SIZE,
};

/// Config file looked for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "midas.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5555;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Sentence splitter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Tokens per window.
    pub span_size: usize,
    /// Tokens between window starts. Must be less than `span_size`.
    pub stride_size: usize,
    /// Distinct documents kept in the prediction cache.
    pub cache_capacity: usize,
    /// Windows per model call.
    pub batch_size: usize,
    /// Model calls in flight at once per document.
    pub max_concurrent_calls: usize,
    pub begin_label: String,
    pub outside_label: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        let labels = LabelPair::default();
        Self {
            span_size: DEFAULT_SPAN_SIZE,
            stride_size: DEFAULT_STRIDE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
            begin_label: labels.begin,
            outside_label: labels.outside,
        }
    }
}

/// Where a service's predictions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A model server reached over HTTP.
    Remote,
    /// Random baseline, no model needed.
    Random,
    /// Service answers 503.
    #[default]
    Disabled,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Random => write!(f, "random"),
            BackendKind::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Disabled,
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    pub fn random() -> Self {
        Self {
            kind: BackendKind::Random,
            ..Default::default()
        }
    }

    pub fn remote(endpoint: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Remote,
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.kind == BackendKind::Remote
            && self.endpoint.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "backends.{}: remote backend needs an endpoint",
                name
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(format!(
                "backends.{}: timeout_secs must be at least 1",
                name
            )));
        }
        Ok(())
    }
}

/// Backend per service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub sentence: BackendConfig,
    pub xpos: BackendConfig,
    pub dep: BackendConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            sentence: BackendConfig::random(),
            xpos: BackendConfig::default(),
            dep: BackendConfig::default(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub splitter: SplitterConfig,
    pub backends: BackendsConfig,
    /// File these settings were read from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `explicit` if given, otherwise from the first config
    /// file found, otherwise defaults. Environment overrides are applied and
    /// the result is validated.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => match Self::discover() {
                Some(path) => Self::load_from_path(&path).await?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        let settings = settings.with_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// First existing config file: `./midas.toml`, then the user config dir.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        let user = dirs::config_dir().map(|d| d.join("midas").join("config.toml"));
        std::iter::once(local)
            .chain(user)
            .find(|p| p.is_file())
    }

    /// Read settings from one TOML file.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut settings: Settings =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.source_path = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Apply `MIDAS_*` environment variables.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // MIDAS_HOST - listen address
        if let Some(host) = lookup("MIDAS_HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }

        override_number(&lookup, "MIDAS_PORT", &mut self.server.port);
        override_number(&lookup, "MIDAS_SPAN_SIZE", &mut self.splitter.span_size);
        override_number(&lookup, "MIDAS_STRIDE_SIZE", &mut self.splitter.stride_size);
        override_number(
            &lookup,
            "MIDAS_CACHE_CAPACITY",
            &mut self.splitter.cache_capacity,
        );
    }

    /// Reject settings the services cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window_config()?;
        if self.splitter.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "splitter.cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.splitter.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "splitter.batch_size must be at least 1".to_string(),
            ));
        }
        if self.splitter.max_concurrent_calls == 0 {
            return Err(ConfigError::Invalid(
                "splitter.max_concurrent_calls must be at least 1".to_string(),
            ));
        }
        if self.splitter.begin_label == self.splitter.outside_label {
            return Err(ConfigError::Invalid(
                "splitter.begin_label and splitter.outside_label must differ".to_string(),
            ));
        }
        self.backends.sentence.validate("sentence")?;
        self.backends.xpos.validate("xpos")?;
        self.backends.dep.validate("dep")?;
        for (name, backend) in [("xpos", &self.backends.xpos), ("dep", &self.backends.dep)] {
            if backend.kind == BackendKind::Random {
                return Err(ConfigError::Invalid(format!(
                    "backends.{}: no random backend exists, use /random routes instead",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn window_config(&self) -> Result<WindowConfig, ConfigError> {
        WindowConfig::new(self.splitter.span_size, self.splitter.stride_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn cache_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.splitter.cache_capacity).ok_or_else(|| {
            ConfigError::Invalid("splitter.cache_capacity must be at least 1".to_string())
        })
    }

    pub fn splitter_options(&self) -> Result<SplitterOptions, ConfigError> {
        Ok(SplitterOptions {
            window: self.window_config()?,
            batch_size: self.splitter.batch_size,
            max_concurrent_calls: self.splitter.max_concurrent_calls,
            timeout: self.backends.sentence.timeout(),
            labels: self.label_pair(),
        })
    }

    pub fn label_pair(&self) -> LabelPair {
        LabelPair::new(&self.splitter.begin_label, &self.splitter.outside_label)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn override_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring {}={:?}: not a valid number", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.splitter.span_size, 20);
        assert_eq!(settings.splitter.stride_size, 10);
        assert_eq!(settings.splitter.cache_capacity, 1000);
        assert_eq!(settings.backends.sentence.kind, BackendKind::Random);
        assert_eq!(settings.backends.xpos.kind, BackendKind::Disabled);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 5555);
    }

    #[tokio::test]
    async fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[splitter]
span_size = 30
stride_size = 12

[backends.xpos]
kind = "remote"
endpoint = "http://localhost:5555/"
timeout_secs = 5
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).await.unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.splitter.span_size, 30);
        assert_eq!(settings.splitter.batch_size, 32);
        assert_eq!(
            settings.backends.xpos,
            BackendConfig {
                kind: BackendKind::Remote,
                endpoint: Some("http://localhost:5555/".into()),
                timeout_secs: 5,
            }
        );
        assert_eq!(settings.source_path.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn test_invalid_window_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[splitter]\nspan_size = 10\nstride_size = 10").unwrap();
        let err = Settings::load(Some(file.path())).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_bad_toml_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            Settings::load_from_path(file.path()).await,
            Err(ConfigError::Parse { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load_from_path(&dir.path().join("absent.toml")).await,
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_remote_backend_needs_endpoint() {
        let mut settings = Settings::default();
        settings.backends.dep.kind = BackendKind::Remote;
        assert!(settings.validate().is_err());
        settings.backends.dep = BackendConfig::remote("http://localhost:5557/");
        assert!(settings.validate().is_ok());
        settings.backends.dep = BackendConfig::random();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let mut settings = Settings::default();
        settings.splitter.cache_capacity = 0;
        assert!(settings.validate().is_err());
        assert!(settings.cache_capacity().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MIDAS_HOST", "0.0.0.0"),
            ("MIDAS_PORT", "9000"),
            ("MIDAS_STRIDE_SIZE", "5"),
            ("MIDAS_CACHE_CAPACITY", "lots"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.splitter.stride_size, 5);
        assert_eq!(settings.splitter.span_size, 20);
        // Unparseable values leave the setting alone.
        assert_eq!(settings.splitter.cache_capacity, 1000);
    }

    #[test]
    fn test_splitter_options_follow_settings() {
        let mut settings = Settings::default();
        settings.splitter.begin_label = "B-SENT".into();
        settings.backends.sentence.timeout_secs = 3;
        let options = settings.splitter_options().unwrap();
        assert_eq!(options.labels, LabelPair::new("B-SENT", "O"));
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.window, WindowConfig::default());
    }

    #[test]
    fn test_toml_output_reloads() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("[splitter]"));
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
