use cardcount_core::recognizer::{DEFAULT_THRESHOLD, DEFAULT_WINDOW, RecognizerConfig};
use cardcount_hud::DEFAULT_SATURATION;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_FRAMES_PER_CARD: usize = 6;
const DEFAULT_MISREAD_RATE: f64 = 0.1;
const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 2_000;
const SESSION_ID_ALLOWED: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CardCountConfig {
    pub session_id: String,
    #[serde(default)]
    pub recognizer: RecognizerSection,
    #[serde(default)]
    pub hud: HudConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CardCountConfig {
    fn default() -> Self {
        Self {
            session_id: "session".to_string(),
            recognizer: RecognizerSection::default(),
            hud: HudConfig::default(),
            capture: CaptureConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CardCountConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: CardCountConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_session_id(&self.session_id)?;
        self.recognizer.validate()?;
        self.hud.validate()?;
        self.capture.validate()?;
        self.simulation.validate()?;
        self.logging.normalize();
        Ok(())
    }

    pub fn recognizer_config(&self) -> RecognizerConfig {
        self.recognizer.to_config()
    }

    /// Log directory with `{session_id}` placeholders substituted.
    pub fn resolved_log_dir(&self) -> PathBuf {
        resolve_template(&self.session_id, &self.logging.log_dir)
    }
}

/// Confirmation window and threshold.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecognizerSection {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

impl Default for RecognizerSection {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            threshold: default_threshold(),
        }
    }
}

impl RecognizerSection {
    fn to_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            window: Duration::from_secs(self.window_secs),
            threshold: self.threshold,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.to_config()
            .validate()
            .map_err(|err| ValidationError::InvalidField {
                field: if self.window_secs == 0 {
                    "recognizer.window_secs".to_string()
                } else {
                    "recognizer.threshold".to_string()
                },
                message: err.to_string(),
            })
    }
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW.as_secs()
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HudOutput {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HudConfig {
    #[serde(default = "default_saturation")]
    pub saturation: u32,
    #[serde(default)]
    pub output: HudOutput,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            saturation: default_saturation(),
            output: HudOutput::default(),
        }
    }
}

impl HudConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.saturation == 0 {
            return Err(ValidationError::InvalidField {
                field: "hud.saturation".to_string(),
                message: "saturation must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_saturation() -> u32 {
    DEFAULT_SATURATION
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Http,
    #[default]
    Simulated,
}

/// Where frames come from and where they are sent for recognition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaptureConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Image file, or directory of image files, standing in for the camera.
    #[serde(default)]
    pub frames: Option<PathBuf>,
    /// Clock step between automatic triggers.
    #[serde(default = "default_capture_interval_ms")]
    pub interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            server_url: None,
            timeout_ms: default_timeout_ms(),
            frames: None,
            interval_ms: default_capture_interval_ms(),
        }
    }
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidField {
                field: "capture.timeout_ms".to_string(),
                message: "timeout must be greater than zero".to_string(),
            });
        }

        if self.backend != BackendKind::Http {
            return Ok(());
        }

        let Some(url) = self.server_url.as_deref() else {
            return Err(ValidationError::InvalidField {
                field: "capture.server_url".to_string(),
                message: "http backend requires a server_url".to_string(),
            });
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidField {
                field: "capture.server_url".to_string(),
                message: format!("'{url}' is not an http(s) URL"),
            });
        }

        if self.frames.is_none() {
            return Err(ValidationError::InvalidField {
                field: "capture.frames".to_string(),
                message: "http backend requires a frames path".to_string(),
            });
        }

        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_capture_interval_ms() -> u64 {
    DEFAULT_CAPTURE_INTERVAL_MS
}

/// Parameters of the offline recognizer used for demos and dry runs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    #[serde(default = "default_frames_per_card")]
    pub frames_per_card: usize,
    #[serde(default = "default_misread_rate")]
    pub misread_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frames_per_card: default_frames_per_card(),
            misread_rate: default_misread_rate(),
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.frames_per_card == 0 {
            return Err(ValidationError::InvalidField {
                field: "simulation.frames_per_card".to_string(),
                message: "each card must be shown for at least one frame".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.misread_rate) {
            return Err(ValidationError::InvalidField {
                field: "simulation.misread_rate".to_string(),
                message: "misread rate must be between 0 and 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_frames_per_card() -> usize {
    DEFAULT_FRAMES_PER_CARD
}

fn default_misread_rate() -> f64 {
    DEFAULT_MISREAD_RATE
}

/// Logging defaults to human-readable output on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_dir: default_log_dir(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.log_dir.trim().is_empty() {
            self.log_dir = default_log_dir();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs/{session_id}".to_string()
}

fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if session_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "session_id".to_string(),
            message: "session_id must not be empty".to_string(),
        });
    }

    if !session_id.chars().all(|c| SESSION_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "session_id".to_string(),
            message: "session_id may only contain alphanumeric characters, '.', '_' or '-'"
                .to_string(),
        });
    }

    Ok(())
}

fn resolve_template(session_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{session_id}", session_id))
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
session_id: "table_3"
recognizer:
  window_secs: 30
  threshold: 4
hud:
  saturation: 10
  output: "json"
capture:
  backend: "http"
  server_url: "http://10.20.8.87:5000/"
  frames: "captures/"
simulation:
  seed: 9
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: CardCountConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.capture.backend, BackendKind::Http);
        assert_eq!(cfg.capture.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.hud.output, HudOutput::Json);
        assert_eq!(cfg.simulation.frames_per_card, DEFAULT_FRAMES_PER_CARD);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.recognizer_config(), RecognizerConfig::default());
        assert_eq!(cfg.resolved_log_dir(), PathBuf::from("logs/table_3"));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let mut cfg: CardCountConfig =
            serde_yaml::from_str("session_id: \"solo\"\n").expect("parse");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.capture.backend, BackendKind::Simulated);
        assert_eq!(cfg.hud.saturation, DEFAULT_SATURATION);
        assert!(!cfg.logging.enable_structured);
    }

    #[test]
    fn rejects_http_backend_without_url() {
        let yaml = BASIC_YAML.replace("  server_url: \"http://10.20.8.87:5000/\"\n", "");
        let mut cfg: CardCountConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("missing url should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "capture.server_url"
        ));
    }

    #[test]
    fn rejects_non_http_url() {
        let yaml = BASIC_YAML.replace("http://10.20.8.87:5000/", "ftp://example");
        let mut cfg: CardCountConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_threshold() {
        let yaml = BASIC_YAML.replace("threshold: 4", "threshold: 0");
        let mut cfg: CardCountConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero threshold");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "recognizer.threshold"
        ));
    }

    #[test]
    fn rejects_invalid_session_id() {
        let yaml = BASIC_YAML.replace("table_3", "table 3");
        let mut cfg: CardCountConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid session id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "session_id"
        ));
    }

    #[test]
    fn rejects_out_of_range_misread_rate() {
        let yaml = BASIC_YAML.replace("seed: 9", "seed: 9\n  misread_rate: 1.5");
        let mut cfg: CardCountConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("misread rate");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "simulation.misread_rate"
        ));
    }
}
