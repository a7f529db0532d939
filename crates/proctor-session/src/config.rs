//! Configuration for a proctoring session

use std::path::PathBuf;

use proctor_alert::AlertConfig;
use proctor_report::{ReportConfig, StudentInfo};
use proctor_risk::FusionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Main session configuration.
///
/// Loaded once at startup and immutable for the rest of the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Risk fusion settings
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Audio alert settings
    #[serde(default)]
    pub alerts: AlertConfig,

    /// End-of-session report settings
    #[serde(default)]
    pub reporting: ReportConfig,

    /// Where violations and events are persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Frame pacing and recording subsystems
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Candidate identity shown on the report
    #[serde(default)]
    pub student: StudentInfo,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON-lines violation file. In-memory recording when unset.
    #[serde(default)]
    pub violations_path: Option<PathBuf>,

    /// JSON-lines event log. Events only go to tracing when unset.
    #[serde(default)]
    pub event_log_path: Option<PathBuf>,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Sleep out the remainder of each frame budget
    #[serde(default = "default_true")]
    pub pace: bool,

    /// Webcam recorder process
    #[serde(default)]
    pub video: Option<CaptureSpec>,

    /// Screen recorder process
    #[serde(default)]
    pub screen: Option<CaptureSpec>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            pace: true,
            video: None,
            screen: None,
        }
    }
}

/// An external recorder, invoked as `<program> <args..> <output>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub output: PathBuf,

    /// Written to the recorder's stdin to ask it to finish (ffmpeg: `q`).
    #[serde(default = "default_stop_input")]
    pub stop_input: String,

    /// How long to wait for a graceful exit before killing the recorder.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

impl CaptureSpec {
    pub fn new(program: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output: output.into(),
            stop_input: default_stop_input(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stop_timeout_ms(mut self, ms: u64) -> Self {
        self.stop_timeout_ms = ms;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_fps() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stop_input() -> String {
    "q\n".to_string()
}

fn default_stop_timeout_ms() -> u64 {
    5000
}

impl SessionConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `PROCTOR__SECTION__KEY` environment variables.
    pub fn load(path: Option<&str>) -> SessionResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&SessionConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PROCTOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Reject settings the session cannot run with.
    pub fn validate(&self) -> SessionResult<()> {
        self.fusion
            .validate()
            .map_err(|e| SessionError::Config(e.to_string()))?;
        self.alerts
            .cooldown()
            .map_err(|e| SessionError::Config(e.to_string()))?;
        if self.capture.fps == 0 {
            return Err(SessionError::Config("capture.fps must be greater than zero".into()));
        }
        Ok(())
    }
}
