//! Append-only log of noteworthy session events.
//!
//! Every event is mirrored to tracing. When a path is configured it is also
//! appended to a JSON-lines file, one object per line.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use proctor_types::RiskAssessment;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::{SessionError, SessionResult};

/// Event type logged when the windowed probability is high.
pub const HIGH_CHEATING_PROBABILITY: &str = "HIGH_CHEATING_PROBABILITY";

/// One line of the event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

/// Shared event sink for the frame loop and the detectors.
#[derive(Debug)]
pub struct EventLog {
    path: Option<PathBuf>,
    // Serializes appends so lines never interleave.
    writer: Mutex<()>,
    count: AtomicU64,
}

impl EventLog {
    /// An event log that only reports through tracing.
    pub fn disabled() -> Self {
        Self {
            path: None,
            writer: Mutex::new(()),
            count: AtomicU64::new(0),
        }
    }

    /// An event log appending to `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SessionError::EventLog(format!("{}: {}", parent.display(), e)))?;
        }
        Ok(Self {
            path: Some(path),
            writer: Mutex::new(()),
            count: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of events logged by this instance.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn log_event(
        &self,
        event_type: &str,
        timestamp: DateTime<Utc>,
        details: serde_json::Value,
    ) -> SessionResult<()> {
        warn!(event = event_type, %details, "Session event");
        self.count.fetch_add(1, Ordering::Relaxed);

        let Some(path) = &self.path else {
            return Ok(());
        };

        let event = LoggedEvent {
            event_type: event_type.to_string(),
            timestamp,
            details,
        };
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let _guard = self.writer.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SessionError::EventLog(format!("{}: {}", path.display(), e)))?;
        file.write_all(line.as_bytes())
            .map_err(|e| SessionError::EventLog(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Log a high-risk assessment.
    pub fn log_high_risk(
        &self,
        assessment: &RiskAssessment,
        timestamp: DateTime<Utc>,
    ) -> SessionResult<()> {
        self.log_event(
            HIGH_CHEATING_PROBABILITY,
            timestamp,
            json!({
                "probability": assessment.rolling_average,
                "reasons": assessment.reasons,
                "timestamp": timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            }),
        )
    }

    /// Read back every event from the file, in append order.
    pub fn read_all(&self) -> SessionResult<Vec<LoggedEvent>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}
