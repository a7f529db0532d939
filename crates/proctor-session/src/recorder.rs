//! Violation persistence.
//!
//! The recorder owns every violation once appended. `get_all` returns the
//! full history ordered by occurrence time, with no duplicates.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use proctor_types::{RiskSnapshot, ViolationEvent, ViolationType};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// Storage contract for recorded violations.
pub trait ViolationRecorder: Send + Sync {
    /// Append a violation and return the stored event.
    fn record(
        &self,
        violation_type: ViolationType,
        timestamp: DateTime<Utc>,
        context: RiskSnapshot,
    ) -> SessionResult<ViolationEvent>;

    /// Every recorded violation, ordered by timestamp.
    fn get_all(&self) -> SessionResult<Vec<ViolationEvent>>;
}

/// Stable sort by timestamp, keeping the first occurrence of each id.
fn normalize(mut events: Vec<ViolationEvent>) -> Vec<ViolationEvent> {
    let mut seen = HashSet::<Uuid>::with_capacity(events.len());
    events.retain(|e| seen.insert(e.id));
    events.sort_by_key(|e| e.timestamp);
    events
}

// ── In-memory ───────────────────────────────────────────────────────

/// In-process recorder for tests and sessions without persistence.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: RwLock<Vec<ViolationEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl ViolationRecorder for MemoryRecorder {
    fn record(
        &self,
        violation_type: ViolationType,
        timestamp: DateTime<Utc>,
        context: RiskSnapshot,
    ) -> SessionResult<ViolationEvent> {
        let event = ViolationEvent::new(violation_type, timestamp, context);
        self.events.write().push(event.clone());
        Ok(event)
    }

    fn get_all(&self) -> SessionResult<Vec<ViolationEvent>> {
        Ok(normalize(self.events.read().clone()))
    }
}

// ── JSON lines ──────────────────────────────────────────────────────

/// Append-only JSON-lines recorder.
///
/// History is reloaded from disk on every `get_all`. [`JsonlRecorder::open`]
/// includes events appended by earlier runs against the same file;
/// [`JsonlRecorder::create`] starts a fresh history for one session.
#[derive(Debug)]
pub struct JsonlRecorder {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonlRecorder {
    /// Open a recorder at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SessionError::Recorder(format!("{}: {}", parent.display(), e)))?;
        }
        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    /// Open a recorder for a new session at `path`.
    ///
    /// A non-empty file left by an earlier session is renamed to
    /// `<stem>.<YYYYmmdd_HHMMSS>.<ext>` first, so its violations never
    /// reach this session's report. Returns the recorder and the rotated path.
    pub fn create(path: impl Into<PathBuf>) -> SessionResult<(Self, Option<PathBuf>)> {
        let recorder = Self::open(path)?;
        let rotated = recorder.rotate()?;
        Ok((recorder, rotated))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotate(&self) -> SessionResult<Option<PathBuf>> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if len == 0 {
            return Ok(None);
        }

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "violations".to_string());
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jsonl".to_string());
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");

        let mut target = self.path.with_file_name(format!("{stem}.{stamp}.{ext}"));
        let mut n = 1;
        while target.exists() {
            target = self.path.with_file_name(format!("{stem}.{stamp}-{n}.{ext}"));
            n += 1;
        }
        fs::rename(&self.path, &target).map_err(|e| self.io_error(e))?;
        info!(from = %self.path.display(), to = %target.display(), "Rotated previous violation history");
        Ok(Some(target))
    }

    fn append(&self, event: &ViolationEvent) -> SessionResult<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let _guard = self.writer.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))
    }

    fn io_error(&self, err: std::io::Error) -> SessionError {
        SessionError::Recorder(format!("{}: {}", self.path.display(), err))
    }
}

impl ViolationRecorder for JsonlRecorder {
    fn record(
        &self,
        violation_type: ViolationType,
        timestamp: DateTime<Utc>,
        context: RiskSnapshot,
    ) -> SessionResult<ViolationEvent> {
        let event = ViolationEvent::new(violation_type, timestamp, context);
        self.append(&event)?;
        debug!(violation = %violation_type, id = %event.id, "Violation recorded");
        Ok(event)
    }

    fn get_all(&self) -> SessionResult<Vec<ViolationEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path).map_err(|e| self.io_error(e))?);
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let event: ViolationEvent = serde_json::from_str(&line).map_err(|e| {
                SessionError::Recorder(format!("{}:{}: {}", self.path.display(), index + 1, e))
            })?;
            events.push(event);
        }
        Ok(normalize(events))
    }
}
