//! Audio contracts and command-line backends.
//!
//! Synthesis and playback engines are external programs. The crate only
//! fixes the data contract: text goes in, a temporary audio file comes out,
//! and the file is played to completion.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;

use crate::config::{AlertConfig, CommandSpec};
use crate::error::{AlertError, AlertResult};

// ── Speech artifact ─────────────────────────────────────────────────────

/// A temporary audio file produced by synthesis.
///
/// The file is removed when the artifact is dropped, so every exit path of
/// an alert task (success, synthesis failure, playback failure) cleans up.
#[derive(Debug)]
pub struct SpeechArtifact {
    path: TempPath,
}

impl SpeechArtifact {
    /// Reserve a new temporary file with the given suffix (e.g. `".wav"`).
    pub fn create(suffix: &str) -> AlertResult<Self> {
        let file = tempfile::Builder::new()
            .prefix("proctor-alert-")
            .suffix(suffix)
            .tempfile()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Contracts ───────────────────────────────────────────────────────────

/// Turns alert text into an audio artifact.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> AlertResult<SpeechArtifact>;
}

/// Plays an audio artifact to completion.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn play(&self, clip: &SpeechArtifact) -> AlertResult<()>;
}

/// A synthesizer and an initialised output, shared by all alert tasks.
#[derive(Clone)]
pub struct AudioPipeline {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub output: Arc<dyn AudioOutput>,
}

impl AudioPipeline {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, output: Arc<dyn AudioOutput>) -> Self {
        Self {
            synthesizer,
            output,
        }
    }

    /// Build the command-line pipeline described by `config`.
    ///
    /// Fails when audio is disabled or the player cannot be initialised.
    pub fn from_config(config: &AlertConfig) -> AlertResult<Self> {
        if !config.enabled {
            return Err(AlertError::Disabled);
        }
        let output = CommandPlayer::init(config.player.clone())?;
        let synthesizer = CommandSynthesizer::new(config.synthesizer.clone());
        Ok(Self::new(Arc::new(synthesizer), Arc::new(output)))
    }
}

// ── Command backends ────────────────────────────────────────────────────

/// Synthesizes speech with an external TTS program writing a WAV file.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    spec: CommandSpec,
}

impl CommandSynthesizer {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str) -> AlertResult<SpeechArtifact> {
        let clip = SpeechArtifact::create(".wav")?;

        let status = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg("-w")
            .arg(clip.path())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| AlertError::Synthesis(format!("{}: {}", self.spec.program, e)))?;

        if !status.success() {
            return Err(AlertError::Synthesis(format!(
                "{} exited with {}",
                self.spec.program, status
            )));
        }

        debug!(path = %clip.path().display(), "Speech synthesized");
        Ok(clip)
    }
}

/// Plays audio files with an external player program.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    spec: CommandSpec,
    program: PathBuf,
}

impl CommandPlayer {
    /// Initialise the output by resolving the player program.
    pub fn init(spec: CommandSpec) -> AlertResult<Self> {
        let program = resolve_program(&spec.program).ok_or_else(|| {
            AlertError::DeviceUnavailable(format!("{} not found on PATH", spec.program))
        })?;
        Ok(Self { spec, program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl AudioOutput for CommandPlayer {
    async fn play(&self, clip: &SpeechArtifact) -> AlertResult<()> {
        let status = Command::new(&self.program)
            .args(&self.spec.args)
            .arg(clip.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| AlertError::Playback(format!("{}: {}", self.spec.program, e)))?;

        if !status.success() {
            return Err(AlertError::Playback(format!(
                "{} exited with {}",
                self.spec.program, status
            )));
        }
        Ok(())
    }
}

/// Locate `program` either as a path or by searching `PATH`.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
