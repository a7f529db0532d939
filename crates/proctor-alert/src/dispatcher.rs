//! Cooldown-limited alert dispatch.

use std::sync::Arc;
use std::time::Duration;

use proctor_types::ViolationType;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::AudioPipeline;
use crate::config::AlertConfig;
use crate::cooldown::CooldownState;
use crate::error::{AlertError, AlertResult};

/// What a call to [`AlertDispatcher::dispatch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Cooldown recorded and an audio task launched
    Emitted,
    /// The same type alerted less than one cooldown ago
    CoolingDown,
    /// Audio is unavailable for this session
    Degraded,
}

/// Audio resources of a healthy dispatcher.
struct AudioChannel {
    pipeline: Arc<AudioPipeline>,
    runtime: Handle,
}

/// Per-session alert dispatcher.
///
/// Owns the cooldown state. `dispatch` records the emission synchronously
/// before launching the audio task, so a burst of calls for one type within
/// the cooldown never produces a second emission.
///
/// Audio tasks are detached: they are never joined and never cancelled, and
/// may outlive the frame loop. Concurrent tasks share one playback device,
/// so a later alert may cut across an earlier one.
pub struct AlertDispatcher {
    cooldowns: CooldownState,
    audio: Option<AudioChannel>,
    emitted: u64,
}

impl AlertDispatcher {
    /// Create a dispatcher from an already initialised audio pipeline.
    ///
    /// An `Err` pipeline, or the absence of a tokio runtime, puts the
    /// dispatcher in permanent degraded mode; this is announced once here.
    /// Only an invalid cooldown is an error.
    pub fn new(config: &AlertConfig, audio: AlertResult<AudioPipeline>) -> AlertResult<Self> {
        let cooldowns = CooldownState::new(config.cooldown()?);

        let audio = match (audio, Handle::try_current()) {
            (Ok(pipeline), Ok(runtime)) => {
                info!(cooldown_secs = config.cooldown_secs, "Audio alerts enabled");
                Some(AudioChannel {
                    pipeline: Arc::new(pipeline),
                    runtime,
                })
            }
            (Err(AlertError::Disabled), _) => {
                info!("Audio alerts disabled by configuration");
                None
            }
            (Err(e), _) => {
                warn!(error = %e, "Audio output not available. Audio alerts disabled.");
                None
            }
            (Ok(_), Err(e)) => {
                warn!(error = %e, "No async runtime for audio alerts. Audio alerts disabled.");
                None
            }
        };

        Ok(Self {
            cooldowns,
            audio,
            emitted: 0,
        })
    }

    /// Create a dispatcher with the command-line audio backends.
    pub fn from_config(config: &AlertConfig) -> AlertResult<Self> {
        Self::new(config, AudioPipeline::from_config(config))
    }

    pub fn is_degraded(&self) -> bool {
        self.audio.is_none()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldowns.cooldown()
    }

    /// Number of effective emissions so far.
    pub fn emitted_count(&self) -> u64 {
        self.emitted
    }

    /// Whether `ty` is outside its cooldown right now.
    pub fn can_alert(&self, ty: ViolationType) -> bool {
        self.cooldowns.can_alert(ty, Instant::now())
    }

    /// Emit an alert for `ty` unless degraded or cooling down.
    ///
    /// Never blocks on audio and never fails: errors inside the launched
    /// task are logged and dropped.
    pub fn dispatch(&mut self, ty: ViolationType) -> DispatchOutcome {
        let Some(audio) = &self.audio else {
            return DispatchOutcome::Degraded;
        };

        let now = Instant::now();
        if !self.cooldowns.can_alert(ty, now) {
            return DispatchOutcome::CoolingDown;
        }
        self.cooldowns.mark(ty, now);
        self.emitted += 1;

        debug!(violation = %ty, "Dispatching audio alert");
        // Detached: the handle is dropped immediately.
        let _ = audio.runtime.spawn(play_alert(ty, Arc::clone(&audio.pipeline)));

        DispatchOutcome::Emitted
    }
}

/// Body of a detached alert task.
async fn play_alert(ty: ViolationType, pipeline: Arc<AudioPipeline>) {
    if let Err(e) = speak(ty, &pipeline).await {
        warn!(violation = %ty, error = %e, "Audio alert failed");
    }
}

async fn speak(ty: ViolationType, pipeline: &AudioPipeline) -> AlertResult<()> {
    let clip = pipeline.synthesizer.synthesize(ty.alert_message()).await?;
    pipeline.output.play(&clip).await?;
    // `clip` drops here, or at whichever `?` returned early, removing the file.
    Ok(())
}
