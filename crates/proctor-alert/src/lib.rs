//! # proctor-alert
//!
//! Rate-limited, human-perceivable alerts for classified violations.
//!
//! ## Components
//!
//! - **AlertDispatcher**: owns the per-session cooldown state and launches
//!   one detached audio task per effective alert
//! - **CooldownState**: last emission instant per violation type, under a
//!   single global cooldown
//! - **SpeechSynthesizer / AudioOutput**: audio contracts, with
//!   command-line backends
//! - **SpeechArtifact**: temporary audio file removed on drop
//!
//! ## Degraded Mode
//!
//! If the audio output cannot be initialised the dispatcher is built in a
//! permanently degraded mode: every `dispatch` is a no-op for the rest of
//! the session. Initialisation is never retried.

pub mod audio;
pub mod config;
pub mod cooldown;
pub mod dispatcher;
pub mod error;

pub use audio::{
    AudioOutput, AudioPipeline, CommandPlayer, CommandSynthesizer, SpeechArtifact,
    SpeechSynthesizer,
};
pub use config::{AlertConfig, CommandSpec};
pub use cooldown::CooldownState;
pub use dispatcher::{AlertDispatcher, DispatchOutcome};
pub use error::{AlertError, AlertResult};
