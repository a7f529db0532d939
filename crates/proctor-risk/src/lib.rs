//! # proctor-risk
//!
//! Turns per-frame detector signals into an explainable cheating-risk
//! estimate and a single violation label.
//!
//! ## Components
//!
//! - **RiskFusionEngine**: additive weighted frame score plus a fixed-size
//!   FIFO window whose mean is the reported probability
//! - **ScoreWindow**: the bounded FIFO of recent frame scores
//! - **classify**: stateless single-label violation classifier
//!
//! The probability is windowed but the reasons returned alongside it always
//! describe the current frame only.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod window;

pub use classifier::classify;
pub use config::{FusionConfig, DEFAULT_WINDOW_SIZE};
pub use engine::RiskFusionEngine;
pub use error::{RiskError, RiskResult};
pub use window::ScoreWindow;
