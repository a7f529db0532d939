//! Alert configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AlertError, AlertResult};

/// Alert dispatcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Enable audio alerts
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum seconds between two effective alerts of the same type
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f64,

    /// Text-to-speech command; invoked as `<program> <args..> -w <file> <text>`
    #[serde(default = "CommandSpec::default_synthesizer")]
    pub synthesizer: CommandSpec,

    /// Playback command; invoked as `<program> <args..> <file>`
    #[serde(default = "CommandSpec::default_player")]
    pub player: CommandSpec,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_secs: default_cooldown_secs(),
            synthesizer: CommandSpec::default_synthesizer(),
            player: CommandSpec::default_player(),
        }
    }
}

impl AlertConfig {
    pub fn with_cooldown_secs(mut self, cooldown_secs: f64) -> Self {
        self.cooldown_secs = cooldown_secs;
        self
    }

    /// The validated cooldown.
    pub fn cooldown(&self) -> AlertResult<Duration> {
        if !self.cooldown_secs.is_finite() || self.cooldown_secs <= 0.0 {
            return Err(AlertError::InvalidCooldown(self.cooldown_secs));
        }
        Ok(Duration::from_secs_f64(self.cooldown_secs))
    }
}

/// An external program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn default_synthesizer() -> Self {
        Self::new("espeak-ng")
    }

    pub fn default_player() -> Self {
        Self::new("aplay").with_arg("-q")
    }
}

fn default_true() -> bool {
    true
}

fn default_cooldown_secs() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlertConfig::default();
        assert!(config.enabled);
        assert_eq!(config.cooldown().unwrap(), Duration::from_secs(5));
        assert_eq!(config.player.program, "aplay");
        assert_eq!(config.player.args, vec!["-q".to_string()]);
    }

    #[test]
    fn test_invalid_cooldowns() {
        assert!(AlertConfig::default().with_cooldown_secs(0.0).cooldown().is_err());
        assert!(AlertConfig::default().with_cooldown_secs(-2.5).cooldown().is_err());
        assert!(AlertConfig::default().with_cooldown_secs(f64::NAN).cooldown().is_err());
    }

    #[test]
    fn test_fractional_cooldown() {
        let config = AlertConfig::default().with_cooldown_secs(0.5);
        assert_eq!(config.cooldown().unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_deserialize() {
        let config: AlertConfig = serde_json::from_str(r#"{"cooldown_secs": 2.0}"#).unwrap();
        assert_eq!(config.cooldown_secs, 2.0);
        assert_eq!(config.synthesizer, CommandSpec::default_synthesizer());
    }
}
