//! Fusion engine configuration.

use proctor_types::WeightTable;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// Number of frame scores averaged into the probability by default.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Configuration for [`RiskFusionEngine`](crate::RiskFusionEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Capacity of the FIFO score window
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Additive weight per violation type
    #[serde(default = "WeightTable::risk_defaults")]
    pub risk_weights: WeightTable,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            risk_weights: WeightTable::risk_defaults(),
        }
    }
}

impl FusionConfig {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_risk_weights(mut self, risk_weights: WeightTable) -> Self {
        self.risk_weights = risk_weights;
        self
    }

    pub fn validate(&self) -> RiskResult<()> {
        if self.window_size == 0 {
            return Err(RiskError::InvalidWindowSize);
        }
        Ok(())
    }
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
