//! Per-type cooldown bookkeeping.

use std::collections::HashMap;
use std::time::Duration;

use proctor_types::ViolationType;
use tokio::time::Instant;

/// Last effective emission per violation type, under one global cooldown.
///
/// Owned by a single dispatcher and mutated only through `&mut self`, so the
/// check-then-mark sequence cannot interleave with another writer.
#[derive(Debug, Clone)]
pub struct CooldownState {
    cooldown: Duration,
    last_emit: HashMap<ViolationType, Instant>,
}

impl CooldownState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emit: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether `ty` may alert at `now`. Types never emitted always may.
    pub fn can_alert(&self, ty: ViolationType, now: Instant) -> bool {
        match self.last_emit.get(&ty) {
            Some(last) => now.saturating_duration_since(*last) >= self.cooldown,
            None => true,
        }
    }

    /// Record an emission of `ty` at `now`.
    ///
    /// Timestamps never move backwards for a type.
    pub fn mark(&mut self, ty: ViolationType, now: Instant) {
        self.last_emit
            .entry(ty)
            .and_modify(|last| {
                if now > *last {
                    *last = now;
                }
            })
            .or_insert(now);
    }

    pub fn last_emit(&self, ty: ViolationType) -> Option<Instant> {
        self.last_emit.get(&ty).copied()
    }
}
