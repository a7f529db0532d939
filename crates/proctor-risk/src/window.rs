//! Bounded FIFO of recent frame scores.

use std::collections::VecDeque;

/// A fixed-capacity FIFO window of frame scores.
///
/// When full, pushing a new score evicts the oldest one. The length never
/// exceeds the capacity.
#[derive(Clone, Debug)]
pub struct ScoreWindow {
    scores: VecDeque<u8>,
    capacity: usize,
}

impl ScoreWindow {
    /// Create a window holding at most `capacity` scores (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            scores: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a score, evicting the oldest if the window is full.
    ///
    /// Returns the evicted score, if any.
    pub fn push(&mut self, score: u8) -> Option<u8> {
        let evicted = if self.scores.len() == self.capacity {
            self.scores.pop_front()
        } else {
            None
        };
        self.scores.push_back(score);
        evicted
    }

    /// Arithmetic mean truncated towards zero, or `None` when empty.
    pub fn average(&self) -> Option<u8> {
        if self.scores.is_empty() {
            return None;
        }
        let sum: u32 = self.scores.iter().map(|s| u32::from(*s)).sum();
        let mean = sum / self.scores.len() as u32;
        Some(mean.min(100) as u8)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Scores oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.scores.iter().copied()
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
