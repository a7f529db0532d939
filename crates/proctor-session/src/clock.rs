//! Frame pacing.

use std::time::{Duration, Instant};

/// Frame timing counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub total_frames: u64,
    pub deadline_misses: u64,
    pub worst_case: Duration,
}

/// Keeps the frame loop at a target rate and tracks overruns.
#[derive(Debug)]
pub struct FrameClock {
    frame_budget: Duration,
    pace: bool,
    frame_start: Option<Instant>,
    stats: FrameStats,
}

impl FrameClock {
    /// `fps` of zero is treated as one frame per second.
    pub fn new(fps: u32, pace: bool) -> Self {
        let frame_budget = Duration::from_secs(1) / fps.max(1);
        Self {
            frame_budget,
            pace,
            frame_start: None,
            stats: FrameStats::default(),
        }
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Close the current frame, record its timing and, when pacing, sleep
    /// out the rest of the budget. Returns the frame's working time.
    pub fn end_frame(&mut self) -> Duration {
        let Some(start) = self.frame_start.take() else {
            return Duration::ZERO;
        };
        let elapsed = start.elapsed();
        self.record(elapsed);

        if self.pace && elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
        elapsed
    }

    fn record(&mut self, elapsed: Duration) {
        if elapsed > self.frame_budget {
            self.stats.deadline_misses += 1;
        }
        if elapsed > self.stats.worst_case {
            self.stats.worst_case = elapsed;
        }
        self.stats.total_frames += 1;
    }
}
