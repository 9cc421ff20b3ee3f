use std::time::{Duration, Instant};

/// Per-round countdown with pause support.
///
/// Pausing snapshots the remaining budget; resuming rebases the start
/// instant so wall-clock time spent paused never counts against the round.
#[derive(Debug, Clone, Copy)]
pub struct RoundTimer {
    started_at: Instant,
    limit: Duration,
    paused_remaining: Option<Duration>,
}

impl RoundTimer {
    pub fn new(now: Instant, limit: Duration) -> Self {
        Self {
            started_at: now,
            limit,
            paused_remaining: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn restart(&mut self, now: Instant) {
        self.started_at = now;
        self.paused_remaining = None;
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.paused_remaining {
            Some(rem) => rem,
            None => self
                .limit
                .saturating_sub(now.saturating_duration_since(self.started_at)),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.paused_remaining.is_none() && self.remaining(now).is_zero()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_remaining.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_remaining.is_none() {
            self.paused_remaining = Some(self.remaining(now));
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(rem) = self.paused_remaining.take() {
            // Rebase so exactly `rem` is left on the clock
            self.started_at = now - (self.limit - rem);
        }
    }
}
