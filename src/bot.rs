use crate::question::Difficulty;
use rand::Rng;
use std::time::{Duration, Instant};

/// What the bot wants to do on this tick, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Type(char),
    Submit,
}

/// Simulated right-side opponent for PvBot matches.
///
/// Re-armed every round: picks a reveal start (a difficulty-dependent
/// fraction of the round budget) and a per-character typing delay, then
/// types the canonical answer one character per delay and submits exactly
/// once. Harder difficulties reveal earlier and type faster.
#[derive(Debug, Clone)]
pub struct BotAgent {
    answer: Vec<char>,
    next_char_at: Instant,
    typing_delay: Duration,
    chars_typed: usize,
    submitted: bool,
}

impl BotAgent {
    pub fn arm(now: Instant, difficulty: Difficulty, round_budget: Duration, answer: &str) -> Self {
        let mut rng = rand::thread_rng();
        let budget_ms = round_budget.as_millis() as u64;
        let (reveal_range, delay_range) = match difficulty {
            Difficulty::Hard => ((0.2, 0.4), (100, 200)),
            Difficulty::Mid => ((0.4, 0.7), (200, 350)),
            Difficulty::Easy => ((0.6, 0.9), (350, 500)),
        };
        let reveal_lo = (reveal_range.0 * budget_ms as f64) as u64;
        let reveal_hi = (reveal_range.1 * budget_ms as f64) as u64;
        let reveal_delay = rng.gen_range(reveal_lo..=reveal_hi.max(reveal_lo));
        let typing_delay = rng.gen_range(delay_range.0..=delay_range.1);
        Self {
            answer: answer.chars().collect(),
            next_char_at: now + Duration::from_millis(reveal_delay),
            typing_delay: Duration::from_millis(typing_delay),
            chars_typed: 0,
            submitted: false,
        }
    }

    /// Push the schedule forward, used when the match was paused so the
    /// pause duration does not count against the bot's reveal time.
    pub fn shift(&mut self, delta: Duration) {
        self.next_char_at += delta;
    }

    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    /// Advance the schedule by one step. At most one action per call; the
    /// session polls this once per tick.
    pub fn poll(&mut self, now: Instant) -> Option<BotAction> {
        if self.submitted {
            return None;
        }
        if self.chars_typed < self.answer.len() {
            if now >= self.next_char_at {
                let c = self.answer[self.chars_typed];
                self.chars_typed += 1;
                self.next_char_at = now + self.typing_delay;
                return Some(BotAction::Type(c));
            }
            return None;
        }
        if self.chars_typed > 0 {
            self.submitted = true;
            return Some(BotAction::Submit);
        }
        None
    }
}
