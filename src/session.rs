use crate::answer::is_correct;
use crate::bot::{BotAction, BotAgent};
use crate::question::{self, Difficulty, Question};
use crate::timer::RoundTimer;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pre-round countdown shown before input is accepted.
pub const COUNTDOWN: Duration = Duration::from_millis(3500);
/// Per-side input buffer cap.
pub const MAX_INPUT_LEN: usize = 6;
pub const TARGET_MIN: i32 = 3;
pub const TARGET_MAX: i32 = 20;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Mode {
    #[strum(serialize = "PvP")]
    PvP,
    #[strum(serialize = "PvBot")]
    PvBot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Countdown,
    Active,
    Over,
}

/// State owned per competitor: display name, the raw input buffer, and a
/// monotonic correct-answer count.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub name: String,
    pub buffer: String,
    pub correct_count: u32,
}

impl PlayerState {
    fn new(name: String) -> Self {
        Self {
            name,
            buffer: String::new(),
            correct_count: 0,
        }
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub left_name: String,
    pub right_name: String,
    pub target: i32,
    pub round_limit: Duration,
}

/// Outcome of a completed match, produced exactly once and handed to the
/// scoring collaborator unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_name: String,
    pub left_name: String,
    pub right_name: String,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub elapsed_ms: u64,
    pub left_correct: u32,
    pub right_correct: u32,
}

/// Events drained by the surrounding application each tick. The session
/// never calls back into UI code.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    RoundStarted,
    AnswerCorrect(Side),
    AnswerIncorrect(Side),
    Timeout,
    MatchEnded(MatchResult),
}

/// The match session state machine:
/// `Countdown -> Active -> (round resolution -> Active)* -> Over`,
/// with an orthogonal paused flag that can only be toggled from Active.
///
/// All mutation happens synchronously inside `tick` or an input method;
/// the session is single-threaded by construction.
#[derive(Debug)]
pub struct MatchSession {
    config: SessionConfig,
    target: i32,
    phase: Phase,
    position: i32,
    left: PlayerState,
    right: PlayerState,
    question: Question,
    timer: RoundTimer,
    bot: Option<BotAgent>,
    countdown_started: Instant,
    match_started: Option<Instant>,
    paused_at: Option<Instant>,
    winner: Option<Side>,
    events: Vec<MatchEvent>,
}

impl MatchSession {
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        let target = config.target.clamp(TARGET_MIN, TARGET_MAX);
        let question = question::generate(config.difficulty);
        let timer = RoundTimer::new(now, config.round_limit);
        Self {
            left: PlayerState::new(config.left_name.clone()),
            right: PlayerState::new(config.right_name.clone()),
            target,
            phase: Phase::Countdown,
            position: 0,
            question,
            timer,
            bot: None,
            countdown_started: now,
            match_started: None,
            paused_at: None,
            winner: None,
            events: Vec::new(),
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn prompt(&self) -> &str {
        &self.question.prompt
    }

    pub fn expected_answer(&self) -> &str {
        &self.question.answer
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|side| self.player(side).name.as_str())
    }

    pub fn remaining_round_time(&self, now: Instant) -> Duration {
        self.timer.remaining(now)
    }

    pub fn countdown_remaining(&self, now: Instant) -> Duration {
        COUNTDOWN.saturating_sub(now.saturating_duration_since(self.countdown_started))
    }

    /// Take all events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance countdown, round timer, and the bot schedule. No-op while
    /// paused or once the match is over.
    pub fn tick(&mut self, now: Instant) {
        if self.phase == Phase::Over || self.is_paused() {
            return;
        }
        if self.phase == Phase::Countdown {
            if now.saturating_duration_since(self.countdown_started) >= COUNTDOWN {
                self.phase = Phase::Active;
                self.match_started = Some(now);
                self.start_round(now);
            }
            return;
        }
        let bot_action = self.bot.as_mut().and_then(|bot| bot.poll(now));
        match bot_action {
            Some(BotAction::Type(c)) => self.right.buffer.push(c),
            Some(BotAction::Submit) => self.submit_inner(Side::Right, true, now),
            None => {}
        }
        // PvBot rounds have no timeout penalty; the bot always answers
        if self.phase == Phase::Active
            && self.config.mode == Mode::PvP
            && self.timer.is_expired(now)
        {
            self.events.push(MatchEvent::Timeout);
            // Nudge toward the side losing or at parity, never the leader
            if self.position >= 0 {
                self.position -= 1;
            } else {
                self.position += 1;
            }
            self.check_win(now);
            if self.phase == Phase::Active {
                self.start_round(now);
            }
        }
    }

    /// Accept one keystroke into a side's buffer: digits, a single decimal
    /// point, or the fraction separator. Ignored outside Active or while
    /// paused.
    pub fn input_char(&mut self, side: Side, c: char) {
        if self.phase != Phase::Active || self.is_paused() {
            return;
        }
        let buffer = &mut self.player_mut(side).buffer;
        if buffer.len() >= MAX_INPUT_LEN {
            return;
        }
        match c {
            '0'..='9' | '/' => buffer.push(c),
            '.' if !buffer.contains('.') => buffer.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self, side: Side) {
        if self.phase != Phase::Active || self.is_paused() {
            return;
        }
        self.player_mut(side).buffer.pop();
    }

    pub fn clear_input(&mut self, side: Side) {
        if self.phase != Phase::Active || self.is_paused() {
            return;
        }
        self.player_mut(side).clear_buffer();
    }

    /// Human-initiated submit. Empty buffers are ignored.
    pub fn submit(&mut self, side: Side, now: Instant) {
        if self.phase != Phase::Active || self.is_paused() {
            return;
        }
        self.submit_inner(side, false, now);
    }

    fn submit_inner(&mut self, side: Side, is_bot: bool, now: Instant) {
        let submitted = self.player(side).buffer.clone();
        if !is_bot && submitted.is_empty() {
            return;
        }
        if is_correct(&submitted, &self.question.answer) {
            self.player_mut(side).correct_count += 1;
            match side {
                Side::Left => self.position -= 1,
                Side::Right => self.position += 1,
            }
            self.events.push(MatchEvent::AnswerCorrect(side));
            self.left.clear_buffer();
            self.right.clear_buffer();
            self.check_win(now);
            if self.phase == Phase::Active {
                self.start_round(now);
            }
        } else if !is_bot {
            self.events.push(MatchEvent::AnswerIncorrect(side));
            self.player_mut(side).clear_buffer();
        }
    }

    /// Adjust the target threshold by `delta`, clamped to
    /// `[TARGET_MIN, TARGET_MAX]`. Re-runs the win check immediately; a
    /// match that has already concluded is never un-concluded, so changes
    /// after Over are ignored.
    pub fn adjust_target(&mut self, delta: i32, now: Instant) {
        if self.phase == Phase::Over {
            return;
        }
        self.target = (self.target + delta).clamp(TARGET_MIN, TARGET_MAX);
        self.check_win(now);
    }

    /// Toggle the pause flag. Only meaningful while Active; freezes the
    /// round timer and the bot schedule, rendering reads are unaffected.
    pub fn toggle_pause(&mut self, now: Instant) {
        if self.phase != Phase::Active {
            return;
        }
        match self.paused_at.take() {
            Some(paused_at) => {
                self.timer.resume(now);
                if let Some(bot) = self.bot.as_mut() {
                    bot.shift(now.saturating_duration_since(paused_at));
                }
            }
            None => {
                self.paused_at = Some(now);
                self.timer.pause(now);
            }
        }
    }

    /// Restart the whole match with the same configuration: fresh
    /// countdown, zeroed rope and scores, new question.
    pub fn reset(&mut self, now: Instant) {
        self.phase = Phase::Countdown;
        self.position = 0;
        self.left = PlayerState::new(self.config.left_name.clone());
        self.right = PlayerState::new(self.config.right_name.clone());
        self.question = question::generate(self.config.difficulty);
        self.timer = RoundTimer::new(now, self.config.round_limit);
        self.bot = None;
        self.countdown_started = now;
        self.match_started = None;
        self.paused_at = None;
        self.winner = None;
        self.events.clear();
    }

    fn start_round(&mut self, now: Instant) {
        self.question = question::generate(self.config.difficulty);
        self.left.clear_buffer();
        self.right.clear_buffer();
        self.timer.restart(now);
        if self.config.mode == Mode::PvBot {
            self.bot = Some(BotAgent::arm(
                now,
                self.config.difficulty,
                self.config.round_limit,
                &self.question.answer,
            ));
        }
        self.events.push(MatchEvent::RoundStarted);
    }

    /// Invoked after every rope movement and on threshold changes. Ends
    /// the match and emits the result exactly once.
    fn check_win(&mut self, now: Instant) {
        if self.phase != Phase::Active || self.position.abs() < self.target {
            return;
        }
        let winner = if self.position <= -self.target {
            Side::Left
        } else {
            Side::Right
        };
        self.winner = Some(winner);
        self.phase = Phase::Over;
        self.bot = None;
        let elapsed_ms = self
            .match_started
            .map(|start| now.saturating_duration_since(start).as_millis() as u64)
            .unwrap_or(0);
        let result = MatchResult {
            winner_name: self.player(winner).name.clone(),
            left_name: self.left.name.clone(),
            right_name: self.right.name.clone(),
            mode: self.config.mode,
            difficulty: self.config.difficulty,
            elapsed_ms,
            left_correct: self.left.correct_count,
            right_correct: self.right.correct_count,
        };
        self.events.push(MatchEvent::MatchEnded(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: Mode, target: i32) -> SessionConfig {
        SessionConfig {
            mode,
            difficulty: Difficulty::Easy,
            left_name: "ADA".into(),
            right_name: "BOB".into(),
            target,
            round_limit: Duration::from_secs(15),
        }
    }

    fn started(mode: Mode, target: i32) -> (MatchSession, Instant) {
        let t0 = Instant::now();
        let mut session = MatchSession::new(config(mode, target), t0);
        let now = t0 + COUNTDOWN;
        session.tick(now);
        assert_eq!(session.phase(), Phase::Active);
        (session, now)
    }

    fn type_answer(session: &mut MatchSession, side: Side) {
        let answer = session.expected_answer().to_string();
        for c in answer.chars() {
            session.input_char(side, c);
        }
    }

    #[test]
    fn countdown_blocks_input() {
        let t0 = Instant::now();
        let mut session = MatchSession::new(config(Mode::PvP, 5), t0);
        assert_eq!(session.phase(), Phase::Countdown);
        session.input_char(Side::Left, '4');
        assert_eq!(session.player(Side::Left).buffer, "");
        session.tick(t0 + Duration::from_secs(1));
        assert_eq!(session.phase(), Phase::Countdown);
    }

    #[test]
    fn correct_answer_moves_rope_toward_scorer() {
        let (mut session, now) = started(Mode::PvP, 5);
        type_answer(&mut session, Side::Left);
        session.submit(Side::Left, now);
        assert_eq!(session.position(), -1);
        assert_eq!(session.player(Side::Left).correct_count, 1);
        // Both buffers cleared and a new round started
        assert_eq!(session.player(Side::Left).buffer, "");
        assert_eq!(session.player(Side::Right).buffer, "");
        assert!(session
            .drain_events()
            .contains(&MatchEvent::AnswerCorrect(Side::Left)));
    }

    #[test]
    fn incorrect_answer_clears_only_that_buffer() {
        let (mut session, now) = started(Mode::PvP, 5);
        session.input_char(Side::Right, '1');
        let wrong = if session.expected_answer() == "99" {
            "98"
        } else {
            "99"
        };
        for c in wrong.chars() {
            session.input_char(Side::Left, c);
        }
        session.submit(Side::Left, now);
        assert_eq!(session.position(), 0);
        assert_eq!(session.player(Side::Left).buffer, "");
        assert_eq!(session.player(Side::Right).buffer, "1");
        assert!(session
            .drain_events()
            .contains(&MatchEvent::AnswerIncorrect(Side::Left)));
    }

    #[test]
    fn empty_human_submit_is_ignored() {
        let (mut session, now) = started(Mode::PvP, 5);
        session.submit(Side::Left, now);
        assert_eq!(session.position(), 0);
        assert!(!session
            .drain_events()
            .contains(&MatchEvent::AnswerIncorrect(Side::Left)));
    }

    #[test]
    fn buffer_caps_at_six_chars_and_single_decimal() {
        let (mut session, _) = started(Mode::PvP, 5);
        for c in "123456789".chars() {
            session.input_char(Side::Left, c);
        }
        assert_eq!(session.player(Side::Left).buffer, "123456");
        session.clear_input(Side::Left);
        session.input_char(Side::Left, '1');
        session.input_char(Side::Left, '.');
        session.input_char(Side::Left, '.');
        session.input_char(Side::Left, '5');
        assert_eq!(session.player(Side::Left).buffer, "1.5");
    }

    #[test]
    fn left_win_at_threshold() {
        let (mut session, mut now) = started(Mode::PvP, 3);
        for _ in 0..3 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Left);
            session.submit(Side::Left, now);
        }
        assert_eq!(session.phase(), Phase::Over);
        assert_eq!(session.position(), -3);
        assert_eq!(session.winner_name(), Some("ADA"));
        let events = session.drain_events();
        let result = events
            .iter()
            .find_map(|ev| match ev {
                MatchEvent::MatchEnded(r) => Some(r.clone()),
                _ => None,
            })
            .expect("match ended event");
        assert_eq!(result.winner_name, "ADA");
        assert_eq!(result.left_correct, 3);
        assert_eq!(result.right_correct, 0);
    }

    #[test]
    fn result_is_emitted_exactly_once() {
        let (mut session, mut now) = started(Mode::PvP, 3);
        for _ in 0..3 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Left);
            session.submit(Side::Left, now);
        }
        let ended = session
            .drain_events()
            .iter()
            .filter(|ev| matches!(ev, MatchEvent::MatchEnded(_)))
            .count();
        assert_eq!(ended, 1);
        session.tick(now + Duration::from_secs(30));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn timeout_nudges_toward_losing_side() {
        let (mut session, mut now) = started(Mode::PvP, 8);
        // Put the right side ahead by two
        for _ in 0..2 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Right);
            session.submit(Side::Right, now);
        }
        assert_eq!(session.position(), 2);
        now += Duration::from_secs(16);
        session.tick(now);
        assert_eq!(session.position(), 1);
        assert!(session.drain_events().contains(&MatchEvent::Timeout));
    }

    #[test]
    fn timeout_nudge_when_left_is_ahead() {
        let (mut session, mut now) = started(Mode::PvP, 8);
        now += Duration::from_secs(1);
        type_answer(&mut session, Side::Left);
        session.submit(Side::Left, now);
        assert_eq!(session.position(), -1);
        now += Duration::from_secs(16);
        session.tick(now);
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn pvbot_has_no_timeout_penalty() {
        let (mut session, now) = started(Mode::PvBot, 8);
        session.tick(now + Duration::from_secs(300));
        // The bot may have acted, but no timeout event is ever produced
        assert!(!session.drain_events().contains(&MatchEvent::Timeout));
    }

    #[test]
    fn bot_types_and_scores_unattended() {
        let (mut session, mut now) = started(Mode::PvBot, 3);
        for _ in 0..10_000 {
            now += Duration::from_millis(100);
            session.tick(now);
            if session.phase() == Phase::Over {
                break;
            }
        }
        assert_eq!(session.phase(), Phase::Over);
        assert_eq!(session.winner_name(), Some("BOB"));
        assert_eq!(session.position(), 3);
    }

    #[test]
    fn pause_freezes_round_timer() {
        let (mut session, now) = started(Mode::PvP, 5);
        let pause_at = now + Duration::from_secs(5);
        session.toggle_pause(pause_at);
        assert!(session.is_paused());
        let much_later = pause_at + Duration::from_secs(900);
        session.tick(much_later);
        assert_eq!(
            session.remaining_round_time(much_later),
            Duration::from_secs(10)
        );
        session.toggle_pause(much_later);
        assert!(!session.is_paused());
        assert_eq!(
            session.remaining_round_time(much_later + Duration::from_secs(2)),
            Duration::from_secs(8)
        );
    }

    #[test]
    fn paused_session_rejects_input() {
        let (mut session, now) = started(Mode::PvP, 5);
        session.toggle_pause(now);
        session.input_char(Side::Left, '7');
        assert_eq!(session.player(Side::Left).buffer, "");
        session.submit(Side::Left, now);
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn target_adjust_is_clamped() {
        let (mut session, now) = started(Mode::PvP, 3);
        session.adjust_target(-5, now);
        assert_eq!(session.target(), TARGET_MIN);
        for _ in 0..40 {
            session.adjust_target(1, now);
        }
        assert_eq!(session.target(), TARGET_MAX);
    }

    #[test]
    fn lowering_target_can_end_the_match() {
        let (mut session, mut now) = started(Mode::PvP, 8);
        for _ in 0..3 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Left);
            session.submit(Side::Left, now);
        }
        assert_eq!(session.position(), -3);
        assert_eq!(session.phase(), Phase::Active);
        session.adjust_target(-5, now);
        assert_eq!(session.target(), 3);
        assert_eq!(session.phase(), Phase::Over);
        assert_eq!(session.winner_name(), Some("ADA"));
    }

    #[test]
    fn target_changes_after_match_over_are_ignored() {
        let (mut session, mut now) = started(Mode::PvP, 3);
        for _ in 0..3 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Left);
            session.submit(Side::Left, now);
        }
        assert_eq!(session.phase(), Phase::Over);
        session.adjust_target(10, now);
        assert_eq!(session.target(), 3);
        assert_eq!(session.phase(), Phase::Over);
        assert_eq!(session.winner_name(), Some("ADA"));
    }

    #[test]
    fn rope_position_bounded_until_win() {
        let (mut session, mut now) = started(Mode::PvP, 4);
        for _ in 0..20 {
            now += Duration::from_secs(1);
            type_answer(&mut session, Side::Left);
            session.submit(Side::Left, now);
            assert!(session.position().abs() <= session.target());
            if session.phase() == Phase::Over {
                break;
            }
        }
        assert_eq!(session.phase(), Phase::Over);
        assert!(session.position().abs() >= session.target());
    }

    #[test]
    fn reset_returns_to_fresh_countdown() {
        let (mut session, mut now) = started(Mode::PvP, 3);
        now += Duration::from_secs(1);
        type_answer(&mut session, Side::Left);
        session.submit(Side::Left, now);
        assert_eq!(session.position(), -1);
        session.reset(now);
        assert_eq!(session.phase(), Phase::Countdown);
        assert_eq!(session.position(), 0);
        assert_eq!(session.player(Side::Left).correct_count, 0);
        assert!(session.drain_events().is_empty());
    }
}
