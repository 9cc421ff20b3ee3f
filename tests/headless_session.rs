use std::time::{Duration, Instant};

use tugmath::question::Difficulty;
use tugmath::runtime::{GameEvent, Runner, TestEventSource};
use tugmath::session::{
    MatchEvent, MatchSession, Mode, Phase, SessionConfig, Side, COUNTDOWN,
};

// Headless integration using the internal runtime + MatchSession without
// a TTY. The runner supplies the tick cadence; the test keeps its own
// simulated clock so countdowns and round timers elapse instantly.

const TICK: Duration = Duration::from_millis(100);

fn config(mode: Mode, target: i32) -> SessionConfig {
    SessionConfig {
        mode,
        difficulty: Difficulty::Easy,
        left_name: "ADA".to_string(),
        right_name: "BOB".to_string(),
        target,
        round_limit: Duration::from_secs(15),
    }
}

fn type_answer(session: &mut MatchSession, side: Side, now: Instant) {
    let answer = session.expected_answer().to_string();
    for c in answer.chars() {
        session.input_char(side, c);
    }
    session.submit(side, now);
}

#[test]
fn headless_pvbot_match_completes() {
    let mut now = Instant::now();
    let mut session = MatchSession::new(config(Mode::PvBot, 3), now);

    let (_tx, source) = TestEventSource::channel();
    let runner = Runner::new(source, Duration::from_millis(2));

    let mut result = None;
    for _ in 0..200u32 {
        match runner.step() {
            GameEvent::Tick => {
                now += TICK;
                session.tick(now);
                // The left player answers the instant a round opens
                if session.phase() == Phase::Active {
                    type_answer(&mut session, Side::Left, now);
                }
                for event in session.drain_events() {
                    if let MatchEvent::MatchEnded(r) = event {
                        result = Some(r);
                    }
                }
            }
            GameEvent::Resize | GameEvent::Key(_) => {}
        }
        if result.is_some() {
            break;
        }
    }

    let result = result.expect("match should have completed");
    assert_eq!(session.phase(), Phase::Over);
    assert_eq!(result.winner_name, "ADA");
    assert_eq!(result.left_correct, 3);
    assert_eq!(result.right_correct, 0);
    assert_eq!(session.position(), -3);
}

#[test]
fn headless_pvp_right_side_wins() {
    let mut now = Instant::now();
    let mut session = MatchSession::new(config(Mode::PvP, 3), now);

    // Burn through the countdown first
    now += COUNTDOWN;
    session.tick(now);
    assert_eq!(session.phase(), Phase::Active);

    let mut ended = 0;
    for _ in 0..10 {
        if session.phase() != Phase::Active {
            break;
        }
        now += TICK;
        session.tick(now);
        type_answer(&mut session, Side::Right, now);
        ended += session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, MatchEvent::MatchEnded(_)))
            .count();
    }

    assert_eq!(session.phase(), Phase::Over);
    assert_eq!(session.winner_name(), Some("BOB"));
    assert_eq!(session.position(), 3);
    assert_eq!(ended, 1, "MatchEnded must fire exactly once");
}

#[test]
fn headless_pvp_timeouts_never_end_a_match() {
    let round_limit = Duration::from_secs(15);
    let mut now = Instant::now();
    let mut session = MatchSession::new(config(Mode::PvP, 3), now);

    now += COUNTDOWN;
    session.tick(now);

    // A long stretch of silence: the nudge alternates the rope between
    // parity and one pull left, so nobody ever reaches the target.
    let mut timeouts = 0;
    for _ in 0..20 {
        now += round_limit + TICK;
        session.tick(now);
        timeouts += session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, MatchEvent::Timeout))
            .count();
        assert!((-1..=0).contains(&session.position()));
    }

    assert_eq!(timeouts, 20);
    assert_eq!(session.phase(), Phase::Active);
}
