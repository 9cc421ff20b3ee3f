use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the match loop wakes up on. `Tick` fires whenever no input
/// arrives within the runner's interval and drives the countdown, the
/// round timer, and the bot schedule.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where keystrokes and resizes come from. Production wraps a crossterm
/// reader thread; headless tests feed a plain channel.
pub trait GameEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Terminal-backed source. Key releases are dropped so one keystroke
/// never pulls the rope twice on terminals that report both edges.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || forward_terminal_events(tx));
        Self { rx }
    }
}

fn forward_terminal_events(tx: Sender<GameEvent>) {
    loop {
        let forwarded = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                tx.send(GameEvent::Key(key))
            }
            Ok(CtEvent::Resize(_, _)) => tx.send(GameEvent::Resize),
            Ok(_) => Ok(()),
            Err(_) => break,
        };
        if forwarded.is_err() {
            break;
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for driving the loop without a terminal.
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn channel() -> (Sender<GameEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls the next event, or a `Tick` once the interval passes without
/// one. The game has exactly one cadence, so the interval is plain data.
pub struct Runner<E: GameEventSource> {
    source: E,
    tick_interval: Duration,
}

impl<E: GameEventSource> Runner<E> {
    pub fn new(source: E, tick_interval: Duration) -> Self {
        Self {
            source,
            tick_interval,
        }
    }

    pub fn step(&self) -> GameEvent {
        match self.source.recv_timeout(self.tick_interval) {
            Ok(event) => event,
            // A closed source means no more input is coming; ticks keep
            // the countdown and bot moving until the caller stops stepping
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                GameEvent::Tick
            }
        }
    }
}
