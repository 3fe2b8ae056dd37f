use std::cell::Cell;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::{Error, Result};

/// Keeps the terminal in raw mode for as long as it lives.
///
/// Dropping the guard restores the previous mode, which covers early returns
/// and unwinding. Call [`RawModeGuard::release`] on the happy path to see
/// whether the restore itself failed.
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        enable_raw_mode().map_err(|e| Error::Terminal(format!("cannot enter raw mode: {e}")))?;
        Ok(Self { active: true })
    }

    pub fn release(mut self) -> Result<()> {
        self.active = false;
        disable_raw_mode().map_err(|e| Error::Terminal(format!("cannot restore terminal mode: {e}")))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = disable_raw_mode() {
                log::error!("failed to restore terminal mode: {e}");
            }
        }
    }
}

/// Block until one key is pressed and return it as the character a raw
/// terminal would deliver. Raw mode is only held for the duration of the read.
pub fn read_single_key() -> Result<char> {
    let guard = RawModeGuard::acquire()?;
    let key = wait_for_char();
    guard.release()?;
    key
}

fn wait_for_char() -> Result<char> {
    loop {
        match event::read() {
            Ok(Event::Key(key)) => match key_to_char(&key) {
                Some(c) => return Ok(c),
                None => log::trace!("skipping key without a character: {key:?}"),
            },
            Ok(_) => {}
            Err(e) => return Err(Error::Input(format!("failed to read key: {e}"))),
        }
    }
}

/// Map a crossterm key event onto a single character, or `None` for keys
/// (arrows, function keys, releases) that have no one-character form.
pub fn key_to_char(key: &KeyEvent) -> Option<char> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            ' ' => Some('\0'),
            c if c.is_ascii_alphabetic() => Some(((c.to_ascii_lowercase() as u8) & 0x1f) as char),
            c => Some(c),
        },
        KeyCode::Char(c) => Some(c),
        KeyCode::Enter => Some('\r'),
        KeyCode::Tab => Some('\t'),
        KeyCode::Backspace => Some('\x7f'),
        KeyCode::Esc => Some('\x1b'),
        _ => None,
    }
}

/// Source of single key presses
pub trait KeySource {
    /// Block until the next key is available.
    fn next_key(&mut self) -> Result<char>;
}

/// Production key source reading the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalKeySource;

impl KeySource for TerminalKeySource {
    fn next_key(&mut self) -> Result<char> {
        read_single_key()
    }
}

/// Test key source replaying keys sent over a channel
pub struct TestKeySource {
    rx: Receiver<char>,
}

impl TestKeySource {
    pub fn new(rx: Receiver<char>) -> Self {
        Self { rx }
    }

    /// Queue every character of `keys`, then close the channel.
    pub fn from_keys(keys: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        for c in keys.chars() {
            let _ = tx.send(c);
        }
        Self { rx }
    }
}

impl KeySource for TestKeySource {
    fn next_key(&mut self) -> Result<char> {
        self.rx
            .recv()
            .map_err(|_| Error::Input("key stream closed".into()))
    }
}

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests.
///
/// Every call to `now` moves time forward by `step` after reading it, and
/// `advance` moves it by an arbitrary amount.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::stepping(Duration::ZERO)
    }

    pub fn stepping(step: Duration) -> Self {
        Self {
            now: Cell::new(Instant::now()),
            step,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::KeyEventState;
    use crossterm::terminal::is_raw_mode_enabled;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_keys_map_to_themselves() {
        assert_eq!(key_to_char(&press(KeyCode::Char(' '), KeyModifiers::NONE)), Some(' '));
        assert_eq!(key_to_char(&press(KeyCode::Char('x'), KeyModifiers::NONE)), Some('x'));
        assert_eq!(key_to_char(&press(KeyCode::Char('X'), KeyModifiers::SHIFT)), Some('X'));
    }

    #[test]
    fn control_keys_map_to_control_codes() {
        assert_eq!(key_to_char(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some('\x03'));
        assert_eq!(key_to_char(&press(KeyCode::Char(' '), KeyModifiers::CONTROL)), Some('\0'));
        assert_eq!(key_to_char(&press(KeyCode::Enter, KeyModifiers::NONE)), Some('\r'));
        assert_eq!(key_to_char(&press(KeyCode::Esc, KeyModifiers::NONE)), Some('\x1b'));
        assert_eq!(key_to_char(&press(KeyCode::Backspace, KeyModifiers::NONE)), Some('\x7f'));
    }

    #[test]
    fn keys_without_a_character_are_skipped() {
        assert_eq!(key_to_char(&press(KeyCode::Up, KeyModifiers::NONE)), None);
        assert_eq!(key_to_char(&press(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn releases_are_skipped() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(key_to_char(&release), None);
    }

    // One test so parallel tests never observe each other's raw mode.
    #[test]
    fn raw_mode_is_restored_on_release_drop_and_unwind() {
        drop(RawModeGuard { active: false });
        assert!(!is_raw_mode_enabled().unwrap());

        match RawModeGuard::acquire() {
            Ok(guard) => {
                assert!(is_raw_mode_enabled().unwrap());
                guard.release().unwrap();
                assert!(!is_raw_mode_enabled().unwrap());

                drop(RawModeGuard::acquire().unwrap());
                assert!(!is_raw_mode_enabled().unwrap());

                let unwound = std::panic::catch_unwind(|| {
                    let _guard = RawModeGuard::acquire().unwrap();
                    panic!("key read failed");
                });
                assert!(unwound.is_err());
                assert!(!is_raw_mode_enabled().unwrap());
            }
            // no controlling terminal
            Err(e) => {
                assert_matches!(e, Error::Terminal(_));
                assert!(!is_raw_mode_enabled().unwrap());
            }
        }
    }

    #[test]
    fn test_source_replays_then_errors() {
        let mut keys = TestKeySource::from_keys("a x");
        assert_eq!(keys.next_key().unwrap(), 'a');
        assert_eq!(keys.next_key().unwrap(), ' ');
        assert_eq!(keys.next_key().unwrap(), 'x');
        assert!(matches!(keys.next_key(), Err(Error::Input(_))));
    }

    #[test]
    fn test_source_passes_through_channel() {
        let (tx, rx) = mpsc::channel();
        tx.send(' ').unwrap();
        let mut keys = TestKeySource::new(rx);
        assert_eq!(keys.next_key().unwrap(), ' ');
    }

    #[test]
    fn manual_clock_steps_and_advances() {
        let clock = ManualClock::stepping(Duration::from_millis(500));
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, Duration::from_millis(500));

        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - second, Duration::from_millis(2500));
    }

    #[test]
    fn system_clock_never_goes_backwards() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
