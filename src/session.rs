use std::io::{BufRead, Write};
use std::time::Instant;

use crate::config::OutputMode;
use crate::error::{Error, Result};
use crate::record::{LogRecord, RecordWriter};
use crate::runtime::{Clock, KeySource};
use crate::timecode::{format_timestamp, parse_timestamp};

pub const LOG_KEY: char = ' ';
pub const QUIT_KEY: char = 'x';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingOffset,
    AwaitingFirstKey,
    Logging,
    Terminated,
}

/// What a key press does to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Log,
    Quit,
    /// no effect, the session stays where it is
    Ignored,
}

impl KeyAction {
    pub fn classify(key: char) -> Self {
        match key {
            QUIT_KEY => KeyAction::Quit,
            LOG_KEY => KeyAction::Log,
            _ => KeyAction::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub offset: u64,
    pub rows: usize,
}

/// One logging run: the offset, the clock started by the first press, and
/// the output the rows go to.
pub struct Session<W: Write, C: Clock> {
    mode: OutputMode,
    clock: C,
    state: SessionState,
    offset: u64,
    started_at: Option<Instant>,
    writer: Option<RecordWriter<W>>,
    rows: usize,
}

impl<W: Write, C: Clock> Session<W, C> {
    pub fn new(writer: RecordWriter<W>, mode: OutputMode, clock: C) -> Self {
        Self {
            mode,
            clock,
            state: SessionState::AwaitingOffset,
            offset: 0,
            started_at: None,
            writer: Some(writer),
            rows: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Prompt, read an offset and start the session.
    pub fn run<R, O, K>(&mut self, input: &mut R, out: &mut O, keys: &mut K) -> Result<SessionSummary>
    where
        R: BufRead,
        O: Write,
        K: KeySource,
    {
        let offset = self.prompt_offset(input, out)?;
        self.begin(offset, out)?;

        while self.state != SessionState::Terminated {
            let key = keys.next_key()?;
            self.handle_key(key, out)?;
        }

        Ok(SessionSummary {
            offset: self.offset,
            rows: self.rows,
        })
    }

    /// Keep asking until the operator enters a valid offset.
    pub fn prompt_offset<R: BufRead, O: Write>(&mut self, input: &mut R, out: &mut O) -> Result<u64> {
        let mut line = String::new();
        loop {
            writeln!(out, "Enter a time offset (MM:SS), or (seconds)")?;
            write!(out, "--> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Err(Error::Input("end of input while waiting for a time offset".into()));
            }

            let text = line.strip_suffix('\n').unwrap_or(&line);
            let text = text.strip_suffix('\r').unwrap_or(text);
            match parse_timestamp(text) {
                Some(offset) => return Ok(offset),
                None => {
                    log::debug!("rejected offset {text:?}");
                    writeln!(out, "Invalid time format.")?;
                }
            }
        }
    }

    /// Fix the offset and wait for the first key.
    pub fn begin<O: Write>(&mut self, offset: u64, out: &mut O) -> Result<()> {
        self.offset = offset;
        self.state = SessionState::AwaitingFirstKey;
        log::debug!("offset {offset}s, mode {}", self.mode);

        writeln!(
            out,
            "Timer will begin at {} once you press SPACE.",
            format_timestamp(offset)
        )?;
        writeln!(out, "Press SPACE to log a time. Press '{QUIT_KEY}' to quit.")?;
        out.flush()?;
        Ok(())
    }

    pub fn handle_key<O: Write>(&mut self, key: char, out: &mut O) -> Result<KeyAction> {
        if !matches!(self.state, SessionState::AwaitingFirstKey | SessionState::Logging) {
            log::warn!("key {key:?} received in state {:?}", self.state);
            return Ok(KeyAction::Ignored);
        }

        let action = KeyAction::classify(key);
        match action {
            KeyAction::Quit => self.close()?,
            KeyAction::Log => self.log_time(out)?,
            KeyAction::Ignored => log::trace!("ignoring key {key:?}"),
        }
        Ok(action)
    }

    fn log_time<O: Write>(&mut self, out: &mut O) -> Result<()> {
        let started_at = match self.started_at {
            Some(started_at) => started_at,
            None => {
                let now = self.clock.now();
                self.started_at = Some(now);
                self.state = SessionState::Logging;
                log::debug!("timer started");
                writeln!(out, "Timer started at {}", format_timestamp(self.offset))?;
                now
            }
        };

        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(started_at)
            .as_secs()
            .saturating_add(self.offset);
        let record = LogRecord::new(elapsed, self.mode);

        writeln!(out, "{record}")?;
        out.flush()?;

        if let Some(writer) = self.writer.as_mut() {
            writer.append(&record)?;
            self.rows += 1;
        }
        Ok(())
    }

    /// Flush and close the output. Only the first call does anything.
    pub fn close(&mut self) -> Result<()> {
        self.state = SessionState::Terminated;
        if let Some(writer) = self.writer.take() {
            writer.close()?;
            log::debug!("closed output after {} rows", self.rows);
        }
        Ok(())
    }
}
