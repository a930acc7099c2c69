//! Session/break state machine.
//!
//! `Clock` owns the [`TimerState`] and the alert collaborator. It knows
//! nothing about threads or scheduling: the controller calls [`Clock::tick`]
//! once per delivered tick.
use std::fmt;

use tracing::{debug, info, warn};

use crate::alert::Alert;

pub const DEFAULT_BREAK: u32 = 5;
pub const DEFAULT_SESSION: u32 = 25;
pub const MIN_LENGTH: u32 = 1;
pub const MAX_LENGTH: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Session,
    Break,
}

impl Mode {
    pub fn flipped(self) -> Self {
        match self {
            Mode::Session => Mode::Break,
            Mode::Break => Mode::Session,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Session => write!(f, "Session"),
            Mode::Break => write!(f, "Break"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub mode: Mode,
    /// Minutes, always within `MIN_LENGTH..=MAX_LENGTH`.
    pub break_length: u32,
    /// Minutes, always within `MIN_LENGTH..=MAX_LENGTH`.
    pub session_length: u32,
    /// Seconds remaining in the current phase.
    pub time_left: u32,
    pub is_running: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            mode: Mode::Session,
            break_length: DEFAULT_BREAK,
            session_length: DEFAULT_SESSION,
            time_left: DEFAULT_SESSION * 60,
            is_running: false,
        }
    }
}

impl TimerState {
    pub fn with_lengths(session: i64, brk: i64) -> Self {
        let mut state = Self {
            session_length: clamp_length(session),
            break_length: clamp_length(brk),
            ..Self::default()
        };
        state.sync_time_left();
        state
    }

    pub fn length_of(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Session => self.session_length,
            Mode::Break => self.break_length,
        }
    }

    /// Total seconds of the current phase.
    pub fn phase_seconds(&self) -> u32 {
        self.length_of(self.mode) * 60
    }

    fn length_mut(&mut self, mode: Mode) -> &mut u32 {
        match mode {
            Mode::Session => &mut self.session_length,
            Mode::Break => &mut self.break_length,
        }
    }

    fn sync_time_left(&mut self) {
        self.time_left = self.phase_seconds();
    }
}

pub fn clamp_length(value: i64) -> u32 {
    value.clamp(MIN_LENGTH as i64, MAX_LENGTH as i64) as u32
}

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Counted,
    Switched(Mode),
}

pub struct Clock<A: Alert> {
    state: TimerState,
    alert: A,
}

impl<A: Alert> Clock<A> {
    pub fn new(state: TimerState, alert: A) -> Self {
        Self { state, alert }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        info!(mode = %self.state.mode, time_left = self.state.time_left, "timer started");
    }

    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }
        self.state.is_running = false;
        info!(mode = %self.state.mode, time_left = self.state.time_left, "timer paused");
    }

    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::default();
        if let Err(e) = self.alert.pause() {
            warn!("Failed to stop alert: {}", e);
        }
        if let Err(e) = self.alert.rewind() {
            warn!("Failed to rewind alert: {}", e);
        }
        info!("timer reset");
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running {
            debug!("tick ignored while idle");
            return TickOutcome::Idle;
        }
        if self.state.time_left > 0 {
            self.state.time_left -= 1;
        }
        if self.state.time_left > 0 {
            return TickOutcome::Counted;
        }

        self.sound_alert();
        self.state.mode = self.state.mode.flipped();
        self.state.sync_time_left();
        info!(mode = %self.state.mode, time_left = self.state.time_left, "phase switched");
        TickOutcome::Switched(self.state.mode)
    }

    /// Returns `false` when the change was ignored because the timer runs.
    pub fn change_length(&mut self, phase: Mode, delta: i64) -> bool {
        if self.state.is_running {
            debug!(%phase, delta, "length change ignored while running");
            return false;
        }
        let length = self.state.length_mut(phase);
        *length = clamp_length((*length as i64).saturating_add(delta));
        debug!(%phase, length = *length, "length changed");
        if phase == self.state.mode {
            self.state.sync_time_left();
        }
        true
    }

    pub fn change_break(&mut self, delta: i64) -> bool {
        self.change_length(Mode::Break, delta)
    }

    pub fn change_session(&mut self, delta: i64) -> bool {
        self.change_length(Mode::Session, delta)
    }

    fn sound_alert(&mut self) {
        let played = self.alert.rewind().and_then(|_| self.alert.play());
        if let Err(e) = played {
            warn!("Alert failed to play: {}", e);
        }
    }

    /// Stops the alert before the clock goes away.
    pub fn shutdown(&mut self) {
        self.state.is_running = false;
        if let Err(e) = self.alert.pause() {
            debug!("Alert pause on shutdown failed: {}", e);
        }
    }
}
