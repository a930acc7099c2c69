//! Terminal Pomodoro clock: a work session and a break, alternating, with an
//! alert sounded at every switch.
pub mod alert;
pub mod app;
pub mod clock;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod timer;

pub use app::{App, Event, Flow};
pub use clock::{Clock, Mode, TimerState};
pub use error::{Error, Result};
