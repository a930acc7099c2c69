//! Controller: the single thread that owns and mutates the clock.
//!
//! Input, ticks and Ctrl-C all arrive as [`Event`]s on one channel and are
//! handled to completion in delivery order. After every event the tick driver
//! is reconciled with the running flag: it is spawned on start and dropped
//! (stopped and joined) on pause, reset and teardown.
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::alert::Alert;
use crate::clock::{Clock, Mode, TickOutcome, TimerState};
use crate::command::UserCommand;
use crate::display::{self, HELP};
use crate::error::{CommandError, Result};
use crate::timer::{Generation, TICK_PERIOD, Ticker};

#[derive(Debug)]
pub enum Event {
    Tick(Generation),
    Command(UserCommand),
    InvalidInput(CommandError),
    InputClosed,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<A: Alert, W: Write> {
    clock: Clock<A>,
    ticker: Option<Ticker>,
    next_generation: Generation,
    tick_period: Duration,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    out: W,
    message: Option<String>,
}

impl<A: Alert, W: Write> App<A, W> {
    pub fn new(state: TimerState, alert: A, out: W) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            clock: Clock::new(state, alert),
            ticker: None,
            next_generation: 0,
            tick_period: TICK_PERIOD,
            events_tx,
            events_rx,
            out,
            message: None,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// A handle producers use to feed the event loop.
    pub fn sender(&self) -> Sender<Event> {
        self.events_tx.clone()
    }

    pub fn clock(&self) -> &Clock<A> {
        &self.clock
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn run(&mut self) -> Result<()> {
        self.render()?;
        while let Ok(event) = self.events_rx.recv() {
            if self.handle(event)? == Flow::Quit {
                break;
            }
        }
        self.teardown()
    }

    /// Waits up to `timeout` for one event and handles it.
    pub fn step(&mut self, timeout: Duration) -> Result<Option<Flow>> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => self.handle(event).map(Some),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    pub fn handle(&mut self, event: Event) -> Result<Flow> {
        let flow = match event {
            Event::Tick(generation) => {
                self.on_tick(generation);
                Flow::Continue
            }
            Event::Command(command) => self.on_command(command),
            Event::InvalidInput(e) => {
                self.message = Some(e.to_string());
                Flow::Continue
            }
            Event::InputClosed => {
                info!("input closed");
                Flow::Quit
            }
            Event::Interrupt => {
                self.message = Some("🛑 Interrupted!".to_string());
                Flow::Quit
            }
        };
        self.sync_ticker();
        self.render()?;
        Ok(flow)
    }

    fn on_tick(&mut self, generation: Generation) {
        match &self.ticker {
            Some(ticker) if ticker.generation() == generation => {}
            _ => {
                debug!(generation, "stale tick dropped");
                return;
            }
        }
        if let TickOutcome::Switched(mode) = self.clock.tick() {
            self.message = Some(match mode {
                Mode::Break => "🍅 Session complete! Time for a break.".to_string(),
                Mode::Session => "☕ Break complete! Back to work.".to_string(),
            });
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Flow {
        debug!(?command, "command");
        match command {
            UserCommand::Toggle => self.clock.toggle(),
            UserCommand::Start => self.clock.start(),
            UserCommand::Pause => self.clock.pause(),
            UserCommand::Reset => self.clock.reset(),
            UserCommand::Adjust(phase, delta) => {
                if !self.clock.change_length(phase, delta) {
                    self.message = Some("Pause the timer to change lengths".to_string());
                }
            }
            UserCommand::Help => self.message = Some(HELP.to_string()),
            UserCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn sync_ticker(&mut self) {
        match (self.clock.is_running(), self.ticker.is_some()) {
            (true, false) => {
                self.next_generation += 1;
                self.ticker = Some(Ticker::spawn(
                    self.next_generation,
                    self.tick_period,
                    self.events_tx.clone(),
                    Event::Tick,
                ));
            }
            (false, true) => self.ticker = None,
            _ => {}
        }
    }

    fn render(&mut self) -> Result<()> {
        if let Some(message) = self.message.take() {
            writeln!(self.out, "\r\x1B[2K{}", message)?;
        }
        write!(self.out, "\r\x1B[2K{}", display::status_line(self.clock.state()))?;
        self.out.flush()?;
        Ok(())
    }

    /// Cancels the tick driver and silences the alert.
    pub fn teardown(&mut self) -> Result<()> {
        self.ticker = None;
        self.clock.shutdown();
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Reads commands line by line and forwards them until EOF or hang-up.
pub fn spawn_input<R>(reader: R, events: Sender<Event>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let event = match line {
                Ok(line) => match line.parse::<UserCommand>() {
                    Ok(command) => Event::Command(command),
                    Err(e) => Event::InvalidInput(e),
                },
                Err(e) => {
                    debug!("stdin read failed: {}", e);
                    break;
                }
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(Event::InputClosed);
    })
}
