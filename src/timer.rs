/// Timer module: the one-second tick driver.
///
/// A `Ticker` owns a worker thread that sends `Tick(generation)` into the
/// controller's queue once per period. Dropping the ticker stops and joins
/// the worker, so a ticker exists exactly as long as the clock runs.
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Serial number of a ticker; ticks from a cancelled ticker carry a stale one.
pub type Generation = u64;

pub struct Ticker {
    generation: Generation,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns a worker delivering `make_event(generation)` every `period`
    /// until cancelled or until the receiving side hangs up.
    pub fn spawn<E, F>(generation: Generation, period: Duration, events: Sender<E>, make_event: F) -> Self
    where
        E: Send + 'static,
        F: Fn(Generation) -> E + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        trace!(generation, "tick");
                        if events.send(make_event(generation)).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(generation, "ticker stopped");
        });
        debug!(generation, ?period, "ticker started");

        Self {
            generation,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Stops the worker and waits for it. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(5);

    #[test]
    fn delivers_ticks_tagged_with_generation() {
        let (tx, rx) = mpsc::channel();
        let _ticker = Ticker::spawn(7, FAST, tx, |g| g);
        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(7));
        }
    }

    #[test]
    fn no_ticks_after_cancel() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = Ticker::spawn(1, FAST, tx, |g| g);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        ticker.cancel();
        ticker.cancel();
        while rx.try_recv().is_ok() {}
        thread::sleep(FAST * 10);
        // The worker dropped its sender when it exited.
        assert_eq!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected));
    }

    #[test]
    fn drop_joins_worker() {
        let (tx, rx) = mpsc::channel();
        {
            let _ticker = Ticker::spawn(2, Duration::from_secs(60), tx, |g| g);
        }
        assert_eq!(rx.recv(), Err(mpsc::RecvError));
    }

    #[test]
    fn stops_when_receiver_hangs_up() {
        let (tx, rx) = mpsc::channel::<Generation>();
        let mut ticker = Ticker::spawn(3, FAST, tx, |g| g);
        drop(rx);
        thread::sleep(FAST * 4);
        ticker.cancel();
        assert!(ticker.handle.is_none());
    }
}
