//! Dedicated sampler thread
//!
//! A measurement cycle blocks for the heater hold time plus the status
//! poll, which is too long for an async executor or a UI thread. The
//! [`SamplerWorker`] moves one engine onto its own OS thread:
//!
//! ```text
//! caller ── request_sample() ──▶ mpsc ──▶ sampler thread ── engine.sample()
//!                                                │
//! caller ◀── subscribe() / latest() ◀── watch ◀──┘   (single slot, newest wins)
//! ```
//!
//! The engine and its baseline never leave the sampler thread until
//! [`SamplerWorker::shutdown`] hands the engine back. The mailbox keeps only
//! the newest outcome; a slow reader misses intermediate cycles rather than
//! queueing them.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use airguard_core::{
    AirQualityEngine, RegisterTransport, Sample, SensorError, TelemetryRecord, TelemetrySink,
};
use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Outcome of one cycle as published in the mailbox
pub type CycleOutcome<E> = Result<Sample, SensorError<E>>;

/// Mailbox contents: `None` until the first cycle completes
pub type Mailbox<E> = watch::Receiver<Option<CycleOutcome<E>>>;

/// Worker failures
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The OS refused to start the thread
    #[error("Failed to spawn sampler thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The sampler thread is gone
    #[error("Sampler thread has stopped")]
    Stopped,

    /// The sampler thread panicked; the engine is lost
    #[error("Sampler thread panicked")]
    Panicked,
}

enum Command {
    Sample,
    Shutdown,
}

/// `DelayNs` backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// One engine running on its own thread
pub struct SamplerWorker<T: RegisterTransport> {
    commands: mpsc::UnboundedSender<Command>,
    outcomes: Mailbox<T::Error>,
    handle: JoinHandle<AirQualityEngine<T>>,
}

impl<T> SamplerWorker<T>
where
    T: RegisterTransport + Send + 'static,
    T::Error: Clone + Send + Sync + 'static,
{
    /// Move `engine` onto a new thread.
    ///
    /// Time since boot for warm-up tracking is measured from this call.
    pub fn spawn<D>(engine: AirQualityEngine<T>, delay: D) -> Result<Self, WorkerError>
    where
        D: DelayNs + Send + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcomes) = watch::channel(None);

        let handle = thread::Builder::new()
            .name("airguard-sampler".into())
            .spawn(move || run(engine, delay, command_rx, outcome_tx))?;

        Ok(Self { commands, outcomes, handle })
    }

    /// Ask for one cycle. Returns immediately; the outcome lands in the mailbox.
    pub fn request_sample(&self) -> Result<(), WorkerError> {
        self.commands.send(Command::Sample).map_err(|_| WorkerError::Stopped)
    }

    /// A new receiver on the mailbox
    pub fn subscribe(&self) -> Mailbox<T::Error> {
        self.outcomes.clone()
    }

    /// Newest outcome, if any cycle has completed
    pub fn latest(&self) -> Option<CycleOutcome<T::Error>> {
        self.outcomes.borrow().clone()
    }

    /// Stop the thread after pending requests and take the engine back.
    pub fn shutdown(self) -> Result<AirQualityEngine<T>, WorkerError> {
        // A send error means the thread already exited; join tells us how
        let _ = self.commands.send(Command::Shutdown);
        self.handle.join().map_err(|_| WorkerError::Panicked)
    }
}

fn run<T, D>(
    mut engine: AirQualityEngine<T>,
    mut delay: D,
    mut commands: mpsc::UnboundedReceiver<Command>,
    outcomes: watch::Sender<Option<CycleOutcome<T::Error>>>,
) -> AirQualityEngine<T>
where
    T: RegisterTransport,
    D: DelayNs,
{
    let boot = Instant::now();
    log::debug!("sampler thread started");

    while let Some(command) = commands.blocking_recv() {
        match command {
            Command::Sample => {
                let outcome = engine.sample(boot.elapsed(), &mut delay);
                if let Err(e) = &outcome {
                    log::warn!("measurement cycle failed: {}", e);
                }
                outcomes.send_replace(Some(outcome));
            }
            Command::Shutdown => break,
        }
    }

    log::debug!("sampler thread stopping");
    engine
}

/// Publish every successful cycle seen in `mailbox` until the worker stops.
///
/// Failed cycles are skipped; publishing errors are logged and do not stop
/// forwarding. Returns the number of records published.
pub async fn forward<E, S>(mut mailbox: Mailbox<E>, sink: &mut S) -> u64
where
    E: core::fmt::Debug,
    S: TelemetrySink,
    S::Error: core::fmt::Display,
{
    let mut published = 0;

    while mailbox.changed().await.is_ok() {
        let record = match &*mailbox.borrow_and_update() {
            Some(Ok(sample)) => TelemetryRecord::from(sample).rounded(),
            _ => continue,
        };

        match sink.publish(&record) {
            Ok(()) => published += 1,
            Err(e) => log::warn!("telemetry publish failed: {}", e),
        }
    }

    published
}
