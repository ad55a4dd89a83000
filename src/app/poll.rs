// ChiloDisco - app/poll.rs
//
// Poll loop: fetches snapshots on a fixed interval on a background thread
// and streams them to the UI.
//
// Architecture:
//   - `PollManager` lives on the UI thread; `run_poller` runs on a background
//     thread that owns the snapshot source.
//   - Fetches happen one after another on that single thread, so two
//     requests never overlap and results always arrive in order.
//   - Results travel as `PollProgress` over an mpsc channel; the UI drains it
//     each frame (bounded per frame).
//   - Commands (refresh now, new interval) travel over a second channel. The
//     thread waits on that channel with a timeout equal to the time left in
//     the current interval, so commands and stop requests wake it at once.
//   - An `Arc<AtomicBool>` cancel flag plus dropping the command sender stops
//     the thread. A fetch in flight at that moment finishes on its own and
//     its result is discarded.
//   - Each `start` bumps a generation number carried by every message;
//     messages from an older generation are never handed to the UI.
//
// Failures never stop the loop: they are reported as `Failed` and the next
// tick simply tries again.

use crate::app::client::SnapshotSource;
use crate::core::model::LogSnapshot;
use crate::util::error::FetchError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

// =============================================================================
// Messages
// =============================================================================

/// Messages from the poll thread to the UI.
#[derive(Debug)]
pub enum PollProgress {
    /// The thread is running and about to issue its first fetch.
    Started { generation: u64, source: String },
    /// A snapshot was fetched and decoded.
    Snapshot {
        generation: u64,
        snapshot: LogSnapshot,
    },
    /// A fetch failed; prior state must be kept.
    Failed { generation: u64, error: FetchError },
    /// The thread observed the cancel flag and exited.
    Stopped { generation: u64 },
}

impl PollProgress {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Started { generation, .. }
            | Self::Snapshot { generation, .. }
            | Self::Failed { generation, .. }
            | Self::Stopped { generation } => *generation,
        }
    }
}

/// Commands from the UI to the poll thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollCommand {
    /// Fetch now, then restart the interval.
    Refresh,
    /// Use a new interval, restarting the timer from now.
    SetInterval(Duration),
}

// =============================================================================
// PollManager
// =============================================================================

/// Owns the background poll thread.
pub struct PollManager {
    progress_rx: Option<mpsc::Receiver<PollProgress>>,
    command_tx: Option<mpsc::Sender<PollCommand>>,
    cancel_flag: Option<Arc<AtomicBool>>,
    generation: u64,
    interval: Duration,
}

impl PollManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            command_tx: None,
            cancel_flag: None,
            generation: 0,
            interval: Duration::ZERO,
        }
    }

    /// Start polling `source` every `interval`, beginning with an immediate
    /// fetch. A running poller is stopped first.
    pub fn start(&mut self, source: Box<dyn SnapshotSource>, interval: Duration) {
        self.stop();

        self.generation += 1;
        self.interval = interval;

        let (progress_tx, progress_rx) = mpsc::channel();
        let (command_tx, command_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(progress_rx);
        self.command_tx = Some(command_tx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        let generation = self.generation;
        let spawned = std::thread::Builder::new()
            .name(format!("poller-{generation}"))
            .spawn(move || {
                run_poller(source, interval, generation, progress_tx, command_rx, cancel);
            });

        match spawned {
            Ok(_) => tracing::info!(
                generation,
                interval_ms = interval.as_millis() as u64,
                "Polling started"
            ),
            Err(e) => {
                tracing::error!(error = %e, "Cannot spawn poll thread");
                self.stop();
            }
        }
    }

    /// Stop the poll thread. Messages already queued are dropped with the
    /// channel, so nothing from this generation reaches the UI afterwards.
    pub fn stop(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
            tracing::info!(generation = self.generation, "Polling stopped");
        }
        self.command_tx = None;
        self.progress_rx = None;
    }

    pub fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Current generation number (0 before the first start).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval; the timer restarts from now.
    pub fn set_interval(&mut self, interval: Duration) {
        if interval == self.interval {
            return;
        }
        self.interval = interval;
        self.send(PollCommand::SetInterval(interval));
    }

    /// Fetch immediately instead of waiting for the next tick.
    pub fn request_refresh(&self) {
        self.send(PollCommand::Refresh);
    }

    fn send(&self, command: PollCommand) {
        if let Some(tx) = &self.command_tx {
            if tx.send(command).is_err() {
                tracing::debug!(?command, "Poll thread gone, command dropped");
            }
        }
    }

    /// Drain up to `max` pending messages of the current generation.
    pub fn poll_progress(&self, max: usize) -> Vec<PollProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < max {
                match rx.try_recv() {
                    Ok(msg) if msg.generation() == self.generation => messages.push(msg),
                    Ok(stale) => {
                        tracing::debug!(generation = stale.generation(), "Discarding stale poll message")
                    }
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for PollManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollManager {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Background poll loop
// =============================================================================

fn run_poller(
    mut source: Box<dyn SnapshotSource>,
    mut interval: Duration,
    generation: u64,
    tx: mpsc::Sender<PollProgress>,
    commands: mpsc::Receiver<PollCommand>,
    cancel: Arc<AtomicBool>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // UI side dropped the receiver.
                return;
            }
        };
    }

    send!(PollProgress::Started {
        generation,
        source: source.describe(),
    });

    loop {
        if cancel.load(Ordering::SeqCst) {
            send!(PollProgress::Stopped { generation });
            return;
        }

        let started = Instant::now();
        let result = source.fetch();

        if cancel.load(Ordering::SeqCst) {
            tracing::debug!(generation, "Poller cancelled during fetch, result dropped");
            send!(PollProgress::Stopped { generation });
            return;
        }

        match result {
            Ok(snapshot) => {
                tracing::debug!(
                    generation,
                    keys = snapshot.entries.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Snapshot fetched"
                );
                send!(PollProgress::Snapshot {
                    generation,
                    snapshot
                });
            }
            Err(error) => {
                tracing::warn!(generation, error = %error, "Snapshot fetch failed");
                send!(PollProgress::Failed { generation, error });
            }
        }

        // Wait for the next tick, a refresh, or a stop.
        let mut deadline = Instant::now() + interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match commands.recv_timeout(remaining) {
                Ok(PollCommand::Refresh) => {
                    // One fetch answers every refresh queued behind this one.
                    while let Ok(queued) = commands.try_recv() {
                        if let PollCommand::SetInterval(new_interval) = queued {
                            interval = new_interval;
                        }
                    }
                    break;
                }
                Ok(PollCommand::SetInterval(new_interval)) => {
                    tracing::debug!(
                        generation,
                        interval_ms = new_interval.as_millis() as u64,
                        "Poll interval changed"
                    );
                    interval = new_interval;
                    deadline = Instant::now() + interval;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    send!(PollProgress::Stopped { generation });
                    return;
                }
            }
        }
    }
}
