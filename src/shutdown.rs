//! Shutdown coordination.
//!
//! The [`Coordinator`] owns every stream worker. It waits for the first
//! trigger (a stream ending on its own, an OS interrupt, or the quit key)
//! and then runs one bounded close handshake:
//!
//! 1. broadcast a close request; every worker still running sends exactly
//!    one normal-closure frame,
//! 2. wait for all workers concurrently, against a single deadline,
//! 3. abort whatever has not finished,
//! 4. tell the render loop to stop and release the terminal.
//!
//! The handshake is best-effort: an unresponsive peer costs at most the
//! close timeout.

use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use futures_util::future::{join_all, select_all};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::data::duration::format_duration;
use crate::data::StreamKind;
use crate::state::Publisher;
use crate::stream::{self, LinkState, WorkerHandle};
use crate::transport::Connection;

/// Why the dashboard is shutting down. All reasons are graceful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A stream ended without being asked to.
    StreamEnded(StreamKind),
    /// The process received an interrupt signal.
    Interrupt,
    /// The user pressed the quit key.
    UserQuit,
    /// The dashboard could not be drawn.
    RenderFailed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::StreamEnded(kind) => write!(f, "{} stream ended", kind),
            ShutdownReason::Interrupt => f.write_str("interrupt"),
            ShutdownReason::UserQuit => f.write_str("user quit"),
            ShutdownReason::RenderFailed => f.write_str("render failure"),
        }
    }
}

/// Outcome of a shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub reason: ShutdownReason,
    /// Streams that were still running and were sent a close request.
    pub close_requested: Vec<StreamKind>,
    /// Streams that reached `Closed` before the deadline.
    pub closed: Vec<StreamKind>,
    /// Streams that were aborted when the deadline passed.
    pub abandoned: Vec<StreamKind>,
    /// Time spent in the handshake.
    pub elapsed: Duration,
}

/// Owns the stream workers and drives shutdown.
#[derive(Debug)]
pub struct Coordinator {
    workers: Vec<WorkerHandle>,
    close_tx: watch::Sender<bool>,
    render_stop: watch::Sender<bool>,
    close_timeout: Duration,
}

impl Coordinator {
    /// Create a coordinator with the given close-handshake grace period.
    pub fn new(close_timeout: Duration) -> Self {
        let (close_tx, _) = watch::channel(false);
        let (render_stop, _) = watch::channel(false);
        Self {
            workers: Vec::new(),
            close_tx,
            render_stop,
            close_timeout,
        }
    }

    /// Spawn the worker for `publisher`'s stream over `conn`.
    pub fn spawn_worker<C: Connection>(
        &mut self,
        conn: C,
        publisher: Publisher,
        ack: Option<String>,
    ) {
        let handle = stream::spawn(conn, publisher, self.close_tx.subscribe(), ack);
        self.workers.push(handle);
    }

    /// Signal that flips to `true` when the render loop must stop.
    pub fn render_signal(&self) -> watch::Receiver<bool> {
        self.render_stop.subscribe()
    }

    /// Lifecycle state of every worker, in spawn order.
    pub fn states(&self) -> Vec<(StreamKind, LinkState)> {
        self.workers.iter().map(|w| (w.kind(), w.state())).collect()
    }

    /// Wait for the first shutdown trigger.
    ///
    /// Resolves when any worker reaches `Closed` or a reason arrives on
    /// `requests` (interrupt listener, render loop).
    pub async fn wait_for_trigger(
        &self,
        requests: &mut mpsc::Receiver<ShutdownReason>,
    ) -> ShutdownReason {
        let stream_ended = async {
            if self.workers.is_empty() {
                return std::future::pending::<StreamKind>().await;
            }
            let (kind, _, _) = select_all(self.workers.iter().map(|w| Box::pin(w.ended()))).await;
            kind
        };

        tokio::select! {
            kind = stream_ended => ShutdownReason::StreamEnded(kind),
            Some(reason) = requests.recv() => reason,
        }
    }

    /// Run the bounded close handshake and stop the render loop.
    pub async fn shutdown(self, reason: ShutdownReason) -> ShutdownReport {
        info!(%reason, "shutting down");
        let started = Instant::now();

        let close_requested: Vec<StreamKind> = self
            .workers
            .iter()
            .filter(|w| w.state() == LinkState::Running)
            .map(|w| w.kind())
            .collect();
        self.close_tx.send_replace(true);

        let all_closed = join_all(self.workers.iter().map(|w| w.closed()));
        if tokio::time::timeout(self.close_timeout, all_closed).await.is_err() {
            warn!(
                timeout = %format_duration(self.close_timeout),
                "close handshake timed out"
            );
        }

        let mut closed = Vec::new();
        let mut abandoned = Vec::new();
        for worker in &self.workers {
            if worker.state() == LinkState::Closed {
                closed.push(worker.kind());
            } else {
                abandoned.push(worker.kind());
            }
            worker.abort();
        }
        if !abandoned.is_empty() {
            warn!(?abandoned, "streams did not confirm close");
        }

        self.render_stop.send_replace(true);

        ShutdownReport {
            reason,
            close_requested,
            closed,
            abandoned,
            elapsed: started.elapsed(),
        }
    }
}

/// Send one [`ShutdownReason::Interrupt`] when `signal` fires, then exit.
///
/// `signal` is normally [`tokio::signal::ctrl_c`]. If the signal cannot be
/// listened for, nothing is sent.
pub fn spawn_signal_forwarder<F>(
    signal: F,
    requests: mpsc::Sender<ShutdownReason>,
) -> JoinHandle<()>
where
    F: Future<Output = io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                info!("Bye bye!");
                let _ = requests.send(ShutdownReason::Interrupt).await;
            }
            Err(err) => warn!(error = %err, "unable to listen for interrupt signal"),
        }
    })
}
