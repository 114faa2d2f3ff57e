//! Stream ingestion workers.
//!
//! One worker per stream kind owns that stream's connection. It receives
//! frames, decodes them, and publishes the projection into the shared
//! display state. Each worker reports its lifecycle through a
//! [`LinkState`] watch channel that any number of observers can wait on.
//!
//! ```text
//!            shutdown requested
//!   Running ───────────────────▶ ClosePending
//!      │      (close frame sent)       │
//!      │ stream ended                  │ peer closed / stream ended
//!      ▼                               ▼
//!    Closed ◀──────────────────────────┘
//! ```

mod worker;

pub use worker::StreamWorker;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::data::StreamKind;
use crate::error::StreamError;
use crate::state::Publisher;
use crate::transport::Connection;

/// Lifecycle of one stream connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkState {
    /// Receiving and publishing batches.
    Running,
    /// Close frame sent; draining until the peer closes.
    ClosePending,
    /// Connection released. Terminal.
    Closed,
}

/// Handle to a spawned worker task.
#[derive(Debug)]
pub struct WorkerHandle {
    kind: StreamKind,
    state: watch::Receiver<LinkState>,
    task: JoinHandle<Result<(), StreamError>>,
}

impl WorkerHandle {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Current lifecycle state. A worker whose task is gone reads as closed.
    pub fn state(&self) -> LinkState {
        if self.state.has_changed().is_err() {
            return LinkState::Closed;
        }
        *self.state.borrow()
    }

    /// Resolve once the worker has reached [`LinkState::Closed`].
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        // Err means the worker dropped its sender, which only happens once it is done.
        let _ = state.wait_for(|s| *s == LinkState::Closed).await;
    }

    /// Like [`closed`](Self::closed), yielding the stream kind.
    pub async fn ended(&self) -> StreamKind {
        self.closed().await;
        self.kind
    }

    /// Stop the task without waiting for the handshake.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawn a worker for `publisher`'s stream kind on the current runtime.
pub fn spawn<C: Connection>(
    conn: C,
    publisher: Publisher,
    shutdown: watch::Receiver<bool>,
    ack: Option<String>,
) -> WorkerHandle {
    let kind = publisher.kind();
    let (worker, state) = StreamWorker::new(conn, publisher, shutdown, ack);
    let task = tokio::spawn(worker.run());
    WorkerHandle { kind, state, task }
}
