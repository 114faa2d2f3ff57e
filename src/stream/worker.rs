use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use super::LinkState;
use crate::data::{decode, StreamKind};
use crate::error::StreamError;
use crate::state::{Published, Publisher};
use crate::transport::Connection;

/// Receives one stream and keeps its display slot current.
///
/// The worker is the only writer of its slot and of its [`LinkState`].
#[derive(Debug)]
pub struct StreamWorker<C> {
    kind: StreamKind,
    conn: C,
    publisher: Publisher,
    phase: LinkState,
    state: watch::Sender<LinkState>,
    shutdown: watch::Receiver<bool>,
    ack: Option<String>,
}

impl<C: Connection> StreamWorker<C> {
    /// Create a worker in the `Running` state.
    ///
    /// `shutdown` flips to `true` when the worker should start the close
    /// handshake. `ack`, when set, is sent back after every decoded batch.
    pub fn new(
        conn: C,
        publisher: Publisher,
        shutdown: watch::Receiver<bool>,
        ack: Option<String>,
    ) -> (Self, watch::Receiver<LinkState>) {
        let (state, state_rx) = watch::channel(LinkState::Running);
        let worker = Self {
            kind: publisher.kind(),
            conn,
            publisher,
            phase: LinkState::Running,
            state,
            shutdown,
            ack,
        };
        (worker, state_rx)
    }

    /// Run until the stream ends or the close handshake completes.
    ///
    /// Returns `Ok` when the stream closed after a requested shutdown and
    /// [`StreamError::Ended`] when it ended on its own. The connection is
    /// released when this returns.
    pub async fn run(mut self) -> Result<(), StreamError> {
        debug!(kind = %self.kind, "stream worker started");

        let result = self.drive().await;
        match &result {
            Ok(()) => info!(kind = %self.kind, "stream closed"),
            Err(err) => warn!(kind = %self.kind, error = %err, "stream ended"),
        }

        self.set_phase(LinkState::Closed);
        result
    }

    async fn drive(&mut self) -> Result<(), StreamError> {
        loop {
            let closing = self.phase == LinkState::ClosePending;
            if !closing && *self.shutdown.borrow_and_update() {
                self.begin_close().await;
                continue;
            }

            tokio::select! {
                changed = self.shutdown.changed(), if !closing => {
                    // Nobody left to ask for a close; start it ourselves.
                    if changed.is_err() {
                        self.begin_close().await;
                    }
                }
                frame = self.conn.next() => {
                    if let Some(done) = self.on_frame(frame).await {
                        return done;
                    }
                }
            }
        }
    }

    /// Handle one receive result. `Some` ends the worker.
    async fn on_frame(
        &mut self,
        frame: Option<Result<Message, WsError>>,
    ) -> Option<Result<(), StreamError>> {
        match frame {
            Some(Ok(Message::Text(text))) => {
                self.on_payload(text.as_bytes()).await;
                None
            }
            Some(Ok(Message::Binary(bytes))) => {
                self.on_payload(&bytes).await;
                None
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = match frame {
                    Some(frame) => format!("peer closed ({:?} {})", frame.code, frame.reason),
                    None => "peer closed".to_string(),
                };
                Some(self.finish(reason))
            }
            // Ping/pong are answered by the transport.
            Some(Ok(_)) => None,
            Some(Err(err)) => Some(self.finish(format!("receive failed: {}", err))),
            None => Some(self.finish("connection closed".to_string())),
        }
    }

    async fn on_payload(&mut self, payload: &[u8]) {
        // Batches arriving after the close frame went out are not shown.
        if self.phase != LinkState::Running {
            return;
        }

        let batch = match decode(self.kind, payload) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "dropping batch");
                return;
            }
        };

        let records = batch.len();
        if self.publisher.publish(batch) == Published::Unchanged {
            debug!(kind = %self.kind, records, "batch left display unchanged");
        }

        if let Some(ack) = &self.ack {
            if let Err(source) = self.conn.send(Message::Text(ack.clone())).await {
                let err = StreamError::AckSend {
                    kind: self.kind,
                    source,
                };
                debug!(error = %err, "acknowledgment not delivered");
            }
        }
    }

    /// Send the normal-closure frame once and wait for the peer.
    async fn begin_close(&mut self) {
        if self.phase != LinkState::Running {
            return;
        }
        self.set_phase(LinkState::ClosePending);

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };
        match self.conn.send(Message::Close(Some(frame))).await {
            Ok(()) => debug!(kind = %self.kind, "close frame sent"),
            Err(source) => {
                let err = StreamError::CloseSend {
                    kind: self.kind,
                    source,
                };
                warn!(error = %err, "close request not delivered");
            }
        }
    }

    fn finish(&self, reason: String) -> Result<(), StreamError> {
        if self.phase == LinkState::ClosePending {
            debug!(kind = %self.kind, %reason, "close handshake complete");
            Ok(())
        } else {
            Err(StreamError::Ended {
                kind: self.kind,
                reason,
            })
        }
    }

    fn set_phase(&mut self, phase: LinkState) {
        if phase > self.phase {
            self.phase = phase;
            self.state.send_replace(phase);
        }
    }
}
