//! Channel-based connection.
//!
//! An in-memory stand-in for a websocket. The dashboard side is a
//! [`ChannelConnection`]; whoever produces the data holds the matching
//! [`ChannelPeer`] and plays the server.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Sink, Stream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Dashboard end of an in-memory connection.
///
/// The stream ends when the peer is dropped. Writes fail with
/// [`WsError::AlreadyClosed`] once the peer stops reading.
///
/// # Example
///
/// ```
/// use clf_dashboard::transport::ChannelConnection;
///
/// let (conn, peer) = ChannelConnection::pair();
/// peer.send_text(r#"[{"section":"/home","hits":12}]"#);
/// ```
#[derive(Debug)]
pub struct ChannelConnection {
    inbound: mpsc::UnboundedReceiver<Result<Message, WsError>>,
    outbound: mpsc::UnboundedSender<Message>,
}

/// Server end of an in-memory connection.
#[derive(Debug)]
pub struct ChannelPeer {
    inbound: mpsc::UnboundedSender<Result<Message, WsError>>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

impl ChannelConnection {
    /// Create a connected (connection, peer) pair.
    pub fn pair() -> (ChannelConnection, ChannelPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let conn = ChannelConnection {
            inbound: in_rx,
            outbound: out_tx,
        };
        let peer = ChannelPeer {
            inbound: in_tx,
            outbound: out_rx,
        };
        (conn, peer)
    }
}

impl ChannelPeer {
    /// Deliver a frame to the dashboard. Returns false if the connection is gone.
    pub fn send(&self, message: Message) -> bool {
        self.inbound.send(Ok(message)).is_ok()
    }

    /// Deliver a text frame to the dashboard.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(Message::Text(text.into()))
    }

    /// Make the dashboard's next receive fail with `error`.
    pub fn fail(&self, error: WsError) -> bool {
        self.inbound.send(Err(error)).is_ok()
    }

    /// Wait for the next frame written by the dashboard.
    pub async fn recv(&mut self) -> Option<Message> {
        self.outbound.recv().await
    }

    /// Take the next frame written by the dashboard, if one is queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.outbound.try_recv().ok()
    }

    /// Stop reading what the dashboard writes; its sends fail from now on.
    pub fn stop_reading(&mut self) {
        self.outbound.close();
    }
}

impl Stream for ChannelConnection {
    type Item = Result<Message, WsError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inbound.poll_recv(cx)
    }
}

impl Sink<Message> for ChannelConnection {
    type Error = WsError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.outbound.is_closed() {
            Poll::Ready(Err(WsError::AlreadyClosed))
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        self.outbound.send(item).map_err(|_| WsError::AlreadyClosed)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (mut conn, mut peer) = ChannelConnection::pair();

        assert!(peer.send_text("hello"));
        assert_eq!(conn.next().await.unwrap().unwrap(), Message::Text("hello".to_string()));

        conn.send(Message::Text("ack".to_string())).await.unwrap();
        assert_eq!(peer.recv().await, Some(Message::Text("ack".to_string())));
    }

    #[tokio::test]
    async fn test_dropped_peer_ends_stream() {
        let (mut conn, peer) = ChannelConnection::pair();
        drop(peer);
        assert!(conn.next().await.is_none());
        assert!(conn.send(Message::Text("late".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_reading_fails_sends() {
        let (mut conn, mut peer) = ChannelConnection::pair();
        peer.stop_reading();
        let err = conn.send(Message::Text("ack".to_string())).await.unwrap_err();
        assert!(matches!(err, WsError::AlreadyClosed));
    }
}
