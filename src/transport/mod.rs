//! Connections to the analytics server.
//!
//! The dashboard core only needs a duplex message stream per feed: it reads
//! frames, may write an acknowledgment, and writes one close frame during
//! shutdown. Any type that is both a [`Stream`] of websocket messages and a
//! [`Sink`] for them qualifies as a [`Connection`]:
//!
//! - [`WsConnection`]: a live websocket opened with [`connect`]
//! - [`ChannelConnection`]: an in-memory pair, for bridging other sources and for tests

mod channel;

pub use channel::{ChannelConnection, ChannelPeer};

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use futures_util::{Sink, Stream};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::info;

use crate::config::Settings;
use crate::data::StreamKind;

/// A live websocket connection to one server endpoint.
pub type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A duplex message stream owned by one stream worker.
pub trait Connection:
    Stream<Item = Result<Message, WsError>>
    + Sink<Message, Error = WsError>
    + Unpin
    + Send
    + 'static
{
}

impl<T> Connection for T where
    T: Stream<Item = Result<Message, WsError>>
        + Sink<Message, Error = WsError>
        + Unpin
        + Send
        + 'static
{
}

/// Open the websocket for one stream kind.
pub async fn connect(settings: &Settings, kind: StreamKind) -> Result<WsConnection> {
    let url = settings.stream_url(kind);
    info!(%kind, %url, "connecting");

    let (conn, _response) = connect_async(url.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", url))?;
    Ok(conn)
}

/// Open every stream, in [`StreamKind::ALL`] order.
///
/// Fails on the first endpoint that cannot be reached; connections opened
/// before it are dropped.
pub async fn connect_all(settings: &Settings) -> Result<BTreeMap<StreamKind, WsConnection>> {
    let mut connections = BTreeMap::new();
    for kind in StreamKind::ALL {
        connections.insert(kind, connect(settings, kind).await?);
    }
    Ok(connections)
}
