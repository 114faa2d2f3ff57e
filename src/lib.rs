//! # clf-dashboard
//!
//! A terminal dashboard for a web-traffic analytics server.
//!
//! The server publishes three WebSocket streams: per-section hit scores,
//! traffic alerts and a hit-rate time series. The dashboard subscribes to
//! all three, keeps the latest batch of each, and redraws on a fixed tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  /score ──▶ worker ─┐                                           │
//! │  /alert ──▶ worker ─┼─ publish ──▶ state (watch) ──▶ render ──▶ │ Terminal
//! │  /hits  ──▶ worker ─┘                                  │        │
//! │                 ▲                                      │ quit   │
//! │                 │ close                                ▼        │
//! │           shutdown::Coordinator ◀──────── Ctrl-C / stream end   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Wire records, decoding and display projections
//! - **[`transport`]**: WebSocket connections and the [`Connection`] seam
//! - **[`stream`]**: One ingestion worker per stream
//! - **[`state`]**: Single-writer display slots shared with the renderer
//! - **[`shutdown`]**: Shutdown triggers and the bounded close handshake
//! - **[`session`]**: Wires everything together for one run of the dashboard
//! - **[`render`]**, **[`app`]**, **[`events`]**, **[`ui`]**: The dashboard itself
//! - **[`config`]**, **[`logging`]**: Settings and log setup
//!
//! ## Usage
//!
//! ```bash
//! # Connect to a server on localhost:8000
//! clf-dashboard
//!
//! # Another server, acknowledging every batch, logs to a file
//! clf-dashboard --addr analytics.internal:8000 --ack --log-file /tmp/dashboard.log
//! ```
//!
//! ### Driving a worker without a network
//!
//! ```
//! use clf_dashboard::{state, ChannelConnection, Coordinator, ShutdownReason};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let (display, publishers) = state::channel();
//! let mut coordinator = Coordinator::new(Duration::from_millis(100));
//!
//! let (conn, peer) = ChannelConnection::pair();
//! coordinator.spawn_worker(conn, publishers.scores, None);
//! peer.send_text(r#"[{"section":"/home","hits":12}]"#);
//!
//! let report = coordinator.shutdown(ShutdownReason::UserQuit).await;
//! assert_eq!(report.reason, ShutdownReason::UserQuit);
//! # let _ = display;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod render;
pub mod session;
pub mod shutdown;
pub mod state;
pub mod stream;
pub mod transport;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Overrides, Settings};
pub use data::{AlertRecord, Batch, ScoreRecord, StreamKind};
pub use error::{ConfigError, DecodeError, StreamError};
pub use shutdown::{Coordinator, ShutdownReason, ShutdownReport};
pub use state::{DisplayState, Publisher, Publishers};
pub use stream::LinkState;
pub use transport::{ChannelConnection, ChannelPeer, Connection};
