//! One dashboard session, from connecting to the final report.
//!
//! The caller owns the terminal: it is set up before [`run`] is called and
//! restored after it returns, whatever the outcome. Streams are connected
//! only once the terminal is ready, so a failed terminal setup never leaves
//! open connections behind, and every connection that was opened goes
//! through the coordinator's close handshake.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;

use anyhow::Result;
use crossterm::event::Event;
use futures_util::Stream;
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::App;
use crate::config::Settings;
use crate::data::StreamKind;
use crate::render::RenderLoop;
use crate::shutdown::{spawn_signal_forwarder, Coordinator, ShutdownReport};
use crate::state;
use crate::transport::Connection;

/// Capacity of the shutdown request channel.
const REQUEST_CAPACITY: usize = 4;

/// Connect, run the dashboard until the first shutdown trigger, and shut
/// down.
///
/// `connect` opens the streams, `events` feeds terminal input to the render
/// loop, and `interrupt` resolves on an OS interrupt. Returns the shutdown
/// report, or the render loop's error if drawing failed.
pub async fn run<B, C, F, E, I>(
    settings: &Settings,
    terminal: Terminal<B>,
    app: App,
    connect: F,
    events: E,
    interrupt: I,
) -> Result<ShutdownReport>
where
    B: Backend + Send + 'static,
    C: Connection,
    F: Future<Output = Result<BTreeMap<StreamKind, C>>>,
    E: Stream<Item = io::Result<Event>> + Unpin + Send + 'static,
    I: Future<Output = io::Result<()>> + Send + 'static,
{
    let mut connections = connect.await?;

    let (display, publishers) = state::channel();
    let mut coordinator = Coordinator::new(settings.close_timeout);
    for publisher in publishers {
        if let Some(conn) = connections.remove(&publisher.kind()) {
            coordinator.spawn_worker(conn, publisher, settings.ack());
        }
    }

    let (requests_tx, mut requests) = mpsc::channel(REQUEST_CAPACITY);
    let interrupt = spawn_signal_forwarder(interrupt, requests_tx.clone());

    let render_loop = RenderLoop::new(
        terminal,
        app,
        display,
        settings.refresh,
        coordinator.render_signal(),
        requests_tx,
    );
    let render_task = tokio::spawn(render_loop.run(events));

    let reason = coordinator.wait_for_trigger(&mut requests).await;
    let report = coordinator.shutdown(reason).await;
    interrupt.abort();

    info!(
        reason = %report.reason,
        closed = ?report.closed,
        abandoned = ?report.abandoned,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "dashboard stopped"
    );

    match render_task.await {
        Ok(Ok(_terminal)) => Ok(report),
        Ok(Err(err)) => Err(err),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::shutdown::ShutdownReason;
    use crate::transport::{ChannelConnection, ChannelPeer};
    use crate::ui::Theme;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures_util::stream;
    use ratatui::backend::TestBackend;
    use tokio_tungstenite::tungstenite::Message;

    fn settings() -> Settings {
        Settings {
            refresh: Duration::from_millis(100),
            close_timeout: Duration::from_millis(200),
            ..Settings::default()
        }
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 30)).unwrap()
    }

    fn channels() -> (BTreeMap<StreamKind, ChannelConnection>, Vec<ChannelPeer>) {
        let mut connections = BTreeMap::new();
        let mut peers = Vec::new();
        for kind in StreamKind::ALL {
            let (conn, peer) = ChannelConnection::pair();
            connections.insert(kind, conn);
            peers.push(peer);
        }
        (connections, peers)
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_key_closes_every_stream() {
        let (connections, mut peers) = channels();
        let quit = Ok(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));

        let report = run(
            &settings(),
            terminal(),
            App::new(Theme::dark()),
            async { anyhow::Ok(connections) },
            stream::iter(vec![quit]),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(report.reason, ShutdownReason::UserQuit);
        assert_eq!(report.close_requested, StreamKind::ALL.to_vec());
        for peer in &mut peers {
            assert!(matches!(peer.try_recv(), Some(Message::Close(_))));
            assert_eq!(peer.try_recv(), None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_shuts_down() {
        let (connections, _peers) = channels();

        let report = run(
            &settings(),
            terminal(),
            App::new(Theme::dark()),
            async { anyhow::Ok(connections) },
            stream::pending(),
            async { Ok::<(), io::Error>(()) },
        )
        .await
        .unwrap();

        assert_eq!(report.reason, ShutdownReason::Interrupt);
        assert_eq!(report.abandoned, StreamKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        let result = run(
            &settings(),
            terminal(),
            App::new(Theme::dark()),
            async {
                Err::<BTreeMap<StreamKind, ChannelConnection>, _>(anyhow::anyhow!(
                    "connection refused"
                ))
            },
            stream::pending(),
            std::future::pending(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
