//! End-to-end lifecycle over in-memory connections: three workers, the
//! shared display state and the shutdown coordinator.

use std::time::Duration;

use clf_dashboard::{
    state, ChannelConnection, ChannelPeer, Coordinator, DisplayState, LinkState, ShutdownReason,
    StreamKind,
};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

const ACK: &str = "ack";

struct Harness {
    display: DisplayState,
    coordinator: Coordinator,
    scores: ChannelPeer,
    alerts: ChannelPeer,
    hits: ChannelPeer,
}

fn start(close_timeout: Duration) -> Harness {
    let (display, publishers) = state::channel();
    let mut coordinator = Coordinator::new(close_timeout);
    let mut peers = Vec::new();
    for publisher in publishers {
        let (conn, peer) = ChannelConnection::pair();
        coordinator.spawn_worker(conn, publisher, Some(ACK.to_string()));
        peers.push(peer);
    }
    let hits = peers.pop().unwrap();
    let alerts = peers.pop().unwrap();
    let scores = peers.pop().unwrap();
    Harness {
        display,
        coordinator,
        scores,
        alerts,
        hits,
    }
}

/// Send a batch and wait until the worker has acknowledged it.
async fn deliver(peer: &mut ChannelPeer, payload: &str) {
    assert!(peer.send_text(payload));
    assert_eq!(peer.recv().await, Some(Message::Text(ACK.to_string())));
}

fn assert_single_normal_close(peer: &mut ChannelPeer) {
    match peer.try_recv() {
        Some(Message::Close(Some(frame))) => assert_eq!(frame.code, CloseCode::Normal),
        other => panic!("expected a normal close frame, got {:?}", other),
    }
    assert_eq!(peer.try_recv(), None);
}

#[tokio::test]
async fn test_batches_reach_display_state() {
    let mut h = start(Duration::from_secs(1));

    deliver(&mut h.scores, r#"[{"section":"/home","hits":12},{"section":"/api","hits":3}]"#).await;
    deliver(
        &mut h.alerts,
        r#"[{"observedAt":"2024-03-01T10:15:30Z","chargeCount":50,"limit":10}]"#,
    )
    .await;
    deliver(&mut h.hits, "[1.0, 4.5, 2.0]").await;

    let snapshot = h.display.snapshot();
    assert_eq!(snapshot.scores.unwrap().lines, vec!["[12] /home", "[3] /api"]);
    let alerts = snapshot.alerts.unwrap();
    assert_eq!(alerts.entries[0].line, "[2024-03-01 10:15:30 UTC] Overcharged");
    assert!(alerts.status.overcharged);
    assert_eq!(
        alerts.status.line,
        "High traffic generated an alert - hits = 50, triggered at 2024-03-01 10:15:30 UTC, limit 10"
    );
    assert_eq!(snapshot.hit_rate.unwrap().samples, vec![1.0, 4.5, 2.0]);

    // An empty alert batch leaves the previous alerts on screen
    deliver(&mut h.alerts, "[]").await;
    assert_eq!(h.display.alerts().unwrap().entries, alerts.entries);

    // A malformed scores batch is dropped; the worker keeps going
    assert!(h.scores.send_text("{not json"));
    deliver(&mut h.scores, r#"[{"section":"/blog","hits":7}]"#).await;
    assert_eq!(h.display.scores().unwrap().lines, vec!["[7] /blog"]);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_with_unresponsive_server() {
    let mut h = start(Duration::from_secs(1));
    let render = h.coordinator.render_signal();
    let (requests_tx, mut requests) = mpsc::channel(4);

    requests_tx.send(ShutdownReason::Interrupt).await.unwrap();
    let reason = h.coordinator.wait_for_trigger(&mut requests).await;
    assert_eq!(reason, ShutdownReason::Interrupt);

    let report = h.coordinator.shutdown(reason).await;
    assert_eq!(report.close_requested, StreamKind::ALL.to_vec());
    assert_eq!(report.abandoned, StreamKind::ALL.to_vec());
    assert!(report.elapsed < Duration::from_millis(1100));
    assert!(*render.borrow());

    for peer in [&mut h.scores, &mut h.alerts, &mut h.hits] {
        assert_single_normal_close(peer);
    }
}

#[tokio::test]
async fn test_server_closing_one_stream_shuts_everything_down() {
    let h = start(Duration::from_secs(5));
    let (_requests_tx, mut requests) = mpsc::channel(4);

    // The other two streams answer the close handshake
    for mut peer in [h.scores, h.hits] {
        tokio::spawn(async move {
            while let Some(message) = peer.recv().await {
                if let Message::Close(frame) = message {
                    peer.send(Message::Close(frame));
                    break;
                }
            }
        });
    }
    assert!(h.alerts.send(Message::Close(None)));

    let reason = h.coordinator.wait_for_trigger(&mut requests).await;
    assert_eq!(reason, ShutdownReason::StreamEnded(StreamKind::Alerts));
    assert_eq!(
        h.coordinator.states(),
        vec![
            (StreamKind::Scores, LinkState::Running),
            (StreamKind::Alerts, LinkState::Closed),
            (StreamKind::HitRate, LinkState::Running),
        ]
    );

    let report = h.coordinator.shutdown(reason).await;
    assert_eq!(report.close_requested, vec![StreamKind::Scores, StreamKind::HitRate]);
    assert_eq!(report.closed, StreamKind::ALL.to_vec());
    assert!(report.abandoned.is_empty());
}
