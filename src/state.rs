//! Shared display state.
//!
//! Each stream kind has one `watch` slot holding the projection of its most
//! recent batch. The sending half ([`Publisher`]) is moved into exactly one
//! stream worker, so every slot has a single writer. The render loop reads
//! through [`DisplayState`]. Publishing swaps the whole value, so a reader
//! sees either the previous projection or the new one, never a mix.

use tokio::sync::watch;
use tracing::warn;

use crate::data::{AlertView, Batch, HitRateView, ScoreView, StreamKind};

/// Read side of the shared display state.
#[derive(Debug, Clone)]
pub struct DisplayState {
    scores: watch::Receiver<Option<ScoreView>>,
    alerts: watch::Receiver<Option<AlertView>>,
    hit_rate: watch::Receiver<Option<HitRateView>>,
}

/// A point-in-time copy of every slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySnapshot {
    pub scores: Option<ScoreView>,
    pub alerts: Option<AlertView>,
    pub hit_rate: Option<HitRateView>,
}

impl DisplayState {
    pub fn scores(&self) -> Option<ScoreView> {
        self.scores.borrow().clone()
    }

    pub fn alerts(&self) -> Option<AlertView> {
        self.alerts.borrow().clone()
    }

    pub fn hit_rate(&self) -> Option<HitRateView> {
        self.hit_rate.borrow().clone()
    }

    /// Copy the latest projection of every stream.
    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            scores: self.scores(),
            alerts: self.alerts(),
            hit_rate: self.hit_rate(),
        }
    }
}

/// What a publish did to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// The slot now holds the projection of the new batch.
    Replaced,
    /// The slot kept its previous value.
    Unchanged,
}

/// Write side of one display slot.
#[derive(Debug)]
pub enum Publisher {
    Scores(watch::Sender<Option<ScoreView>>),
    Alerts(watch::Sender<Option<AlertView>>),
    HitRate(watch::Sender<Option<HitRateView>>),
}

impl Publisher {
    /// The stream kind whose slot this publisher owns.
    pub fn kind(&self) -> StreamKind {
        match self {
            Publisher::Scores(_) => StreamKind::Scores,
            Publisher::Alerts(_) => StreamKind::Alerts,
            Publisher::HitRate(_) => StreamKind::HitRate,
        }
    }

    /// Project `batch` and store it in this publisher's slot.
    ///
    /// Empty alert batches leave the slot untouched. Score and hit-rate
    /// batches always replace it, even when empty.
    pub fn publish(&self, batch: Batch) -> Published {
        match (self, batch) {
            (Publisher::Scores(tx), Batch::Scores(records)) => {
                tx.send_replace(Some(ScoreView::from_records(&records)));
                Published::Replaced
            }
            (Publisher::Alerts(tx), Batch::Alerts(records)) => {
                match AlertView::from_records(&records) {
                    Some(view) => {
                        tx.send_replace(Some(view));
                        Published::Replaced
                    }
                    None => Published::Unchanged,
                }
            }
            (Publisher::HitRate(tx), Batch::HitRate(samples)) => {
                tx.send_replace(Some(HitRateView::new(samples)));
                Published::Replaced
            }
            (publisher, batch) => {
                warn!(
                    expected = %publisher.kind(),
                    got = %batch.kind(),
                    "batch routed to the wrong display slot"
                );
                Published::Unchanged
            }
        }
    }
}

/// Publishers for every stream kind, handed out one per worker.
#[derive(Debug)]
pub struct Publishers {
    pub scores: Publisher,
    pub alerts: Publisher,
    pub hit_rate: Publisher,
}

impl IntoIterator for Publishers {
    type Item = Publisher;
    type IntoIter = std::array::IntoIter<Publisher, 3>;

    /// Yields publishers in [`StreamKind::ALL`] order.
    fn into_iter(self) -> Self::IntoIter {
        [self.scores, self.alerts, self.hit_rate].into_iter()
    }
}

/// Create the display slots, all starting with no data.
pub fn channel() -> (DisplayState, Publishers) {
    let (scores_tx, scores) = watch::channel(None);
    let (alerts_tx, alerts) = watch::channel(None);
    let (hit_rate_tx, hit_rate) = watch::channel(None);

    let state = DisplayState {
        scores,
        alerts,
        hit_rate,
    };
    let publishers = Publishers {
        scores: Publisher::Scores(scores_tx),
        alerts: Publisher::Alerts(alerts_tx),
        hit_rate: Publisher::HitRate(hit_rate_tx),
    };
    (state, publishers)
}
