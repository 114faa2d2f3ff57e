//! Typed records carried by the three analytics streams.
//!
//! These types match the JSON batches pushed by the analytics server. Field
//! names are camelCase on the wire; the server's older Go-style names
//! (`Section`, `Hits`, `AlertTime`, ...) are accepted as aliases.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the logical feeds the dashboard subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    /// Most visited sections with their hit counts.
    Scores,
    /// Overcharge alerts.
    Alerts,
    /// Raw hit-rate samples for the chart.
    HitRate,
}

impl StreamKind {
    /// Every stream kind, in the order connections are opened.
    pub const ALL: [StreamKind; 3] = [StreamKind::Scores, StreamKind::Alerts, StreamKind::HitRate];

    /// Path suffix of the server endpoint for this stream.
    pub fn path(self) -> &'static str {
        match self {
            StreamKind::Scores => "/score",
            StreamKind::Alerts => "/alert",
            StreamKind::HitRate => "/hits",
        }
    }

    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Scores => "scores",
            StreamKind::Alerts => "alerts",
            StreamKind::HitRate => "hits",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hit count for one site section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(alias = "Section")]
    pub section: String,
    #[serde(alias = "Hits")]
    pub hits: u64,
}

/// A single overcharge observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// When the server evaluated the charge.
    #[serde(alias = "AlertTime", alias = "ObservedAt")]
    pub observed_at: DateTime<Utc>,
    /// Hits counted in the evaluation window.
    #[serde(alias = "ChargeCount")]
    pub charge_count: u64,
    /// Threshold above which traffic counts as overcharged.
    #[serde(alias = "Limit")]
    pub limit: u64,
}

impl AlertRecord {
    /// Whether the charge exceeded the limit.
    pub fn is_overcharged(&self) -> bool {
        self.charge_count > self.limit
    }
}

/// One decoded message: the full set of records for a stream kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Scores(Vec<ScoreRecord>),
    Alerts(Vec<AlertRecord>),
    HitRate(Vec<f64>),
}

impl Batch {
    /// The stream kind this batch belongs to.
    pub fn kind(&self) -> StreamKind {
        match self {
            Batch::Scores(_) => StreamKind::Scores,
            Batch::Alerts(_) => StreamKind::Alerts,
            Batch::HitRate(_) => StreamKind::HitRate,
        }
    }

    /// Number of records (or samples) in the batch.
    pub fn len(&self) -> usize {
        match self {
            Batch::Scores(records) => records.len(),
            Batch::Alerts(records) => records.len(),
            Batch::HitRate(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
