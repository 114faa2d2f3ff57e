//! Render-ready projections of the latest batch for each stream.
//!
//! Projections are pure functions of a batch. They are rebuilt from scratch
//! for every batch and replace the previous projection as a whole.

use super::records::{AlertRecord, ScoreRecord};

/// Timestamp format used in alert lines.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Ranked section lines, one per score record, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreView {
    pub lines: Vec<String>,
}

impl ScoreView {
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let lines = records.iter().map(|r| format!("[{}] {}", r.hits, r.section)).collect();
        Self { lines }
    }
}

/// One line of the alert list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntry {
    pub line: String,
    pub overcharged: bool,
}

impl AlertEntry {
    pub fn from_record(record: &AlertRecord) -> Self {
        let overcharged = record.is_overcharged();
        let tag = if overcharged { "Overcharged" } else { "Normal" };
        Self {
            line: format!("[{}] {}", record.observed_at.format(TIME_FORMAT), tag),
            overcharged,
        }
    }
}

/// The single-line alert summary shown under the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertStatus {
    pub line: String,
    pub overcharged: bool,
}

impl AlertStatus {
    pub fn from_record(record: &AlertRecord) -> Self {
        let overcharged = record.is_overcharged();
        let line = if overcharged {
            format!(
                "High traffic generated an alert - hits = {}, triggered at {}, limit {}",
                record.charge_count,
                record.observed_at.format(TIME_FORMAT),
                record.limit
            )
        } else {
            format!(
                "Normal traffic - hits = {}, limit {}",
                record.charge_count, record.limit
            )
        };
        Self { line, overcharged }
    }
}

/// Alert list plus status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertView {
    pub entries: Vec<AlertEntry>,
    pub status: AlertStatus,
}

impl AlertView {
    /// Project an alert batch.
    ///
    /// The status line comes from the first record only. Returns `None` for
    /// an empty batch so the caller keeps whatever it showed before.
    pub fn from_records(records: &[AlertRecord]) -> Option<Self> {
        let first = records.first()?;
        Some(Self {
            entries: records.iter().map(AlertEntry::from_record).collect(),
            status: AlertStatus::from_record(first),
        })
    }
}

/// The latest hit-rate window, used verbatim as the chart dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitRateView {
    pub samples: Vec<f64>,
}

impl HitRateView {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Chart points, indexed by sample position.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
    }

    /// Y-axis bounds covering every sample, never a zero-width range.
    pub fn bounds(&self) -> [f64; 2] {
        let mut iter = self.samples.iter().copied().filter(|v| v.is_finite());
        let Some(first) = iter.next() else {
            return [0.0, 1.0];
        };
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if max - min < f64::EPSILON {
            [min, min + 1.0]
        } else {
            [min, max]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn alert(charge_count: u64, limit: u64) -> AlertRecord {
        AlertRecord {
            observed_at: at("2024-03-01T10:15:30Z"),
            charge_count,
            limit,
        }
    }

    #[test]
    fn test_score_lines() {
        let records = vec![
            ScoreRecord {
                section: "/home".to_string(),
                hits: 12,
            },
            ScoreRecord {
                section: "/api".to_string(),
                hits: 3,
            },
        ];
        let view = ScoreView::from_records(&records);
        assert_eq!(view.lines, vec!["[12] /home", "[3] /api"]);
    }

    #[test]
    fn test_empty_scores_clear_the_list() {
        assert!(ScoreView::from_records(&[]).lines.is_empty());
    }

    #[test]
    fn test_overcharged_alert() {
        let view = AlertView::from_records(&[alert(50, 10)]).unwrap();

        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].line, "[2024-03-01 10:15:30 UTC] Overcharged");
        assert!(view.entries[0].overcharged);

        assert!(view.status.overcharged);
        assert_eq!(
            view.status.line,
            "High traffic generated an alert - hits = 50, triggered at 2024-03-01 10:15:30 UTC, limit 10"
        );
    }

    #[test]
    fn test_normal_alert() {
        let view = AlertView::from_records(&[alert(5, 10)]).unwrap();
        assert_eq!(view.entries[0].line, "[2024-03-01 10:15:30 UTC] Normal");
        assert!(!view.status.overcharged);
        assert_eq!(view.status.line, "Normal traffic - hits = 5, limit 10");
    }

    #[test]
    fn test_status_uses_first_record_only() {
        let view = AlertView::from_records(&[alert(1, 10), alert(99, 10), alert(98, 10)]).unwrap();
        assert!(!view.status.overcharged);
        assert_eq!(view.status.line, "Normal traffic - hits = 1, limit 10");
        assert_eq!(view.entries.iter().filter(|e| e.overcharged).count(), 2);
    }

    #[test]
    fn test_empty_alert_batch_has_no_projection() {
        assert!(AlertView::from_records(&[]).is_none());
    }

    #[test]
    fn test_hit_rate_points_and_bounds() {
        let view = HitRateView::new(vec![3.0, 1.0, 4.0]);
        assert_eq!(view.points(), vec![(0.0, 3.0), (1.0, 1.0), (2.0, 4.0)]);
        assert_eq!(view.bounds(), [1.0, 4.0]);

        assert_eq!(HitRateView::default().bounds(), [0.0, 1.0]);
        assert_eq!(HitRateView::new(vec![2.0, 2.0]).bounds(), [2.0, 3.0]);
    }
}
