//! Widget state for the dashboard.

use crate::data::{AlertEntry, AlertStatus, HitRateView};
use crate::state::DisplayState;
use crate::ui::Theme;

/// What the widgets currently show.
///
/// Refreshed from the shared display state on every render tick. Fields
/// keep their last value for streams that have not sent anything new.
#[derive(Debug, Clone)]
pub struct App {
    /// "Most visited sections" list.
    pub scores: Vec<String>,
    /// "Last alerts" list.
    pub alerts: Vec<AlertEntry>,
    /// Status line under the chart; `None` until the first alert batch.
    pub alert_status: Option<AlertStatus>,
    /// Hit-rate chart dataset.
    pub hit_rate: HitRateView,
    pub theme: Theme,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            scores: Vec::new(),
            alerts: Vec::new(),
            alert_status: None,
            hit_rate: HitRateView::default(),
            theme,
        }
    }

    /// Copy the latest projections into the widgets.
    pub fn sync(&mut self, state: &DisplayState) {
        let snapshot = state.snapshot();

        if let Some(scores) = snapshot.scores {
            self.scores = scores.lines;
        }
        if let Some(alerts) = snapshot.alerts {
            self.alerts = alerts.entries;
            self.alert_status = Some(alerts.status);
        }
        if let Some(hit_rate) = snapshot.hit_rate {
            self.hit_rate = hit_rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, ScoreRecord};
    use crate::state;

    #[test]
    fn test_sync_copies_published_views() {
        let (display, publishers) = state::channel();
        let mut app = App::new(Theme::dark());

        app.sync(&display);
        assert!(app.scores.is_empty());
        assert!(app.alert_status.is_none());

        publishers.scores.publish(Batch::Scores(vec![ScoreRecord {
            section: "/home".to_string(),
            hits: 12,
        }]));
        publishers.hit_rate.publish(Batch::HitRate(vec![0.5, 1.5]));
        app.sync(&display);

        assert_eq!(app.scores, vec!["[12] /home"]);
        assert_eq!(app.hit_rate.samples, vec![0.5, 1.5]);
        assert!(app.alerts.is_empty());
    }
}
