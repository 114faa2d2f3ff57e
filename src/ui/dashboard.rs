//! Dashboard screen rendering.
//!
//! Two lists side by side (scores, alerts), the hit-rate chart below them,
//! and a one-line status bar at the bottom.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Height of the two list panels, borders included.
const LIST_HEIGHT: u16 = 12;

/// Render the whole dashboard.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        render_too_small(frame, area);
        return;
    }

    let rows = Layout::vertical([
        Constraint::Length(LIST_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    let lists =
        Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(rows[0]);
    render_scores(frame, app, lists[0]);
    render_alerts(frame, app, lists[1]);
    render_chart(frame, app, rows[1]);
    render_status_bar(frame, app, rows[2]);
}

fn panel<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(format!(" {} ", title), app.theme.title))
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// "Most visited sections" list, in the order the server ranked them.
pub fn render_scores(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Most visited sections");
    if app.scores.is_empty() {
        let placeholder = Paragraph::new("Waiting for scores...")
            .style(app.theme.muted)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .scores
        .iter()
        .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(app.theme.text)))
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

/// "Last alerts" list, colored by overcharge state.
pub fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel(app, "Last alerts");
    if app.alerts.is_empty() {
        let placeholder = Paragraph::new("No alerts yet").style(app.theme.muted).block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .alerts
        .iter()
        .map(|entry| {
            ListItem::new(entry.line.as_str()).style(app.theme.alert_style(entry.overcharged))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

/// Hit-rate line chart of the latest sample window.
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.hit_rate.points();
    let [low, high] = app.hit_rate.bounds();
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let dataset = Dataset::default()
        .marker(Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.highlight))
        .data(&points);

    let axis_style = Style::default().fg(app.theme.border);
    let chart = Chart::new(vec![dataset])
        .block(panel(app, "Hit rate"))
        .x_axis(Axis::default().style(axis_style).bounds([0.0, x_max]))
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([low, high])
                .labels(vec![format!("{:.1}", low), format!("{:.1}", high)]),
        );
    frame.render_widget(chart, area);
}

/// Alert status line on the left, quit hint on the right.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let columns =
        Layout::horizontal([Constraint::Ratio(10, 12), Constraint::Ratio(2, 12)]).split(area);

    let status = match &app.alert_status {
        Some(status) => Line::from(Span::styled(
            format!(" {}", status.line),
            app.theme.alert_style(status.overcharged),
        )),
        None => Line::from(Span::styled(" Waiting for alerts...", app.theme.muted)),
    };
    frame.render_widget(Paragraph::new(status), columns[0]);

    let hint = Paragraph::new("[Q]uit ").alignment(Alignment::Right);
    frame.render_widget(hint, columns[1]);
}

fn render_too_small(frame: &mut Frame, area: Rect) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(ratatui::style::Color::Yellow));
    let height = 5u16.min(area.height);
    let centered = Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height);
    frame.render_widget(paragraph, centered);
}
