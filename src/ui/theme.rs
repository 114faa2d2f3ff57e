//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the dashboard.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for titles and the chart line.
    pub highlight: Color,
    /// Color for overcharged alerts.
    pub overcharged: Color,
    /// Color for normal-traffic alerts.
    pub normal: Color,
    /// Color for list items.
    pub text: Color,
    /// Color for borders and axes.
    pub border: Color,
    /// Style for widget titles.
    pub title: Style,
    /// Style for placeholder text shown before data arrives.
    pub muted: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            overcharged: Color::Red,
            normal: Color::Green,
            text: Color::White,
            border: Color::Gray,
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            overcharged: Color::Red,
            normal: Color::Green,
            text: Color::Black,
            border: Color::DarkGray,
            title: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for an alert line or the status line.
    pub fn alert_style(&self, overcharged: bool) -> Style {
        if overcharged {
            Style::default().fg(self.overcharged).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.normal)
        }
    }
}
