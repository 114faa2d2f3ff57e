//! Terminal UI rendering using ratatui.
//!
//! - [`dashboard`]: the single dashboard screen
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌─ Most visited sections ──┐┌─ Last alerts ────────────┐
//! │ [12] /home               ││ [2024-03-01 ...] Normal  │
//! │ [3] /api                 ││                          │
//! └──────────────────────────┘└──────────────────────────┘
//! ┌─ Hit rate ──────────────────────────────────────────┐
//! │        •  •                                         │
//! │     •        •  •                                   │
//! └─────────────────────────────────────────────────────┘
//!  Normal traffic - hits = 5, limit 10              [Q]uit
//! ```

pub mod dashboard;
pub mod theme;

pub use theme::Theme;
