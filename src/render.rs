//! The render loop and terminal lifecycle.
//!
//! The loop copies the shared display state into the widgets on a fixed
//! tick and redraws. The quit key does not stop the loop directly; it asks
//! the shutdown coordinator to shut down, and the loop keeps drawing until
//! the coordinator signals stop.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::{Stream, StreamExt};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::app::App;
use crate::events::{self, Action};
use crate::shutdown::ShutdownReason;
use crate::state::DisplayState;
use crate::ui;

/// Periodic redraw driven by a timer, plus keyboard handling.
pub struct RenderLoop<B: Backend> {
    terminal: Terminal<B>,
    app: App,
    display: DisplayState,
    refresh: Duration,
    stop: watch::Receiver<bool>,
    requests: mpsc::Sender<ShutdownReason>,
}

impl<B: Backend> RenderLoop<B> {
    /// Create a render loop.
    ///
    /// `stop` comes from the coordinator's render signal; `requests` is
    /// where a quit request is sent.
    pub fn new(
        terminal: Terminal<B>,
        app: App,
        display: DisplayState,
        refresh: Duration,
        stop: watch::Receiver<bool>,
        requests: mpsc::Sender<ShutdownReason>,
    ) -> Self {
        Self {
            terminal,
            app,
            display,
            refresh,
            stop,
            requests,
        }
    }

    /// Run until the stop signal fires, then hand the terminal back.
    ///
    /// A draw failure requests a [`ShutdownReason::RenderFailed`] shutdown
    /// before the error is returned.
    pub async fn run<E>(mut self, mut events: E) -> Result<Terminal<B>>
    where
        E: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut events_open = true;
        let mut quit_requested = false;

        loop {
            if *self.stop.borrow_and_update() {
                break;
            }

            let redraw = tokio::select! {
                _ = ticker.tick() => {
                    self.app.sync(&self.display);
                    true
                }
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    false
                }
                event = events.next(), if events_open => match event {
                    Some(Ok(event)) => match events::handle_event(&event) {
                        Some(Action::Quit) => {
                            if !quit_requested {
                                quit_requested = true;
                                request(&self.requests, ShutdownReason::UserQuit).await;
                            }
                            false
                        }
                        Some(Action::Redraw) => true,
                        None => false,
                    },
                    Some(Err(err)) => {
                        warn!(error = %err, "terminal event error");
                        false
                    }
                    None => {
                        events_open = false;
                        false
                    }
                },
            };

            if redraw {
                if let Err(err) = self.draw() {
                    error!(error = %err, "failed to draw dashboard");
                    request(&self.requests, ShutdownReason::RenderFailed).await;
                    return Err(err);
                }
            }
        }

        debug!("render loop stopped");
        Ok(self.terminal)
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal.draw(|frame| ui::dashboard::render(frame, app))?;
        Ok(())
    }
}

async fn request(requests: &mpsc::Sender<ShutdownReason>, reason: ShutdownReason) {
    if requests.send(reason).await.is_err() {
        debug!(%reason, "shutdown already under way");
    }
}

/// Put the terminal in raw mode on the alternate screen.
///
/// If any step fails the terminal is restored before the error is returned.
/// Also installs a panic hook that restores the terminal before the panic
/// message is printed.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let terminal = match enter_alternate_screen() {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = restore_terminal();
            return Err(err);
        }
    };

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = restore_terminal();
        original_hook(panic);
    }));

    Ok(terminal)
}

fn enter_alternate_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Leave the alternate screen and raw mode.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, ScoreRecord};
    use crate::state;
    use crate::ui::dashboard::tests::buffer_text;
    use crate::ui::Theme;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures_util::stream;
    use ratatui::backend::{TestBackend, WindowSize};
    use ratatui::buffer::Cell;
    use ratatui::layout::{Position, Size};

    fn quit_key() -> io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_draws_latest_state_until_stopped() {
        let (display, publishers) = state::channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (req_tx, _req_rx) = mpsc::channel(1);
        let terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let render = RenderLoop::new(
            terminal,
            App::new(Theme::dark()),
            display,
            Duration::from_secs(1),
            stop_rx,
            req_tx,
        );
        let task = tokio::spawn(render.run(stream::pending()));

        publishers.scores.publish(Batch::Scores(vec![ScoreRecord {
            section: "/home".to_string(),
            hits: 12,
        }]));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        stop_tx.send_replace(true);

        let terminal = task.await.unwrap().unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("[12] /home"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_key_requests_shutdown_once() {
        let (display, _publishers) = state::channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (req_tx, mut req_rx) = mpsc::channel(4);
        let terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let render = RenderLoop::new(
            terminal,
            App::new(Theme::dark()),
            display,
            Duration::from_secs(1),
            stop_rx,
            req_tx,
        );
        let keys = stream::iter(vec![quit_key(), quit_key()]);
        let task = tokio::spawn(render.run(keys));

        assert_eq!(req_rx.recv().await, Some(ShutdownReason::UserQuit));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(req_rx.try_recv().is_err());

        // Quitting does not stop the loop on its own
        assert!(!task.is_finished());
        stop_tx.send_replace(true);
        assert!(task.await.unwrap().is_ok());
    }

    /// A backend whose screen is gone: every draw fails.
    struct BrokenBackend(TestBackend);

    impl Backend for BrokenBackend {
        fn draw<'a, I>(&mut self, _content: I) -> io::Result<()>
        where
            I: Iterator<Item = (u16, u16, &'a Cell)>,
        {
            Err(io::Error::other("terminal gone"))
        }

        fn hide_cursor(&mut self) -> io::Result<()> {
            self.0.hide_cursor()
        }

        fn show_cursor(&mut self) -> io::Result<()> {
            self.0.show_cursor()
        }

        fn get_cursor_position(&mut self) -> io::Result<Position> {
            self.0.get_cursor_position()
        }

        fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
            self.0.set_cursor_position(position)
        }

        fn clear(&mut self) -> io::Result<()> {
            self.0.clear()
        }

        fn size(&self) -> io::Result<Size> {
            self.0.size()
        }

        fn window_size(&mut self) -> io::Result<WindowSize> {
            self.0.window_size()
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.flush()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_failure_requests_render_shutdown() {
        let (display, _publishers) = state::channel();
        let (_stop_tx, stop_rx) = watch::channel(false);
        let (req_tx, mut req_rx) = mpsc::channel(4);
        let terminal = Terminal::new(BrokenBackend(TestBackend::new(100, 30))).unwrap();
        let render = RenderLoop::new(
            terminal,
            App::new(Theme::dark()),
            display,
            Duration::from_secs(1),
            stop_rx,
            req_tx,
        );

        let result = render.run(stream::pending()).await;
        assert!(result.is_err());
        assert_eq!(req_rx.recv().await, Some(ShutdownReason::RenderFailed));
        assert!(req_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_stop_signal_ends_loop() {
        let (display, _publishers) = state::channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (req_tx, _req_rx) = mpsc::channel(1);
        let terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let render = RenderLoop::new(
            terminal,
            App::new(Theme::dark()),
            display,
            Duration::from_millis(50),
            stop_rx,
            req_tx,
        );
        drop(stop_tx);
        assert!(render.run(stream::pending()).await.is_ok());
    }
}
