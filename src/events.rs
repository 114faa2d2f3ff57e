use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the render loop should do in response to a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start an orderly shutdown.
    Quit,
    /// Redraw now instead of waiting for the next tick.
    Redraw,
}

/// Map a terminal event to an action.
pub fn handle_event(event: &Event) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key),
        Event::Resize(_, _) => Some(Action::Redraw),
        _ => None,
    }
}

/// Handle a key press
pub fn handle_key_event(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        // Raw mode turns Ctrl-C into a key press instead of SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        _ => None,
    }
}
