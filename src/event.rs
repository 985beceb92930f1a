//! Keyboard event handling for the popup.
//!
//! Keys:
//! - `q`, `Esc`, `Enter`, `Ctrl+C`: close the popup
//! - `j` / `Down`, `k` / `Up`: scroll one line
//! - `Ctrl+D` / `Ctrl+U`: scroll half a page
//! - `g` / `Home`, `G` / `End`: jump to top / bottom
//! - `h` / `Left`, `l` / `Right`: scroll one column
//! - `0` / `$`: jump to first / last column
//!
//! Losing terminal focus also closes the popup.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::model::PopupState;

/// Actions that can be triggered by input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Close the popup
    Close,
    ScrollUp,
    ScrollDown,
    /// Scroll half a page up (Ctrl+U)
    HalfPageUp,
    /// Scroll half a page down (Ctrl+D)
    HalfPageDown,
    GotoTop,
    GotoBottom,
    ScrollLeft,
    ScrollRight,
    /// Go to first column (0)
    GotoFirstColumn,
    /// Go to last column ($)
    GotoLastColumn,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action.
pub fn handle_event(event: Event) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event),
        Event::Resize(width, height) => Action::Resize(width, height),
        Event::FocusLost => Action::Close,
        _ => Action::None,
    }
}

fn handle_key_event(key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Close,
            KeyCode::Char('d') => Action::HalfPageDown,
            KeyCode::Char('u') => Action::HalfPageUp,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => Action::Close,

        KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,

        KeyCode::Char('g') | KeyCode::Home => Action::GotoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GotoBottom,

        KeyCode::Char('h') | KeyCode::Left => Action::ScrollLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::ScrollRight,
        KeyCode::Char('0') => Action::GotoFirstColumn,
        KeyCode::Char('$') => Action::GotoLastColumn,

        KeyCode::PageUp => Action::HalfPageUp,
        KeyCode::PageDown => Action::HalfPageDown,

        _ => Action::None,
    }
}

/// Applies an action to the popup state.
///
/// Returns `true` if the popup should stay open.
pub fn apply_action(state: &mut PopupState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Close => state.close(),
        Action::ScrollUp => state.scroll_up(),
        Action::ScrollDown => state.scroll_down(),
        Action::HalfPageUp => state.half_page_up(),
        Action::HalfPageDown => state.half_page_down(),
        Action::GotoTop => state.goto_top(),
        Action::GotoBottom => state.goto_bottom(),
        Action::ScrollLeft => state.scroll_left(),
        Action::ScrollRight => state.scroll_right(),
        Action::GotoFirstColumn => state.goto_first_column(),
        Action::GotoLastColumn => state.goto_last_column(),
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
    }

    !state.should_close
}
