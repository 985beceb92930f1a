//! Terminal popup controller.
//!
//! This module runs the popup loop:
//! - Terminal initialization and cleanup
//! - Event polling and handling
//! - Re-layout on resize

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use crate::event::{apply_action, handle_event, poll_event, Action};
use crate::host::DisplaySurface;
use crate::model::PopupState;
use crate::ui::{layout, render, visible_cols, visible_rows};

/// Shows result lines in a full-terminal popup until dismissed.
#[derive(Debug, Clone)]
pub struct TerminalPopup {
    tick_rate: Duration,
}

impl Default for TerminalPopup {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
        }
    }
}

impl TerminalPopup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for TerminalPopup {
    fn show(&mut self, title: &str, lines: &[String]) -> Result<()> {
        let mut app = App::new(title, lines.to_vec(), self.tick_rate)?;
        app.run()
    }
}

/// The popup application: owns the terminal for its lifetime.
struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: PopupState,
    tick_rate: Duration,
}

impl App {
    fn new(title: &str, lines: Vec<String>, tick_rate: Duration) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state: PopupState::new(title, lines),
            tick_rate,
        })
    }

    fn run(&mut self) -> Result<()> {
        self.update_layout()?;

        loop {
            self.terminal.draw(|frame| {
                render(frame, &self.state);
            })?;

            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event);

                if let Action::Resize(_, _) = action {
                    self.update_layout()?;
                }

                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Fits the viewport to the popup area for the current terminal size.
    fn update_layout(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);
        let area = layout(&self.state, screen);
        self.state
            .update_viewport_size(visible_rows(area), visible_cols(area));
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}
