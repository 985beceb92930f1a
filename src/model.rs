//! State of the result popup.
//!
//! The popup shows a list of text lines in a scrollable, bordered box. Lines
//! are never wrapped: a viewport of rows and columns moves over them, so the
//! rows of an alignment block keep their columns lined up. This module holds
//! the scrolling logic; rendering lives in `ui` and input handling in `event`.

use textwrap::core::display_width;

/// Width needed to show every line and the title without truncation.
pub fn content_width(title: &str, lines: &[String]) -> usize {
    lines
        .iter()
        .map(|l| display_width(l))
        .chain(std::iter::once(display_width(title)))
        .max()
        .unwrap_or(0)
}

/// The complete popup state.
#[derive(Debug, Clone)]
pub struct PopupState {
    /// Popup title (shown in the top border)
    pub title: String,
    /// Lines to display, verbatim
    pub lines: Vec<String>,
    /// Index of the first visible line
    pub scroll: usize,
    /// Index of the first visible column
    pub first_col: usize,
    /// Number of lines that fit inside the border
    pub visible_rows: usize,
    /// Number of columns that fit inside the border
    pub visible_cols: usize,
    /// Whether the popup should close
    pub should_close: bool,
    /// Display width of the widest line
    widest: usize,
}

impl PopupState {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        let widest = content_width("", &lines);
        Self {
            title: title.into(),
            lines,
            scroll: 0,
            first_col: 0,
            visible_rows: 0,
            visible_cols: 0,
            should_close: false,
            widest,
        }
    }

    /// Updates the viewport dimensions.
    pub fn update_viewport_size(&mut self, rows: usize, cols: usize) {
        self.visible_rows = rows;
        self.visible_cols = cols;
        self.clamp_viewport();
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.visible_rows)
    }

    /// Largest valid first column.
    pub fn max_col(&self) -> usize {
        self.widest.saturating_sub(self.visible_cols)
    }

    /// Lines currently inside the viewport (rows only; columns are clipped at
    /// render time).
    pub fn visible_lines(&self) -> &[String] {
        let end = (self.scroll + self.visible_rows).min(self.lines.len());
        &self.lines[self.scroll.min(end)..end]
    }

    /// Returns true if some lines are outside the viewport.
    pub fn is_scrollable(&self) -> bool {
        self.lines.len() > self.visible_rows
    }

    /// Returns true if some columns are outside the viewport.
    pub fn is_h_scrollable(&self) -> bool {
        self.widest > self.visible_cols
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = (self.scroll + 1).min(self.max_scroll());
    }

    pub fn scroll_left(&mut self) {
        self.first_col = self.first_col.saturating_sub(1);
    }

    pub fn scroll_right(&mut self) {
        self.first_col = (self.first_col + 1).min(self.max_col());
    }

    /// Scrolls up by half the visible rows (Ctrl+U).
    pub fn half_page_up(&mut self) {
        let half = (self.visible_rows / 2).max(1);
        self.scroll = self.scroll.saturating_sub(half);
    }

    /// Scrolls down by half the visible rows (Ctrl+D).
    pub fn half_page_down(&mut self) {
        let half = (self.visible_rows / 2).max(1);
        self.scroll = (self.scroll + half).min(self.max_scroll());
    }

    pub fn goto_top(&mut self) {
        self.scroll = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Go to first column (0)
    pub fn goto_first_column(&mut self) {
        self.first_col = 0;
    }

    /// Go to last column ($)
    pub fn goto_last_column(&mut self) {
        self.first_col = self.max_col();
    }

    pub fn close(&mut self) {
        self.should_close = true;
    }

    fn clamp_viewport(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
        self.first_col = self.first_col.min(self.max_col());
    }
}
