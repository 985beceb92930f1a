//! Popup rendering.
//!
//! The popup is a bordered box centered on the screen and sized to its
//! content; content wider than the screen is clipped and scrolled sideways,
//! never wrapped. Words made only of nucleotides are colored per base so aligned
//! rows are easy to compare.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::{content_width, PopupState};

/// Columns and rows taken by the border.
const BORDER: u16 = 2;

/// Color scheme for nucleotides.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA/RNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' | 'U' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Returns true if `word` looks like a (possibly gapped) nucleotide sequence.
fn is_sequence_word(word: &str) -> bool {
    word.chars().any(|c| c != '-')
        && word
            .chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'U' | 'N' | '-'))
}

/// Builds a styled line, coloring nucleotide words.
pub fn styled_line<'a>(line: &'a str, scheme: &dyn ColorScheme) -> Line<'a> {
    let mut spans: Vec<Span> = Vec::new();

    for (i, word) in line.split(' ').enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if is_sequence_word(word) {
            spans.extend(
                word.chars()
                    .map(|c| Span::styled(c.to_string(), Style::default().fg(scheme.get_color(c)))),
            );
        } else if !word.is_empty() {
            spans.push(Span::raw(word));
        }
    }

    Line::from(spans)
}

/// Centered rectangle for content of the given size, clamped to `screen`.
pub fn popup_area(content_width: u16, content_height: u16, screen: Rect) -> Rect {
    let width = content_width.saturating_add(BORDER).min(screen.width);
    let height = content_height.saturating_add(BORDER).min(screen.height);
    let x = screen.x + (screen.width - width) / 2;
    let y = screen.y + (screen.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Computes where the popup for `state` goes on `screen`.
pub fn layout(state: &PopupState, screen: Rect) -> Rect {
    let title = title_for(state);
    let width = content_width(&title, &state.lines).min(u16::MAX as usize) as u16;
    let height = state.lines.len().min(u16::MAX as usize) as u16;
    popup_area(width, height, screen)
}

/// Visible rows inside a popup of the given area.
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(BORDER) as usize
}

/// Visible columns inside a popup of the given area.
pub fn visible_cols(area: Rect) -> usize {
    area.width.saturating_sub(BORDER) as usize
}

/// Title with a position indicator when not everything fits.
fn title_for(state: &PopupState) -> String {
    if state.is_scrollable() && state.visible_rows > 0 {
        let last = (state.scroll + state.visible_rows).min(state.lines.len());
        format!(
            "{} [{}-{}/{}]",
            state.title,
            state.scroll + 1,
            last,
            state.lines.len()
        )
    } else {
        state.title.clone()
    }
}

/// Renders the popup.
pub fn render(frame: &mut Frame, state: &PopupState) {
    let area = layout(state, frame.area());
    let scheme = DnaColorScheme;

    let lines: Vec<Line> = state
        .visible_lines()
        .iter()
        .map(|l| styled_line(l, &scheme))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title_for(state),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Clear, area);
    let first_col = state.first_col.min(u16::MAX as usize) as u16;
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((0, first_col)),
        area,
    );
}
