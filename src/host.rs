//! Editor-side glue.
//!
//! The editor owns selections, searches, and windows. This module only
//! prepares values for it:
//! - `join_selection`: a visual selection as one sequence string
//! - `escape_search_pattern`: a literal turned into a safe search pattern
//! - `DisplaySurface`: somewhere to show result lines

use std::io::Write;

use anyhow::Result;

/// Characters with a special meaning in a Vim search pattern.
const PATTERN_SPECIALS: &[char] = &['\\', '/', '.', '*', '$', '^', '~', '[', ']'];

/// Joins a (possibly multi-line) selection into a single string.
///
/// Line terminators are dropped and nothing is inserted between lines, so a
/// sequence wrapped over several lines comes back in one piece.
pub fn join_selection(text: &str) -> String {
    text.lines().collect()
}

/// Escapes `literal` so that searching for the result matches it exactly.
///
/// # Examples
///
/// ```
/// use seqpop::host::escape_search_pattern;
///
/// assert_eq!(escape_search_pattern("a.b*"), "a\\.b\\*");
/// assert_eq!(escape_search_pattern("ACGT"), "ACGT");
/// ```
pub fn escape_search_pattern(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if PATTERN_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A place where result lines can be shown to the user.
pub trait DisplaySurface {
    /// Shows `lines` under `title`, returning once the user is done with them.
    fn show(&mut self, title: &str, lines: &[String]) -> Result<()>;
}

/// Writes lines to an output stream, one per line. The title is not printed,
/// so the output can be read back by the editor as-is.
pub struct StdoutSurface<W: Write> {
    out: W,
}

impl<W: Write> StdoutSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the surface, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for StdoutSurface<W> {
    fn show(&mut self, _title: &str, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
