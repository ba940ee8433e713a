//! Progressive reply rendering on the terminal

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::symbols;
use crate::ai::stream::DisplaySink;

/// One terminal operation produced by a repaint
#[derive(Debug, Clone, PartialEq, Eq)]
enum Paint {
    /// Erase this many columns left of the cursor
    Erase(usize),
    Write(String),
    NewLine,
}

/// What is on screen, and how to move it to the next render.
///
/// Replies only ever grow, so each render prints the new suffix and
/// erases the previous cursor glyph instead of redrawing everything.
/// Without a terminal nothing can be erased, so the cursor glyph is
/// never printed and only new text is written.
#[derive(Debug)]
struct Repaint {
    cursor_suffix: String,
    interactive: bool,
    shown: String,
    cursor_on_screen: bool,
}

impl Repaint {
    fn new(cursor: &str, interactive: bool) -> Self {
        Self {
            cursor_suffix: format!(" {}", cursor),
            interactive,
            shown: String::new(),
            cursor_on_screen: false,
        }
    }

    fn next(&mut self, text: &str) -> Vec<Paint> {
        let mut ops = Vec::new();

        if self.cursor_on_screen {
            ops.push(Paint::Erase(console::measure_text_width(&self.cursor_suffix)));
            self.cursor_on_screen = false;
        }

        let (body, with_cursor) = match text.strip_suffix(self.cursor_suffix.as_str()) {
            Some(body) => (body, true),
            None => (text, false),
        };

        match body.strip_prefix(self.shown.as_str()) {
            Some("") => {}
            Some(fresh) => ops.push(Paint::Write(fresh.to_string())),
            None => {
                // not a continuation of what is on screen, start over below
                ops.push(Paint::NewLine);
                ops.push(Paint::Write(body.to_string()));
            }
        }
        self.shown = body.to_string();

        if with_cursor && self.interactive {
            ops.push(Paint::Write(self.cursor_suffix.clone()));
            self.cursor_on_screen = true;
        }
        ops
    }

    fn is_blank(&self) -> bool {
        self.shown.is_empty() && !self.cursor_on_screen
    }
}

/// Repaints a growing reply in place on stdout
pub struct TerminalSink {
    term: Term,
    repaint: Repaint,
    spinner: Option<ProgressBar>,
}

impl TerminalSink {
    pub fn new(cursor: &str) -> Self {
        let term = Term::stdout();
        let interactive = term.is_term();
        Self {
            term,
            repaint: Repaint::new(cursor, interactive),
            spinner: None,
        }
    }

    /// Like `new`, with a spinner until the first render
    pub fn thinking(cursor: &str) -> Self {
        let mut sink = Self::new(cursor);
        if sink.repaint.interactive {
            sink.spinner = Some(thinking_spinner());
        }
        sink
    }

    /// Stop the spinner and end the reply line
    pub fn finish(&mut self) {
        self.clear_spinner();
        if !self.repaint.is_blank() {
            self.term.write_line("").ok();
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl DisplaySink for TerminalSink {
    fn render(&mut self, text: &str) {
        self.clear_spinner();

        for op in self.repaint.next(text) {
            match op {
                Paint::Erase(width) => self.term.clear_chars(width),
                Paint::Write(s) => self.term.write_str(&s),
                Paint::NewLine => self.term.write_line(""),
            }
            .ok();
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} {msg:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&symbols::SPINNER),
    );
    spinner.set_message("thinking");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(s: &str) -> Paint {
        Paint::Write(s.to_string())
    }

    #[test]
    fn test_growing_reply_writes_only_the_suffix() {
        let mut repaint = Repaint::new("▌", true);

        assert_eq!(repaint.next("Hello ▌"), [write("Hello"), write(" ▌")]);
        assert_eq!(
            repaint.next("Hello world ▌"),
            [Paint::Erase(2), write(" world"), write(" ▌")]
        );
        assert_eq!(repaint.next("Hello world"), [Paint::Erase(2)]);
        assert!(!repaint.is_blank());
    }

    #[test]
    fn test_unrelated_text_restarts_below() {
        let mut repaint = Repaint::new("▌", true);
        repaint.next("first draft ▌");

        assert_eq!(
            repaint.next("second"),
            [Paint::Erase(2), Paint::NewLine, write("second")]
        );
        assert_eq!(repaint.next("second!"), [write("!")]);
    }

    #[test]
    fn test_redirected_output_has_no_cursor_or_erase() {
        let mut repaint = Repaint::new("▌", false);
        let mut ops = Vec::new();
        for text in ["Hi ▌", "Hi there ▌", "Hi there"] {
            ops.extend(repaint.next(text));
        }

        assert!(ops.iter().all(|op| !matches!(op, Paint::Erase(_))));
        let written: String = ops
            .iter()
            .filter_map(|op| match op {
                Paint::Write(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(written, "Hi there");
    }

    #[test]
    fn test_wide_cursor_glyph_is_measured_in_columns() {
        let mut repaint = Repaint::new("█▌", true);
        repaint.next("a █▌");
        assert_eq!(repaint.next("ab"), [Paint::Erase(3), write("b")]);
    }

    #[test]
    fn test_nothing_rendered_is_blank() {
        let mut repaint = Repaint::new("▌", true);
        assert!(repaint.is_blank());
        assert!(repaint.next("").is_empty());
        assert!(repaint.is_blank());
    }
}
