//! Scroll position of the output pane.
//!
//! Position is kept as a distance from the bottom so the pane follows the tail
//! by default. While scrolled back, `hold` keeps the same lines in view as new
//! output arrives.

use std::ops::Range;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputPane {
    scroll_back: usize,
}

impl OutputPane {
    pub fn following(&self) -> bool {
        self.scroll_back == 0
    }

    /// Line range visible for `total` lines in a pane `height` rows tall.
    pub fn window(&self, total: usize, height: usize) -> Range<usize> {
        let back = self.scroll_back.min(total.saturating_sub(height));
        let end = total - back;
        end.saturating_sub(height)..end
    }

    pub fn scroll_up(&mut self, lines: usize, total: usize, height: usize) {
        let max_back = total.saturating_sub(height);
        self.scroll_back = (self.scroll_back + lines).min(max_back);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn top(&mut self, total: usize, height: usize) {
        self.scroll_back = total.saturating_sub(height);
    }

    /// Jump to the tail and follow it again.
    pub fn bottom(&mut self) {
        self.scroll_back = 0;
    }

    /// Account for one appended line without moving the view.
    pub fn hold(&mut self) {
        if self.scroll_back > 0 {
            self.scroll_back += 1;
        }
    }
}
