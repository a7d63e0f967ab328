use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Selected row and first visible row of a scrolling list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub index: usize,
    pub scroll: usize,
}

impl ListCursor {
    /// Move down by one, adjusting scroll to keep the cursor visible.
    pub(crate) fn down(&mut self, len: usize, page: usize) {
        if self.index + 1 < len {
            self.index += 1;
            if self.index >= self.scroll + page {
                self.scroll = self.index.saturating_sub(page.saturating_sub(1));
            }
        }
    }

    pub(crate) fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
        if self.index < self.scroll {
            self.scroll = self.index;
        }
    }

    pub(crate) fn top(&mut self) {
        self.index = 0;
        self.scroll = 0;
    }

    pub(crate) fn bottom(&mut self, len: usize, page: usize) {
        if len > 0 {
            self.index = len - 1;
            self.scroll = self.index.saturating_sub(page.saturating_sub(1));
        }
    }

    /// Pull the cursor back inside a list that may have shrunk.
    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.top();
            return;
        }
        self.index = self.index.min(len - 1);
        self.scroll = self.scroll.min(self.index);
    }
}

/// Truncate to `max` visible characters, ending in "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{kept}…")
}

/// Budget usage as a 0.0..=1.0 fill ratio for the gauge.
pub(crate) fn fill_ratio(usage: Option<Decimal>) -> f64 {
    usage
        .and_then(|u| u.to_f64())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

/// Fixed-width bar of `width` cells for a ratio between 0 and 1.
pub(crate) fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
