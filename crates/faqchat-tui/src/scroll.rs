/// Line-based scroll state for the transcript area.
///
/// Follows the bottom until the user scrolls up; scrolling back to the end,
/// or an explicit request, resumes following.
#[derive(Debug, Clone)]
pub struct TranscriptScroll {
    offset: usize,
    follow_bottom: bool,
    last_max_offset: usize,
}

impl Default for TranscriptScroll {
    fn default() -> Self {
        Self {
            offset: 0,
            follow_bottom: true,
            last_max_offset: 0,
        }
    }
}

impl TranscriptScroll {
    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.min(self.last_max_offset).saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.last_max_offset);
        if self.offset == self.last_max_offset {
            self.follow_bottom = true;
        }
    }

    /// Top line to draw for `total` content lines in a `height`-line viewport.
    pub fn resolve(&mut self, total: usize, height: usize) -> usize {
        self.last_max_offset = total.saturating_sub(height);
        if self.follow_bottom {
            self.offset = self.last_max_offset;
        } else {
            self.offset = self.offset.min(self.last_max_offset);
        }
        self.offset
    }
}
