/// Default delay between revealed characters.
pub const TYPING_INTERVAL_MS: f64 = 50.0;

/// Reveals a string one character per interval, then stops.
pub struct TypingText {
    text: String,
    /// Byte offset of every char boundary after the first char, plus the end.
    boundaries: Vec<usize>,
    interval_ms: f64,
    start: Option<f64>,
    revealed: usize,
}

impl TypingText {
    pub fn new(text: impl Into<String>, interval_ms: f64) -> Self {
        let text = text.into();
        let boundaries = text
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();
        TypingText {
            text,
            boundaries,
            interval_ms: interval_ms.max(1.0),
            start: None,
            revealed: 0,
        }
    }

    /// Advance to `now_ms`. The first call starts the clock.
    pub fn update(&mut self, now_ms: f64) {
        if self.is_done() {
            return;
        }
        let start = *self.start.get_or_insert(now_ms);
        let ticks = ((now_ms - start) / self.interval_ms).floor().max(0.0) as usize;
        self.revealed = ticks.min(self.boundaries.len()).max(self.revealed);
    }

    /// Reveal everything at once.
    pub fn finish(&mut self) {
        self.revealed = self.boundaries.len();
    }

    pub fn visible(&self) -> &str {
        match self.revealed {
            0 => "",
            n => &self.text[..self.boundaries[n - 1]],
        }
    }

    #[cfg(test)]
    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.revealed == self.boundaries.len()
    }
}
