/// How long each section takes to settle once its delay has passed.
pub const SECTION_REVEAL_MS: f64 = 1000.0;

/// Direction a section slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slide {
    /// Starts `n` cells to the left.
    FromLeft(u16),
    /// Starts `n` rows below.
    FromBelow(u16),
}

/// Staggered fade-and-slide intro for one page section.
#[derive(Debug, Clone, Copy)]
pub struct SectionReveal {
    pub delay_ms: f64,
    pub slide: Slide,
}

/// Visual state of a section at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealFrame {
    /// 0.0 = invisible, 1.0 = full color.
    pub opacity: f64,
    pub dx: i32,
    pub dy: i32,
}

#[cfg(test)]
impl RevealFrame {
    pub const SETTLED: RevealFrame = RevealFrame {
        opacity: 1.0,
        dx: 0,
        dy: 0,
    };
}

impl SectionReveal {
    pub fn new(delay_ms: f64, slide: Slide) -> Self {
        SectionReveal { delay_ms, slide }
    }

    /// Frame at `elapsed_ms` since the page was shown.
    pub fn at(&self, elapsed_ms: f64) -> RevealFrame {
        let t = ((elapsed_ms - self.delay_ms) / SECTION_REVEAL_MS).clamp(0.0, 1.0);
        let e = ease_out_cubic(t);
        let remaining = 1.0 - e;
        let (dx, dy) = match self.slide {
            Slide::FromLeft(n) => (-(remaining * n as f64).round() as i32, 0),
            Slide::FromBelow(n) => (0, (remaining * n as f64).round() as i32),
        };
        RevealFrame {
            opacity: e,
            dx,
            dy,
        }
    }

    pub fn is_settled(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.delay_ms + SECTION_REVEAL_MS
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Scale a color toward black by `opacity`.
pub fn fade(color: (u8, u8, u8), opacity: f64) -> (u8, u8, u8) {
    let o = opacity.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f64 * o).round() as u8;
    (scale(color.0), scale(color.1), scale(color.2))
}
