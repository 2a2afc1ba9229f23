pub mod card;
pub mod layout;

use crate::animations::TypingText;
use crate::animations::reveal::fade;
use crate::content::{CardSpec, Portfolio};
use crate::palette::{Palette, Rgb};
use crate::render::{Canvas, RenderMode, TextStyle};

use card::Card;
use layout::{Layout, Rect, SectionId, Tone};

/// The laid-out portfolio plus everything that moves on it: the typed
/// intro, the hover cards, the scroll position and the pointer.
pub struct Page {
    portfolio: Portfolio,
    palette: Palette,
    typing: TypingText,
    typing_interval: f64,
    cards: Vec<Card>,
    layout: Layout,
    render_mode: RenderMode,
    term_cols: usize,
    view_rows: usize,
    scroll: usize,
    hovered: Option<usize>,
    /// Last pointer cell in screen coordinates; `None` while the keyboard
    /// drives focus or the pointer is outside the window.
    pointer: Option<(usize, usize)>,
}

impl Page {
    pub fn new(
        portfolio: Portfolio,
        palette: Palette,
        typing_interval: f64,
        term_cols: usize,
        view_rows: usize,
        render_mode: RenderMode,
    ) -> Self {
        let typing = TypingText::new(portfolio.intro.clone(), typing_interval);
        let cards = build_cards(&portfolio, &palette);
        let layout = layout::layout(&portfolio, term_cols);
        let mut page = Page {
            portfolio,
            palette,
            typing,
            typing_interval,
            cards,
            layout,
            render_mode,
            term_cols,
            view_rows,
            scroll: 0,
            hovered: None,
            pointer: None,
        };
        page.relayout(term_cols, view_rows, render_mode);
        page
    }

    /// Lay out again for a new terminal size or render mode. Card surfaces
    /// are remounted, which resizes their animations.
    pub fn relayout(&mut self, term_cols: usize, view_rows: usize, render_mode: RenderMode) {
        self.term_cols = term_cols;
        self.view_rows = view_rows;
        self.render_mode = render_mode;
        self.layout = layout::layout(&self.portfolio, term_cols);
        for (card, rect) in self.cards.iter_mut().zip(&self.layout.cards) {
            card.mount(*rect, render_mode);
        }
        self.scroll = self.scroll.min(self.max_scroll());
        self.rehit();
        tracing::debug!(
            cols = term_cols,
            rows = view_rows,
            height = self.layout.height,
            cards = self.cards.len(),
            "page laid out"
        );
    }

    /// Swap in reloaded content. The typed intro restarts only if it changed.
    pub fn set_portfolio(&mut self, portfolio: Portfolio) {
        self.set_hovered(None);
        if portfolio.intro != self.portfolio.intro {
            self.typing = TypingText::new(portfolio.intro.clone(), self.typing_interval);
        }
        self.cards = build_cards(&portfolio, &self.palette);
        self.portfolio = portfolio;
        self.relayout(self.term_cols, self.view_rows, self.render_mode);
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[cfg(test)]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn height(&self) -> usize {
        self.layout.height
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn max_scroll(&self) -> usize {
        self.layout.height.saturating_sub(self.view_rows)
    }

    pub fn scroll_by(&mut self, rows: isize) {
        let target = (self.scroll as isize + rows).max(0) as usize;
        self.scroll_to(target);
    }

    /// Scrolling moves the page under a resting pointer, so hover is
    /// re-evaluated.
    pub fn scroll_to(&mut self, row: usize) {
        self.scroll = row.min(self.max_scroll());
        self.rehit();
    }

    pub fn pointer_moved(&mut self, col: usize, row: usize) {
        self.pointer = Some((col, row));
        self.rehit();
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.set_hovered(None);
    }

    /// Keyboard focus: hover the next (or previous) card, wrapping, and
    /// scroll it into view.
    pub fn focus_next(&mut self, forward: bool) {
        let n = self.cards.len();
        if n == 0 {
            return;
        }
        let next = match (self.hovered, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.pointer = None;
        if let Some(rect) = self.cards[next].rect() {
            if rect.row < self.scroll {
                self.scroll_to(rect.row);
            } else if rect.row + rect.height > self.scroll + self.view_rows {
                self.scroll_to((rect.row + rect.height).saturating_sub(self.view_rows));
            }
        }
        self.set_hovered(Some(next));
    }

    pub fn hovered_card(&self) -> Option<&CardSpec> {
        self.hovered.map(|i| &self.cards[i].spec)
    }

    /// Advance the typed intro and run due card frames.
    pub fn tick(&mut self, now_ms: f64) {
        self.typing.update(now_ms);
        for card in &mut self.cards {
            card.tick(now_ms);
        }
    }

    /// Whether anything on the page still changes without input: the typed
    /// intro, a running card wipe, or a section still sliding in.
    pub fn is_animating(&self, elapsed_ms: f64) -> bool {
        // Footer has the longest delay, so it settles last.
        !self.typing.is_done()
            || !SectionId::Footer.reveal().is_settled(elapsed_ms)
            || self.cards.iter().any(Card::is_animating)
    }

    /// Show the whole intro at once.
    pub fn skip_typing(&mut self) {
        self.typing.finish();
    }

    /// Paint the visible part of the page. `elapsed_ms` drives the
    /// section entrance.
    pub fn draw(&self, canvas: &mut Canvas, elapsed_ms: f64) {
        let scroll = self.scroll as isize;

        for line in &self.layout.lines {
            let frame = line.section.reveal().at(elapsed_ms);
            if frame.opacity <= 0.0 {
                continue;
            }
            let row = line.row as isize - scroll + frame.dy as isize;
            for span in &line.spans {
                let (color, style) = tone_style(span.tone);
                let col = span.col as isize + frame.dx as isize;
                canvas.put_text(col, row, &span.text, fade(color, frame.opacity), style);
            }
        }

        self.draw_intro(canvas, elapsed_ms);

        let frame = SectionId::Press.reveal().at(elapsed_ms);
        if frame.opacity <= 0.0 {
            return;
        }
        let (cw, ch) = canvas.render_mode.cell_pixels();
        for (i, card) in self.cards.iter().enumerate() {
            let Some(rect) = card.rect() else {
                continue;
            };
            let col = rect.col as isize + frame.dx as isize;
            let row = rect.row as isize - scroll + frame.dy as isize;
            if let Some(surface) = card.surface() {
                let inner = rect.inner();
                let x = (inner.col as isize + frame.dx as isize) * cw as isize;
                let y = (inner.row as isize - scroll + frame.dy as isize) * ch as isize;
                canvas.blit(surface, x, y);
            }
            let hovered = self.hovered == Some(i);
            let border = if hovered {
                self.palette.color_for(card.spec.color_index)
            } else {
                tone_style(Tone::Rule).0
            };
            draw_box(canvas, rect, col, row, fade(border, frame.opacity));

            let text_w = rect.width.saturating_sub(4);
            let (title_color, title_style) = tone_style(Tone::Heading);
            let (sub_color, sub_style) = tone_style(Tone::Muted);
            canvas.put_text(
                col + 2,
                row + 2,
                &layout::truncate(&card.spec.title, text_w),
                fade(title_color, frame.opacity),
                title_style,
            );
            canvas.put_text(
                col + 2,
                row + 3,
                &layout::truncate(&card.spec.subtitle, text_w),
                fade(sub_color, frame.opacity),
                sub_style,
            );
        }
    }

    fn draw_intro(&self, canvas: &mut Canvas, elapsed_ms: f64) {
        let frame = SectionId::Bio.reveal().at(elapsed_ms);
        if frame.opacity <= 0.0 {
            return;
        }
        let (color, style) = tone_style(Tone::Body);
        let color = fade(color, frame.opacity);
        let revealed = self.typing.visible().chars().count();
        let block = &self.layout.intro;
        let col = block.rect.col as isize + frame.dx as isize;
        for (i, line) in block.lines.iter().enumerate() {
            let row = (block.rect.row + i) as isize - self.scroll as isize + frame.dy as isize;
            canvas.put_text(col, row, line.revealed(revealed), color, style);
        }
    }

    fn hit_test(&self) -> Option<usize> {
        let (col, row) = self.pointer?;
        let page_row = row + self.scroll;
        self.cards
            .iter()
            .position(|c| c.rect().is_some_and(|r| r.contains(col, page_row)))
    }

    fn rehit(&mut self) {
        if self.pointer.is_some() {
            let hit = self.hit_test();
            self.set_hovered(hit);
        }
    }

    fn set_hovered(&mut self, next: Option<usize>) {
        if next == self.hovered {
            return;
        }
        if let Some(card) = self.hovered.and_then(|i| self.cards.get_mut(i)) {
            card.pointer_leave();
        }
        if let Some(card) = next.and_then(|i| self.cards.get_mut(i)) {
            card.pointer_enter();
        }
        self.hovered = next;
    }
}

fn build_cards(portfolio: &Portfolio, palette: &Palette) -> Vec<Card> {
    portfolio
        .cards()
        .into_iter()
        .map(|spec| Card::new(spec, palette))
        .collect()
}

/// Ink for a dark terminal background.
fn tone_style(tone: Tone) -> (Rgb, TextStyle) {
    match tone {
        Tone::Title | Tone::Heading => ((240, 240, 240), TextStyle::BOLD),
        Tone::Body => ((210, 210, 210), TextStyle::PLAIN),
        Tone::Muted => ((140, 140, 140), TextStyle::PLAIN),
        Tone::Link => ((120, 170, 255), TextStyle::LINK),
        Tone::Rule => ((90, 90, 90), TextStyle::PLAIN),
    }
}

fn draw_box(canvas: &mut Canvas, rect: Rect, col: isize, row: isize, color: Rgb) {
    if rect.width < 2 || rect.height < 2 {
        return;
    }
    let bar = "─".repeat(rect.width - 2);
    let style = TextStyle::PLAIN;
    canvas.put_text(col, row, &format!("┌{bar}┐"), color, style);
    for r in 1..rect.height - 1 {
        canvas.put_text(col, row + r as isize, "│", color, style);
        canvas.put_text(col + rect.width as isize - 1, row + r as isize, "│", color, style);
    }
    canvas.put_text(col, row + rect.height as isize - 1, &format!("└{bar}┘"), color, style);
}
