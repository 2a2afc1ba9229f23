use crate::animations::{HoverReveal, RevealState};
use crate::content::CardSpec;
use crate::palette::Palette;
use crate::render::{Canvas, RenderMode};
use crate::scheduler::FrameQueue;
use crate::surface::DrawSurface;

use super::layout::Rect;

/// A press card: its content, its place on the page, and its hover wipe.
///
/// The surface only exists once the card has been laid out; until then
/// pointer events are ignored.
pub struct Card {
    pub spec: CardSpec,
    rect: Option<Rect>,
    surface: Option<Canvas>,
    reveal: HoverReveal,
    frames: FrameQueue,
}

impl Card {
    pub fn new(spec: CardSpec, palette: &Palette) -> Self {
        let fill = palette.color_for(spec.color_index);
        Card {
            spec,
            rect: None,
            surface: None,
            reveal: HoverReveal::new(0.0, 0.0, fill),
            frames: FrameQueue::new(),
        }
    }

    /// Place the card at `rect` (border included) and size its surface for
    /// the render mode's pixel density.
    pub fn mount(&mut self, rect: Rect, mode: RenderMode) {
        self.rect = Some(rect);
        let inner = rect.inner();
        let (cw, ch) = mode.cell_pixels();
        let (px_w, px_h) = (inner.width * cw, inner.height * ch);
        if self
            .surface
            .as_ref()
            .is_some_and(|s| s.width == px_w && s.height == px_h)
        {
            return;
        }

        let mut surface = Canvas::layer(px_w, px_h);
        self.reveal.resize(px_w as f64, px_h as f64);
        if self.reveal.state() == RevealState::Completing {
            surface.set_fill_color(self.reveal.fill_color());
            surface.fill_rect(0.0, 0.0, px_w as f64, px_h as f64);
        }
        self.surface = Some(surface);
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn surface(&self) -> Option<&Canvas> {
        self.surface.as_ref()
    }

    #[cfg(test)]
    pub fn state(&self) -> RevealState {
        self.reveal.state()
    }

    pub fn pointer_enter(&mut self) {
        if self.surface.is_none() {
            return;
        }
        tracing::debug!(card = self.spec.color_index, title = %self.spec.title, "pointer enter");
        self.reveal.pointer_enter(&mut self.frames);
    }

    pub fn pointer_leave(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        tracing::debug!(card = self.spec.color_index, "pointer leave");
        self.reveal.pointer_leave(surface, &mut self.frames);
    }

    /// Run the frame callbacks due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        for handle in self.frames.take_due() {
            self.reveal.on_frame(handle, now_ms, surface, &mut self.frames);
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.frames.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(i: isize) -> CardSpec {
        CardSpec {
            title: format!("Article Title {}", i + 1),
            subtitle: "Publication".into(),
            color_index: i,
            url: "#".into(),
        }
    }

    fn rect() -> Rect {
        Rect {
            col: 0,
            row: 0,
            width: 12,
            height: 6,
        }
    }

    fn lit(c: &Canvas) -> usize {
        c.pixels.iter().filter(|&&v| v > 0.0).count()
    }

    #[test]
    fn unmounted_card_ignores_pointer() {
        let mut card = Card::new(spec(0), &Palette::default());
        card.pointer_enter();
        assert_eq!(card.state(), RevealState::Idle);
        assert!(!card.is_animating());
        card.pointer_leave();
        card.tick(0.0);
    }

    #[test]
    fn surface_matches_inner_area() {
        let mut card = Card::new(spec(0), &Palette::default());
        card.mount(rect(), RenderMode::HalfBlock);
        let s = card.surface().unwrap();
        assert_eq!((s.width, s.height), (10, 8));
        card.mount(rect(), RenderMode::Braille);
        let s = card.surface().unwrap();
        assert_eq!((s.width, s.height), (20, 16));
    }

    #[test]
    fn hover_fills_then_leave_clears() {
        let palette = Palette::default();
        let mut card = Card::new(spec(5), &palette);
        card.mount(rect(), RenderMode::HalfBlock);
        card.pointer_enter();
        card.tick(0.0);
        card.tick(400.0);
        assert_eq!(card.state(), RevealState::Completing);
        assert!(!card.is_animating());
        let s = card.surface().unwrap();
        assert_eq!(lit(s), 80);
        assert!(s.colors.iter().all(|&c| c == palette.color_for(1)));

        card.pointer_leave();
        assert_eq!(lit(card.surface().unwrap()), 0);
    }

    #[test]
    fn remount_keeps_completed_fill() {
        let mut card = Card::new(spec(0), &Palette::default());
        card.mount(rect(), RenderMode::HalfBlock);
        card.pointer_enter();
        card.tick(0.0);
        card.tick(300.0);
        card.mount(
            Rect {
                width: 20,
                ..rect()
            },
            RenderMode::HalfBlock,
        );
        let s = card.surface().unwrap();
        assert_eq!(lit(s), 18 * 8);
    }

    #[test]
    fn zero_area_card_still_animates() {
        let mut card = Card::new(spec(0), &Palette::default());
        card.mount(
            Rect {
                col: 0,
                row: 0,
                width: 2,
                height: 2,
            },
            RenderMode::HalfBlock,
        );
        card.pointer_enter();
        card.tick(0.0);
        card.tick(300.0);
        assert_eq!(card.state(), RevealState::Completing);
    }
}
