use crossterm::style::Color;
use kurbo::BezPath;
use unicode_width::UnicodeWidthChar;

use crate::palette::Rgb;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Unicode braille characters (2x4 per cell = highest resolution)
    Braille,
    /// Half-block characters ▀▄█ (1x2 per cell)
    HalfBlock,
    /// Plain ASCII characters with density mapping
    Ascii,
}

impl RenderMode {
    /// Pixels per terminal cell as (columns, rows).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            RenderMode::Braille => (2, 4),
            RenderMode::HalfBlock => (1, 2),
            RenderMode::Ascii => (1, 1),
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color, monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub underline: bool,
}

impl TextStyle {
    pub const PLAIN: TextStyle = TextStyle {
        bold: false,
        underline: false,
    };
    pub const BOLD: TextStyle = TextStyle {
        bold: true,
        underline: false,
    };
    pub const LINK: TextStyle = TextStyle {
        bold: false,
        underline: true,
    };
}

/// A character drawn over the pixel layer at terminal-cell resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// `'\0'` marks the right half of a wide character.
    pub ch: char,
    pub fg: Rgb,
    pub style: TextStyle,
}

/// A pixel-level canvas that gets rendered to terminal characters.
/// Coordinates are in "sub-cell" pixel space.
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Pixel data: brightness 0.0..=1.0, 0.0 is transparent
    pub pixels: Vec<f64>,
    /// Per-pixel color, used when color mode != Mono
    pub colors: Vec<Rgb>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
    /// Text overlay, one slot per terminal cell. Empty for offscreen layers.
    pub text: Vec<Option<Glyph>>,
    /// Color quantization step (0 = off, 4/8/16 = round RGB to nearest N).
    /// Higher values = fewer unique colors = less output.
    pub color_quant: u8,
    pub(super) fill_color: Rgb,
    pub(super) path: BezPath,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (cw, ch) = render_mode.cell_pixels();
        let mut canvas = Canvas::layer(term_cols * cw, term_rows * ch);
        canvas.render_mode = render_mode;
        canvas.color_mode = color_mode;
        canvas.text = vec![None; term_cols * term_rows];
        canvas
    }

    /// Offscreen pixel buffer with no text overlay, used as a card surface.
    pub fn layer(px_w: usize, px_h: usize) -> Self {
        let size = px_w * px_h;
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![0.0; size],
            colors: vec![(255, 255, 255); size],
            render_mode: RenderMode::HalfBlock,
            color_mode: ColorMode::TrueColor,
            text: Vec::new(),
            color_quant: 0,
            fill_color: (0, 0, 0),
            path: BezPath::new(),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0.0);
        self.colors.fill((255, 255, 255));
        self.text.fill(None);
    }

    /// Set a pixel with color
    #[inline]
    pub fn set_colored(&mut self, x: usize, y: usize, brightness: f64, r: u8, g: u8, b: u8) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.pixels[idx] = brightness;
            self.colors[idx] = (r, g, b);
        }
    }

    #[cfg(test)]
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x] > 0.0
    }

    /// Copy the lit pixels of `src` with its top-left at pixel `(x, y)`.
    /// Parts falling outside this canvas are dropped.
    pub fn blit(&mut self, src: &Canvas, x: isize, y: isize) {
        for sy in 0..src.height {
            let dy = y + sy as isize;
            if dy < 0 || dy >= self.height as isize {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as isize;
                if dx < 0 || dx >= self.width as isize {
                    continue;
                }
                let si = sy * src.width + sx;
                if src.pixels[si] > 0.0 {
                    let di = dy as usize * self.width + dx as usize;
                    self.pixels[di] = src.pixels[si];
                    self.colors[di] = src.colors[si];
                }
            }
        }
    }

    /// Place one character at a terminal cell. Returns the number of cells
    /// it occupies (0 for zero-width or off-canvas characters).
    pub fn put_char(&mut self, col: usize, row: usize, ch: char, fg: Rgb, style: TextStyle) -> usize {
        let (cols, rows) = self.term_size();
        let w = ch.width().unwrap_or(0);
        if w == 0 || row >= rows || col + w > cols {
            return 0;
        }
        let idx = row * cols + col;
        self.text[idx] = Some(Glyph { ch, fg, style });
        if w == 2 {
            self.text[idx + 1] = Some(Glyph { ch: '\0', fg, style });
        }
        w
    }

    /// Write a string starting at a terminal cell, clipped at the right edge.
    /// `col` may be negative; characters left of the canvas are skipped.
    pub fn put_text(&mut self, col: isize, row: isize, s: &str, fg: Rgb, style: TextStyle) {
        if row < 0 {
            return;
        }
        let mut c = col;
        for ch in s.chars() {
            let w = ch.width().unwrap_or(0) as isize;
            if c >= 0 {
                self.put_char(c as usize, row as usize, ch, fg, style);
            }
            c += w;
        }
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        let (cw, ch) = self.render_mode.cell_pixels();
        (self.width / cw, self.height / ch)
    }

    pub(super) fn glyph_at(&self, col: usize, row: usize) -> Option<Glyph> {
        let (cols, _) = self.term_size();
        self.text.get(row * cols + col).copied().flatten()
    }

    /// Average color of the lit pixels under a terminal cell, scaled by brightness.
    pub(super) fn cell_background(&self, col: usize, row: usize) -> Option<Rgb> {
        let (cw, ch) = self.render_mode.cell_pixels();
        let (mut r, mut g, mut b, mut n) = (0.0, 0.0, 0.0, 0.0);
        for y in row * ch..(row + 1) * ch {
            for x in col * cw..(col + 1) * cw {
                if x >= self.width || y >= self.height {
                    continue;
                }
                let idx = y * self.width + x;
                let v = self.pixels[idx].clamp(0.0, 1.0);
                if v > 0.0 {
                    let (pr, pg, pb) = self.colors[idx];
                    r += pr as f64 * v;
                    g += pg as f64 * v;
                    b += pb as f64 * v;
                    n += 1.0;
                }
            }
        }
        // A cell counts as filled only when most of it is covered.
        if n * 2.0 < (cw * ch) as f64 {
            return None;
        }
        Some(((r / n) as u8, (g / n) as u8, (b / n) as u8))
    }

    /// Emit a text glyph, with the pixel fill under it as its background.
    pub(super) fn push_glyph(&self, out: &mut String, glyph: &Glyph, bg: Option<Rgb>) {
        let mut params = vec!["0".to_string()];
        if glyph.style.bold {
            params.push("1".into());
        }
        if glyph.style.underline {
            params.push("4".into());
        }
        if self.color_mode == ColorMode::Mono {
            if bg.is_some() {
                params.push("7".into());
            }
        } else {
            let fg = bg.map(contrast_ink).unwrap_or(glyph.fg);
            params.push(color_to_fg(self.map_color(fg.0, fg.1, fg.2)));
            if let Some((r, g, b)) = bg {
                params.push(color_to_bg(self.map_color(r, g, b)));
            }
        }
        out.push_str("\x1b[");
        out.push_str(&params.join(";"));
        out.push('m');
        out.push(glyph.ch);
        out.push_str("\x1b[0m");
    }

    /// Render the canvas to a string buffer for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::Braille => super::braille::render(self),
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => self.render_ascii(),
        }
    }

    fn render_ascii(&self) -> String {
        const CHARS: &[u8] = b" .:-=+*#%@";
        let (cols, rows) = self.term_size();
        let mut out = String::with_capacity(cols * rows * 10);
        let use_color = self.color_mode != ColorMode::Mono;
        let mut last_fg = String::new();

        for row in 0..rows {
            for col in 0..cols {
                if let Some(glyph) = self.glyph_at(col, row) {
                    if glyph.ch != '\0' {
                        self.push_glyph(&mut out, &glyph, self.cell_background(col, row));
                    }
                    last_fg.clear();
                    continue;
                }
                let idx = row * self.width + col;
                let v = self.pixels[idx].clamp(0.0, 1.0);
                let ci = (v * (CHARS.len() - 1) as f64) as usize;
                let ch = CHARS[ci] as char;

                if use_color && v > 0.0 {
                    let (r, g, b) = self.colors[idx];
                    let fg = color_to_fg(self.map_color(r, g, b));
                    if fg != last_fg {
                        out.push_str("\x1b[");
                        out.push_str(&fg);
                        out.push('m');
                        last_fg = fg;
                    }
                }
                out.push(ch);
            }
            out.push_str("\x1b[0m\x1b[");
            let next_row = row + 2;
            out.push_str(&next_row.to_string());
            out.push_str(";1H");
            last_fg.clear();
        }
        out
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        // Apply color quantization if enabled (reduces unique colors for better dedup)
        let (r, g, b) = if self.color_quant > 1 {
            let q = self.color_quant as u16;
            (
                ((r as u16 + q / 2) / q * q).min(255) as u8,
                ((g as u16 + q / 2) / q * q).min(255) as u8,
                ((b as u16 + q / 2) / q * q).min(255) as u8,
            )
        } else {
            (r, g, b)
        };
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                // Simple mapping to basic colors
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 { Color::Red } else { Color::DarkRed }
                } else if g > r && g > b {
                    if brightness > 180 { Color::Green } else { Color::DarkGreen }
                } else if b > r && b > g {
                    if brightness > 180 { Color::Blue } else { Color::DarkBlue }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

/// Near-black on light fills, near-white on dark ones.
fn contrast_ink(bg: Rgb) -> Rgb {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma > 140.0 { (24, 24, 24) } else { (240, 240, 240) }
}

/// Position in the 16-color table and whether it is the bright half.
fn ansi16(color: Color) -> Option<(u8, bool)> {
    Some(match color {
        Color::Black => (0, false),
        Color::DarkRed => (1, false),
        Color::DarkGreen => (2, false),
        Color::DarkYellow => (3, false),
        Color::DarkBlue => (4, false),
        Color::DarkMagenta => (5, false),
        Color::DarkCyan => (6, false),
        Color::Grey => (7, false),
        Color::DarkGrey => (0, true),
        Color::Red => (1, true),
        Color::Green => (2, true),
        Color::Yellow => (3, true),
        Color::Blue => (4, true),
        Color::Magenta => (5, true),
        Color::Cyan => (6, true),
        Color::White => (7, true),
        _ => return None,
    })
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{r};{g};{b}"),
        Color::AnsiValue(v) => format!("38;5;{v}"),
        c => match ansi16(c) {
            Some((i, false)) => (30 + i).to_string(),
            Some((i, true)) => (90 + i).to_string(),
            None => "37".into(),
        },
    }
}

pub fn color_to_bg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("48;2;{r};{g};{b}"),
        Color::AnsiValue(v) => format!("48;5;{v}"),
        c => match ansi16(c) {
            Some((i, false)) => (40 + i).to_string(),
            Some((i, true)) => (100 + i).to_string(),
            None => "40".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_follows_render_mode() {
        let c = Canvas::new(10, 5, RenderMode::Braille, ColorMode::Mono);
        assert_eq!((c.width, c.height), (20, 20));
        assert_eq!(c.term_size(), (10, 5));
        let c = Canvas::new(10, 5, RenderMode::HalfBlock, ColorMode::Mono);
        assert_eq!((c.width, c.height), (10, 10));
        assert_eq!(c.text.len(), 50);
    }

    #[test]
    fn blit_clips_negative_offsets() {
        let mut dst = Canvas::layer(4, 4);
        let mut src = Canvas::layer(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                src.set_colored(x, y, 1.0, 10, 20, 30);
            }
        }
        dst.blit(&src, -1, 2);
        let lit: Vec<(usize, usize)> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| dst.is_lit(x, y))
            .collect();
        assert_eq!(lit, vec![(0, 2), (1, 2), (0, 3), (1, 3)]);
        assert_eq!(dst.colors[2 * 4], (10, 20, 30));
    }

    #[test]
    fn blit_skips_transparent_pixels() {
        let mut dst = Canvas::layer(2, 1);
        dst.set_colored(0, 0, 1.0, 1, 2, 3);
        let src = Canvas::layer(2, 1);
        dst.blit(&src, 0, 0);
        assert!(dst.is_lit(0, 0));
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut c = Canvas::new(6, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        c.put_text(0, 0, "a👋b", (255, 255, 255), TextStyle::PLAIN);
        assert_eq!(c.glyph_at(0, 0).map(|g| g.ch), Some('a'));
        assert_eq!(c.glyph_at(1, 0).map(|g| g.ch), Some('👋'));
        assert_eq!(c.glyph_at(2, 0).map(|g| g.ch), Some('\0'));
        assert_eq!(c.glyph_at(3, 0).map(|g| g.ch), Some('b'));
    }

    #[test]
    fn text_clips_at_edges() {
        let mut c = Canvas::new(3, 1, RenderMode::Ascii, ColorMode::Mono);
        c.put_text(-2, 0, "abcdef", (255, 255, 255), TextStyle::PLAIN);
        let row: String = (0..3).filter_map(|x| c.glyph_at(x, 0)).map(|g| g.ch).collect();
        assert_eq!(row, "cde");
        c.put_text(0, -1, "zzz", (255, 255, 255), TextStyle::PLAIN);
        c.put_text(0, 5, "zzz", (255, 255, 255), TextStyle::PLAIN);
    }

    #[test]
    fn cell_background_needs_majority_cover() {
        let mut c = Canvas::new(1, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        c.set_colored(0, 1, 1.0, 200, 100, 0);
        assert_eq!(c.cell_background(0, 0), Some((200, 100, 0)));
        let mut c = Canvas::new(1, 1, RenderMode::Braille, ColorMode::TrueColor);
        c.set_colored(0, 0, 1.0, 200, 100, 0);
        assert_eq!(c.cell_background(0, 0), None);
    }

    #[test]
    fn sixteen_color_codes() {
        assert_eq!(color_to_fg(Color::Grey), "37");
        assert_eq!(color_to_fg(Color::DarkGrey), "90");
        assert_eq!(color_to_fg(Color::White), "97");
        assert_eq!(color_to_bg(Color::Black), "40");
        assert_eq!(color_to_bg(Color::Cyan), "106");
        assert_eq!(color_to_fg(Color::Reset), "37");
    }

    #[test]
    fn glyph_styles_map_to_sgr_attributes() {
        let c = Canvas::new(1, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        let glyph = Glyph {
            ch: 'x',
            fg: (1, 2, 3),
            style: TextStyle {
                bold: true,
                underline: true,
            },
        };
        let mut out = String::new();
        c.push_glyph(&mut out, &glyph, None);
        assert_eq!(out, "\x1b[0;1;4;38;2;1;2;3mx\x1b[0m");
    }

    #[test]
    fn glyph_over_fill_uses_contrasting_ink() {
        let c = Canvas::new(1, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        let glyph = Glyph {
            ch: 'x',
            fg: (255, 255, 255),
            style: TextStyle::BOLD,
        };
        let mut out = String::new();
        c.push_glyph(&mut out, &glyph, Some((255, 214, 165)));
        assert_eq!(out, "\x1b[0;1;38;2;24;24;24;48;2;255;214;165mx\x1b[0m");
    }
}
