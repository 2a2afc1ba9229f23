use super::canvas::{Canvas, ColorMode, color_to_bg, color_to_fg};

/// Pixel brightness below which a half-block cell is treated as background (empty).
const DARK_THRESHOLD: f64 = 0.02;

pub fn render(canvas: &Canvas) -> String {
    let term_cols = canvas.width;
    let term_rows = canvas.height / 2;
    let mut out = String::with_capacity(term_cols * term_rows * 10);

    let mut last_fg = String::new();
    let mut last_bg = String::new();
    let mut in_color = false;

    for row in 0..term_rows {
        for col in 0..term_cols {
            if let Some(glyph) = canvas.glyph_at(col, row) {
                if glyph.ch != '\0' {
                    canvas.push_glyph(&mut out, &glyph, canvas.cell_background(col, row));
                }
                in_color = false;
                last_fg.clear();
                last_bg.clear();
                continue;
            }

            let top_idx = row * 2 * canvas.width + col;
            let bot_idx = (row * 2 + 1) * canvas.width + col;

            let top_v = canvas.pixels[top_idx];
            let bot_v = canvas.pixels[bot_idx];

            let top_dark = top_v < DARK_THRESHOLD;
            let bot_dark = bot_v < DARK_THRESHOLD;

            if canvas.color_mode == ColorMode::Mono {
                match (!top_dark, !bot_dark) {
                    (true, true) => out.push('█'),
                    (true, false) => out.push('▀'),
                    (false, true) => out.push('▄'),
                    (false, false) => out.push(' '),
                }
            } else if top_dark && bot_dark {
                if in_color {
                    out.push_str("\x1b[0m");
                    in_color = false;
                    last_fg.clear();
                    last_bg.clear();
                }
                out.push(' ');
            } else {
                let scale = |c: u8, v: f64| -> u8 { (c as f64 * v.clamp(0.0, 1.0)) as u8 };
                let shade = |idx: usize, v: f64| {
                    let (r, g, b) = canvas.colors[idx];
                    canvas.map_color(scale(r, v), scale(g, v), scale(b, v))
                };

                // A lone lit half keeps the terminal background on the other
                // half, so the wipe edge does not show a black band.
                let (ch, fg, bg_s) = match (top_dark, bot_dark) {
                    (false, false) => (
                        '▀',
                        color_to_fg(shade(top_idx, top_v)),
                        color_to_bg(shade(bot_idx, bot_v)),
                    ),
                    (false, true) => ('▀', color_to_fg(shade(top_idx, top_v)), "49".to_string()),
                    _ => ('▄', color_to_fg(shade(bot_idx, bot_v)), "49".to_string()),
                };

                let fg_changed = fg != last_fg;
                let bg_changed = bg_s != last_bg;

                if fg_changed && bg_changed {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push(';');
                    out.push_str(&bg_s);
                    out.push('m');
                } else if fg_changed {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push('m');
                } else if bg_changed {
                    out.push_str("\x1b[");
                    out.push_str(&bg_s);
                    out.push('m');
                }

                if fg_changed {
                    last_fg = fg;
                }
                if bg_changed {
                    last_bg = bg_s;
                }
                in_color = true;

                out.push(ch);
            }
        }
        // Reset at end of row
        if in_color {
            out.push_str("\x1b[0m");
            in_color = false;
            last_fg.clear();
            last_bg.clear();
        }
        // Move to next row
        out.push_str("\x1b[");
        let next_row = row + 2;
        out.push_str(&next_row.to_string());
        out.push_str(";1H");
    }
    out
}
