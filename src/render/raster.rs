//! Path filling for [`Canvas`], so a pixel layer can act as a card's
//! [`DrawSurface`].
//!
//! Paths are accumulated as a `kurbo::BezPath`, flattened to polygons and
//! filled with an even-odd scanline pass sampled at pixel centers.

use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez};

use super::canvas::Canvas;
use crate::palette::Rgb;
use crate::surface::DrawSurface;

/// Line segments per flattened curve. Card surfaces are a few dozen pixels
/// across, so this is well below a pixel of error.
const CURVE_STEPS: usize = 8;

impl DrawSurface for Canvas {
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (xs, ys) = (covered(x, x + w, self.width), covered(y, y + h, self.height));
        for py in ys {
            for px in xs.clone() {
                let idx = py * self.width + px;
                self.pixels[idx] = 0.0;
                self.colors[idx] = (255, 255, 255);
            }
        }
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((x, y));
        } else {
            self.path.line_to((x, y));
        }
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((cx, cy));
        }
        self.path.quad_to((cx, cy), (x, y));
    }

    fn close_path(&mut self) {
        if !self.path.elements().is_empty() {
            self.path.close_path();
        }
    }

    fn fill(&mut self) {
        let polygons = flatten(&self.path);
        let (r, g, b) = self.fill_color;
        for py in 0..self.height {
            let sy = py as f64 + 0.5;
            let mut crossings = scanline_crossings(&polygons, sy);
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                for px in covered(span[0], span[1], self.width) {
                    self.set_colored(px, py, 1.0, r, g, b);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (xs, ys) = (covered(x, x + w, self.width), covered(y, y + h, self.height));
        let (r, g, b) = self.fill_color;
        for py in ys {
            for px in xs.clone() {
                self.set_colored(px, py, 1.0, r, g, b);
            }
        }
    }
}

/// Pixel indices whose centers fall in `[from, to)`, clamped to `0..limit`.
fn covered(from: f64, to: f64, limit: usize) -> std::ops::Range<usize> {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    let start = (lo - 0.5).ceil().clamp(0.0, limit as f64) as usize;
    let end = (hi - 0.5).ceil().clamp(0.0, limit as f64) as usize;
    start..end.max(start)
}

/// Flatten a path into closed polygons. Open subpaths are closed implicitly.
fn flatten(path: &BezPath) -> Vec<Vec<Point>> {
    let mut polygons = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if current.len() > 2 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathEl::LineTo(p) => current.push(p),
            PathEl::QuadTo(p1, p2) => {
                let p0 = current.last().copied().unwrap_or(p1);
                let quad = QuadBez::new(p0, p1, p2);
                current.extend((1..=CURVE_STEPS).map(|i| quad.eval(i as f64 / CURVE_STEPS as f64)));
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let p0 = current.last().copied().unwrap_or(p1);
                let cubic = CubicBez::new(p0, p1, p2, p3);
                current.extend((1..=CURVE_STEPS).map(|i| cubic.eval(i as f64 / CURVE_STEPS as f64)));
            }
            PathEl::ClosePath => {
                if current.len() > 2 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 2 {
        polygons.push(current);
    }
    polygons
}

/// X positions where the horizontal line at `y` crosses polygon edges.
fn scanline_crossings(polygons: &[Vec<Point>], y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for poly in polygons {
        for (i, a) in poly.iter().enumerate() {
            let b = poly[(i + 1) % poly.len()];
            // Half-open so a vertex shared by two edges is counted once.
            if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
                xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
    }
    xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::HoverReveal;
    use crate::scheduler::FrameQueue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FILL: Rgb = (155, 246, 255);

    fn lit_rows(c: &Canvas) -> Vec<usize> {
        (0..c.height)
            .map(|y| (0..c.width).filter(|&x| c.is_lit(x, y)).count())
            .collect()
    }

    #[test]
    fn fill_rect_covers_pixel_centers() {
        let mut c = Canvas::layer(4, 4);
        c.set_fill_color(FILL);
        c.fill_rect(0.6, 0.0, 2.0, 1.4);
        assert_eq!(lit_rows(&c), vec![2, 0, 0, 0]);
        assert!(c.is_lit(1, 0) && c.is_lit(2, 0));
        assert_eq!(c.colors[1], FILL);
    }

    #[test]
    fn fill_rect_clamps_to_canvas() {
        let mut c = Canvas::layer(3, 2);
        c.set_fill_color(FILL);
        c.fill_rect(-10.0, -10.0, 100.0, 100.0);
        assert_eq!(lit_rows(&c), vec![3, 3]);
        c.clear_rect(-1.0, 1.0, 10.0, 10.0);
        assert_eq!(lit_rows(&c), vec![3, 0]);
    }

    #[test]
    fn fills_triangle() {
        let mut c = Canvas::layer(8, 8);
        c.set_fill_color(FILL);
        c.begin_path();
        c.move_to(0.0, 8.0);
        c.line_to(4.0, 0.0);
        c.line_to(8.0, 8.0);
        c.close_path();
        c.fill();
        let rows = lit_rows(&c);
        assert!(rows[0] < rows[7]);
        assert_eq!(rows[7], 8);
        for pair in rows.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn begin_path_discards_previous_shape() {
        let mut c = Canvas::layer(4, 4);
        c.set_fill_color(FILL);
        c.begin_path();
        c.move_to(0.0, 0.0);
        c.line_to(4.0, 0.0);
        c.line_to(4.0, 4.0);
        c.begin_path();
        c.fill();
        assert_eq!(lit_rows(&c), vec![0, 0, 0, 0]);
    }

    #[test]
    fn quadratic_curve_bulges_toward_control() {
        let mut c = Canvas::layer(10, 10);
        c.set_fill_color(FILL);
        c.begin_path();
        c.move_to(0.0, 10.0);
        c.quadratic_curve_to(5.0, -10.0, 10.0, 10.0);
        c.close_path();
        c.fill();
        // Apex of the curve is at y = 0.
        assert!(c.is_lit(5, 0));
        assert!(!c.is_lit(0, 0));
    }

    fn drive(anim: &mut HoverReveal<StdRng>, q: &mut FrameQueue, c: &mut Canvas, t: f64) {
        for h in q.take_due() {
            anim.on_frame(h, t, c, q);
        }
    }

    #[test]
    fn wipe_covers_whole_layer_when_done() {
        let mut c = Canvas::layer(20, 10);
        let mut anim = HoverReveal::with_rng(20.0, 10.0, FILL, StdRng::seed_from_u64(3));
        let mut q = FrameQueue::new();
        anim.pointer_enter(&mut q);
        drive(&mut anim, &mut q, &mut c, 0.0);
        drive(&mut anim, &mut q, &mut c, 310.0);
        assert_eq!(lit_rows(&c), vec![20; 10]);
        assert!(c.colors.iter().all(|&col| col == FILL));
    }

    #[test]
    fn wipe_grows_from_bottom() {
        let mut c = Canvas::layer(20, 10);
        let mut anim = HoverReveal::with_rng(20.0, 10.0, FILL, StdRng::seed_from_u64(9));
        let mut q = FrameQueue::new();
        anim.pointer_enter(&mut q);
        drive(&mut anim, &mut q, &mut c, 0.0);
        assert_eq!(lit_rows(&c), vec![0; 10]);

        drive(&mut anim, &mut q, &mut c, 150.0);
        let rows = lit_rows(&c);
        // Every point is at least 40% down at half progress.
        assert_eq!(&rows[..4], &[0, 0, 0, 0]);
        assert_eq!(rows[9], 20);

        anim.pointer_leave(&mut c, &mut q);
        assert_eq!(lit_rows(&c), vec![0; 10]);
    }

    #[test]
    fn zero_sized_layer_is_harmless() {
        let mut c = Canvas::layer(0, 0);
        c.set_fill_color(FILL);
        c.fill_rect(0.0, 0.0, 10.0, 10.0);
        c.begin_path();
        c.move_to(0.0, 0.0);
        c.line_to(5.0, 5.0);
        c.line_to(0.0, 5.0);
        c.fill();
        c.clear_rect(0.0, 0.0, 1.0, 1.0);
        assert!(c.pixels.is_empty());
    }
}
