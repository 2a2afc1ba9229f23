use crate::palette::Rgb;

/// 2D drawing target for card animations.
///
/// Mirrors the subset of an immediate-mode canvas context the hover effect
/// needs. Coordinates are in surface pixels with the origin at the top-left.
pub trait DrawSurface {
    /// Reset the rectangle to fully transparent.
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn set_fill_color(&mut self, color: Rgb);

    /// Discard the current path.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Quadratic Bézier from the current point through control `(cx, cy)` to `(x, y)`.
    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);

    fn close_path(&mut self);

    /// Fill the current path with the fill color.
    fn fill(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
}
