use rand::RngExt;

use crate::palette::Rgb;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::DrawSurface;

/// Number of samples along the top edge of the fill.
pub const WAVE_POINTS: usize = 12;
/// Time for the fill to go from empty to covering the surface.
pub const REVEAL_DURATION_MS: f64 = 300.0;
/// Range of the per-point rise multiplier.
pub const RATE_RANGE: std::ops::Range<f64> = 0.8..1.2;

/// One sample of the fill's top silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    pub x: f64,
    pub vertical_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Nothing drawn, nothing scheduled.
    Idle,
    /// A frame request is outstanding and the fill is growing.
    Running,
    /// The surface is painted solid and no frame is scheduled.
    Completing,
}

/// Organic bottom-up color wipe for one card surface.
///
/// Each point rises at its own randomized rate so the top edge is ragged,
/// and the edge is smoothed by threading quadratic curves through the
/// midpoints between neighbours. The fill reaches full cover after
/// [`REVEAL_DURATION_MS`] regardless of how irregular frame delivery is,
/// since progress is derived from the frame timestamp and not a frame count.
pub struct HoverReveal<R = rand::rngs::ThreadRng> {
    width: f64,
    height: f64,
    fill: Rgb,
    state: RevealState,
    start_time: Option<f64>,
    points: [WavePoint; WAVE_POINTS],
    frame: Option<FrameHandle>,
    rng: R,
}

impl HoverReveal {
    pub fn new(width: f64, height: f64, fill: Rgb) -> Self {
        Self::with_rng(width, height, fill, rand::rng())
    }
}

impl<R: RngExt> HoverReveal<R> {
    /// Build with an explicit random source, e.g. a seeded one for tests.
    pub fn with_rng(width: f64, height: f64, fill: Rgb, rng: R) -> Self {
        let mut reveal = HoverReveal {
            width: 0.0,
            height: 0.0,
            fill,
            state: RevealState::Idle,
            start_time: None,
            points: [WavePoint {
                x: 0.0,
                vertical_rate: 1.0,
            }; WAVE_POINTS],
            frame: None,
            rng,
        };
        reveal.resize(width, height);
        reveal
    }

    /// Update the surface size and re-spread the points across the new width.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let last = WAVE_POINTS - 1;
        for (i, p) in self.points.iter_mut().enumerate() {
            p.x = match i {
                0 => 0.0,
                i if i == last => self.width,
                i => i as f64 / last as f64 * self.width,
            };
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    #[cfg(test)]
    pub fn points(&self) -> &[WavePoint; WAVE_POINTS] {
        &self.points
    }

    #[cfg(test)]
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn fill_color(&self) -> Rgb {
        self.fill
    }

    #[cfg(test)]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Start the wipe. Re-entering while already running does nothing;
    /// re-entering after completion starts over.
    pub fn pointer_enter(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.state == RevealState::Running {
            return;
        }
        for p in &mut self.points {
            p.vertical_rate = self.rng.random_range(RATE_RANGE);
        }
        self.start_time = None;
        self.state = RevealState::Running;
        self.frame = Some(scheduler.request_frame());
        tracing::trace!(width = self.width, height = self.height, "hover reveal started");
    }

    /// Stop immediately and wipe the surface clean.
    pub fn pointer_leave(
        &mut self,
        surface: &mut impl DrawSurface,
        scheduler: &mut impl FrameScheduler,
    ) {
        if self.state == RevealState::Idle && self.frame.is_none() {
            return;
        }
        if let Some(handle) = self.frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = RevealState::Idle;
        self.start_time = None;
        surface.clear_rect(0.0, 0.0, self.width, self.height);
        tracing::trace!("hover reveal cancelled");
    }

    /// Frame callback. Handles other than the one most recently requested
    /// are stale and ignored.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        surface: &mut impl DrawSurface,
        scheduler: &mut impl FrameScheduler,
    ) {
        if self.frame != Some(handle) {
            return;
        }
        self.frame = None;

        let start = *self.start_time.get_or_insert(timestamp_ms);
        let progress = progress_between(start, timestamp_ms);

        self.draw_wave(surface, progress);

        if progress < 1.0 {
            self.frame = Some(scheduler.request_frame());
        } else {
            // Snap to full cover; curve geometry can leave slivers at the corners.
            surface.fill_rect(0.0, 0.0, self.width, self.height);
            self.state = RevealState::Completing;
            tracing::trace!("hover reveal complete");
        }
    }

    /// Progress at `timestamp_ms`, if the first frame has run.
    #[cfg(test)]
    pub fn progress_at(&self, timestamp_ms: f64) -> Option<f64> {
        self.start_time
            .map(|start| progress_between(start, timestamp_ms))
    }

    /// Height of point `index` from the top at the given progress, never above 0.
    pub fn point_y(&self, index: usize, progress: f64) -> f64 {
        let rate = self.points[index].vertical_rate;
        (self.height - self.height * progress * rate).max(0.0)
    }

    fn draw_wave(&self, surface: &mut impl DrawSurface, progress: f64) {
        let (w, h) = (self.width, self.height);
        let ys: [f64; WAVE_POINTS] = std::array::from_fn(|i| self.point_y(i, progress));
        let last = WAVE_POINTS - 1;

        surface.clear_rect(0.0, 0.0, w, h);
        surface.set_fill_color(self.fill);
        surface.begin_path();
        surface.move_to(0.0, h);
        surface.line_to(self.points[0].x, ys[0]);
        for i in 0..last {
            let (x, y) = (self.points[i].x, ys[i]);
            let (nx, ny) = (self.points[i + 1].x, ys[i + 1]);
            surface.quadratic_curve_to(x, y, (x + nx) / 2.0, (y + ny) / 2.0);
        }
        surface.line_to(self.points[last].x, ys[last]);
        surface.line_to(w, h);
        surface.close_path();
        surface.fill();
    }
}

fn progress_between(start: f64, now: f64) -> f64 {
    ((now - start) / REVEAL_DURATION_MS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FILL: Rgb = (255, 214, 165);

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear(f64, f64, f64, f64),
        Color(Rgb),
        Begin,
        Move(f64, f64),
        Line(f64, f64),
        Quad(f64, f64, f64, f64),
        Close,
        Fill,
        FillRect(f64, f64, f64, f64),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl DrawSurface for Recorder {
        fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.ops.push(Op::Clear(x, y, w, h));
        }
        fn set_fill_color(&mut self, color: Rgb) {
            self.ops.push(Op::Color(color));
        }
        fn begin_path(&mut self) {
            self.ops.push(Op::Begin);
        }
        fn move_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::Move(x, y));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::Line(x, y));
        }
        fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
            self.ops.push(Op::Quad(cx, cy, x, y));
        }
        fn close_path(&mut self) {
            self.ops.push(Op::Close);
        }
        fn fill(&mut self) {
            self.ops.push(Op::Fill);
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.ops.push(Op::FillRect(x, y, w, h));
        }
    }

    fn reveal(w: f64, h: f64) -> HoverReveal<StdRng> {
        HoverReveal::with_rng(w, h, FILL, StdRng::seed_from_u64(42))
    }

    /// Dispatch every due frame at `t`.
    fn tick(anim: &mut HoverReveal<StdRng>, q: &mut FrameQueue, s: &mut Recorder, t: f64) {
        for handle in q.take_due() {
            anim.on_frame(handle, t, s, q);
        }
    }

    #[test]
    fn edge_points_are_pinned() {
        for w in [1.0, 7.5, 200.0, 1234.567] {
            let mut anim = reveal(w, 50.0);
            let mut q = FrameQueue::new();
            for _ in 0..3 {
                anim.pointer_enter(&mut q);
                assert_eq!(anim.points()[0].x, 0.0);
                assert_eq!(anim.points()[WAVE_POINTS - 1].x, w);
                anim.pointer_leave(&mut Recorder::default(), &mut q);
            }
        }
    }

    #[test]
    fn points_are_evenly_spread() {
        let anim = reveal(110.0, 10.0);
        for (i, p) in anim.points().iter().enumerate() {
            assert!((p.x - i as f64 * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rates_are_drawn_from_range() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        anim.pointer_enter(&mut q);
        for p in anim.points() {
            assert!(RATE_RANGE.contains(&p.vertical_rate), "{}", p.vertical_rate);
        }
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 1000.0);

        let mut last = 0.0;
        for step in 0..60 {
            let t = 1000.0 + step as f64 * 7.3;
            let p = anim.progress_at(t).unwrap();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 1.0);
        assert_eq!(anim.progress_at(990.0), Some(0.0));
    }

    #[test]
    fn halfway_heights_follow_rates() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        tick(&mut anim, &mut q, &mut s, 150.0);

        let progress = anim.progress_at(150.0).unwrap();
        assert!((progress - 0.5).abs() < 1e-12);
        for i in 0..WAVE_POINTS {
            let rate = anim.points()[i].vertical_rate;
            let expected = (100.0 - 100.0 * 0.5 * rate).max(0.0);
            assert!((anim.point_y(i, progress) - expected).abs() < 1e-9);
        }

        // The last frame drew the curve through those heights.
        let quads: Vec<_> = s
            .ops
            .iter()
            .rev()
            .take_while(|op| **op != Op::Begin)
            .filter(|op| matches!(op, Op::Quad(..)))
            .collect();
        assert_eq!(quads.len(), WAVE_POINTS - 1);
        if let Op::Quad(cx, cy, _, _) = quads[quads.len() - 1] {
            assert_eq!(*cx, 0.0);
            assert!((cy - anim.point_y(0, 0.5)).abs() < 1e-9);
        }
    }

    #[test]
    fn heights_clamp_at_top_edge() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        anim.pointer_enter(&mut q);
        for i in 0..WAVE_POINTS {
            assert!(anim.point_y(i, 0.95) >= 0.0);
            assert_eq!(anim.point_y(i, 1.0), (100.0 - 100.0 * anim.points()[i].vertical_rate).max(0.0));
        }
    }

    #[test]
    fn first_frame_draws_closed_wave() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 5.0);

        assert_eq!(anim.start_time(), Some(5.0));
        assert_eq!(s.ops[0], Op::Clear(0.0, 0.0, 200.0, 100.0));
        assert_eq!(s.ops[1], Op::Color(FILL));
        assert_eq!(s.ops[2], Op::Begin);
        assert_eq!(s.ops[3], Op::Move(0.0, 100.0));
        assert_eq!(s.ops[4], Op::Line(0.0, 100.0));
        let tail = &s.ops[s.ops.len() - 4..];
        assert_eq!(
            tail,
            &[Op::Line(200.0, 100.0), Op::Line(200.0, 100.0), Op::Close, Op::Fill]
        );
        assert_eq!(q.pending_len(), 1);
    }

    #[test]
    fn completes_solid_and_stops_scheduling() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);

        let mut t = 0.0;
        while !q.is_idle() {
            tick(&mut anim, &mut q, &mut s, t);
            t += 16.0;
            assert!(t < 1000.0, "animation never finished");
        }

        assert_eq!(anim.state(), RevealState::Completing);
        assert_eq!(s.ops.last(), Some(&Op::FillRect(0.0, 0.0, 200.0, 100.0)));
        assert!(t > REVEAL_DURATION_MS);
    }

    #[test]
    fn late_single_frame_still_completes() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        tick(&mut anim, &mut q, &mut s, 5000.0);
        assert_eq!(anim.state(), RevealState::Completing);
        assert!(q.is_idle());
    }

    #[test]
    fn reenter_while_running_keeps_state() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 10.0);

        let rates: Vec<f64> = anim.points().iter().map(|p| p.vertical_rate).collect();
        anim.pointer_enter(&mut q);
        anim.pointer_enter(&mut q);

        let after: Vec<f64> = anim.points().iter().map(|p| p.vertical_rate).collect();
        assert_eq!(rates, after);
        assert_eq!(anim.start_time(), Some(10.0));
        assert_eq!(q.pending_len(), 1);
    }

    #[test]
    fn double_enter_before_first_frame_schedules_once() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        anim.pointer_enter(&mut q);
        anim.pointer_enter(&mut q);
        assert_eq!(q.pending_len(), 1);
        assert_eq!(anim.start_time(), None);
    }

    #[test]
    fn leave_clears_and_silences_stale_frames() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        for t in [0.0, 16.0, 33.0, 50.0, 66.0, 83.0] {
            tick(&mut anim, &mut q, &mut s, t);
        }
        let stale = q.take_due();
        assert_eq!(stale.len(), 1);

        anim.pointer_leave(&mut s, &mut q);
        assert_eq!(s.ops.last(), Some(&Op::Clear(0.0, 0.0, 200.0, 100.0)));
        assert_eq!(anim.state(), RevealState::Idle);
        assert!(q.is_idle());

        let before = s.ops.len();
        anim.on_frame(stale[0], 116.0, &mut s, &mut q);
        assert_eq!(s.ops.len(), before);
        assert!(q.is_idle());
    }

    #[test]
    fn leave_cancels_pending_request() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        anim.pointer_leave(&mut s, &mut q);
        assert!(q.is_idle());
    }

    #[test]
    fn leave_when_idle_is_noop() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_leave(&mut s, &mut q);
        assert!(s.ops.is_empty());
    }

    #[test]
    fn leave_after_completion_clears() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        tick(&mut anim, &mut q, &mut s, 400.0);
        anim.pointer_leave(&mut s, &mut q);
        assert_eq!(anim.state(), RevealState::Idle);
        assert_eq!(s.ops.last(), Some(&Op::Clear(0.0, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn rapid_enter_leave_enter_keeps_one_loop() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        anim.pointer_leave(&mut s, &mut q);
        anim.pointer_enter(&mut q);
        anim.pointer_leave(&mut s, &mut q);
        anim.pointer_enter(&mut q);
        assert_eq!(q.pending_len(), 1);

        tick(&mut anim, &mut q, &mut s, 50.0);
        assert_eq!(anim.start_time(), Some(50.0));
        assert_eq!(q.pending_len(), 1);
    }

    #[test]
    fn enter_after_completion_restarts_with_fresh_rates() {
        let mut anim = reveal(200.0, 100.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        tick(&mut anim, &mut q, &mut s, 300.0);
        assert_eq!(anim.state(), RevealState::Completing);

        let rates: Vec<f64> = anim.points().iter().map(|p| p.vertical_rate).collect();
        anim.pointer_enter(&mut q);
        assert_eq!(anim.state(), RevealState::Running);
        assert_eq!(anim.start_time(), None);
        let fresh: Vec<f64> = anim.points().iter().map(|p| p.vertical_rate).collect();
        assert_ne!(rates, fresh);
    }

    #[test]
    fn zero_area_surface_runs_without_error() {
        let mut anim = reveal(0.0, 0.0);
        let mut q = FrameQueue::new();
        let mut s = Recorder::default();
        anim.pointer_enter(&mut q);
        tick(&mut anim, &mut q, &mut s, 0.0);
        tick(&mut anim, &mut q, &mut s, 300.0);
        assert_eq!(anim.state(), RevealState::Completing);
        assert_eq!(s.ops.last(), Some(&Op::FillRect(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn resize_respreads_points() {
        let mut anim = reveal(200.0, 100.0);
        anim.resize(50.0, 20.0);
        assert_eq!(anim.size(), (50.0, 20.0));
        assert_eq!(anim.points()[WAVE_POINTS - 1].x, 50.0);
        assert!((anim.points()[1].x - 50.0 / 11.0).abs() < 1e-12);
    }
}
