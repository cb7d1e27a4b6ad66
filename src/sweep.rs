use glam::Vec2;
use tracing::{trace, warn};

use crate::api::ContactQuery;
use crate::error::ConfigError;
use crate::types::*;

/// Smallest step past a surface whose ground band has no depth.
const MIN_ADVANCE: f32 = 1.0e-3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Heading {
    Horizontal,
    Up,
    Down,
}

impl Heading {
    fn of(axis: Axis, delta: f32) -> Self {
        match axis {
            Axis::X => Heading::Horizontal,
            Axis::Y if delta < 0.0 => Heading::Up,
            Axis::Y => Heading::Down,
        }
    }
}

/// Contact samples along one axis of one move. The contact at the start
/// position is only fetched when a sample needs it.
struct Sampler<'a, Q: ?Sized> {
    query: &'a Q,
    aabb: Aabb,
    axis: Axis,
    heading: Heading,
    start: Option<ContactResult>,
    queries: u32,
}

impl<Q: ContactQuery + ?Sized> Sampler<'_, Q> {
    fn contact(&mut self, at: f32) -> ContactResult {
        self.queries += 1;
        self.query.check_aabb(self.aabb.with_axis(self.axis, at))
    }

    fn start(&mut self) -> ContactResult {
        match self.start {
            Some(r) => r,
            None => {
                let r = self.contact(self.axis.of(self.aabb.min));
                self.start = Some(r);
                r
            }
        }
    }

    /// A hit along the heading, or a hit on the other axis that the start
    /// position did not have. Entering a tile corner can classify as either
    /// axis depending on which overlap is larger, and both stop the move.
    fn blocks(&mut self, r: &ContactResult) -> bool {
        match self.heading {
            Heading::Horizontal => r.collision_x || (r.collision_y && !self.start().collision_y),
            Heading::Up => r.collision_y || (r.collision_x && !self.start().collision_x),
            // Ground counts when descending so one-way tops and the ground
            // band stop a fall.
            Heading::Down => r.collision_y || r.on_ground || (r.collision_x && !self.start().collision_x),
        }
    }

    fn blocked(&mut self, at: f32) -> bool {
        let r = self.contact(at);
        self.blocks(&r)
    }
}

/// Stateless swept mover: finds the furthest clear position along one axis
/// by sampling the path and bisecting the first blocked stretch.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SweptResolver {
    pub cfg: ResolverConfig,
}

impl SweptResolver {
    pub fn new(cfg: ResolverConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Move `aabb` by `delta`, X first at the starting Y, then Y at the
    /// corrected X. Zero components are skipped entirely.
    pub fn resolve<Q: ContactQuery + ?Sized>(&self, query: &Q, aabb: Aabb, delta: Vec2) -> SweepOutcome {
        let mut current = aabb;
        let mut outcome = SweepOutcome { position: aabb.min, x: None, y: None };

        if delta.x != 0.0 {
            let mv = self.resolve_axis(query, current, delta.x, Axis::X);
            current = current.with_axis(Axis::X, mv.position);
            outcome.x = Some(mv);
        }
        if delta.y != 0.0 {
            let mv = self.resolve_axis(query, current, delta.y, Axis::Y);
            current = current.with_axis(Axis::Y, mv.position);
            outcome.y = Some(mv);
        }
        outcome.position = current.min;
        outcome
    }

    /// Resolve a single axis. The other coordinate of `aabb` stays fixed.
    pub fn resolve_axis<Q: ContactQuery + ?Sized>(&self, query: &Q, aabb: Aabb, delta: f32, axis: Axis) -> AxisMove {
        let start = axis.of(aabb.min);
        let mut mv = AxisMove { position: start, ..Default::default() };
        if delta == 0.0 {
            return mv;
        }

        let heading = Heading::of(axis, delta);
        let mut sampler = Sampler { query, aabb, axis, heading, start: None, queries: 0 };
        let target = start + delta;
        // Box-extent strides: a tile cannot fit between two samples.
        let (mut clear, hit) = match heading {
            Heading::Horizontal => self.scan(&mut sampler, start, target, aabb.size.x),
            Heading::Up => self.scan(&mut sampler, start, target, aabb.size.y),
            Heading::Down => self.descend(&mut sampler, start, target),
        };
        let Some(mut hit) = hit else {
            mv.position = target;
            mv.queries = sampler.queries;
            return mv;
        };

        let (tolerance, max_iterations) = match axis {
            Axis::X => (self.cfg.tolerance_x, self.cfg.max_iterations_x),
            Axis::Y => (self.cfg.tolerance_y, self.cfg.max_iterations_y),
        };
        while (hit - clear).abs() >= tolerance && mv.iterations < max_iterations {
            let mid = (clear + hit) * 0.5;
            if sampler.blocked(mid) {
                hit = mid;
            } else {
                clear = mid;
            }
            mv.iterations += 1;
        }
        if (hit - clear).abs() >= tolerance {
            warn!(?axis, clear, hit, iterations = mv.iterations, "bisection hit iteration cap");
        }

        mv.blocked = true;
        mv.position = clear;
        if heading == Heading::Down {
            (mv.position, mv.grounded) = self.settle(&mut sampler, clear);
        }
        mv.queries = sampler.queries;
        trace!(?axis, ?heading, start, delta, position = mv.position, queries = mv.queries, iterations = mv.iterations, "axis blocked");
        mv
    }

    /// Sample `from..=to` at most `stride` apart. Returns the last clear
    /// sample and the first blocked one.
    fn scan<Q: ContactQuery + ?Sized>(&self, sampler: &mut Sampler<'_, Q>, from: f32, to: f32, stride: f32) -> (f32, Option<f32>) {
        let distance = (to - from).abs();
        let samples = if stride > 0.0 && distance > stride {
            ((distance / stride).ceil() as u32).clamp(1, self.cfg.max_samples)
        } else {
            1
        };

        let mut clear = from;
        for k in 1..=samples {
            let at = if k == samples { to } else { from + (to - from) * (k as f32 / samples as f32) };
            if sampler.blocked(at) {
                return (clear, Some(at));
            }
            clear = at;
        }
        (clear, None)
    }

    /// Downward path: one sample per surface top the geometry reports under
    /// the box, taken inside that surface's ground band, so a fall through
    /// open space costs a single query. After the box reaches a surface,
    /// samples are at most a box height apart so it cannot pass through the
    /// tile under that surface.
    fn descend<Q: ContactQuery + ?Sized>(&self, sampler: &mut Sampler<'_, Q>, start: f32, target: f32) -> (f32, Option<f32>) {
        let aabb = sampler.aabb;
        let height = aabb.size.y;
        let fallback_stride = height.min(self.cfg.descent_stride);

        let mut clear = start;
        let mut search = start;
        let mut entered = false;
        for _ in 0..self.cfg.max_samples {
            let (next, past) = match sampler.query.next_surface(aabb.min.x, aabb.size.x, search, target + height) {
                SurfaceHint::Unknown => return self.scan(sampler, clear, target, fallback_stride),
                SurfaceHint::Clear => (target, None),
                SurfaceHint::At { top, band } => {
                    let past = top + band.max(MIN_ADVANCE);
                    let mid_band = top - height + band * 0.5;
                    if mid_band <= clear {
                        // Already at or below this surface.
                        entered = true;
                        search = past;
                        continue;
                    }
                    (mid_band.min(target), Some(past))
                }
            };

            let capped = entered && height > 0.0 && next > clear + height;
            let at = if capped { clear + height } else { next };
            if sampler.blocked(at) {
                return (clear, Some(at));
            }
            clear = at;
            if clear >= target {
                return (target, None);
            }
            if let Some(past) = past.filter(|_| !capped) {
                entered = true;
                search = past;
            }
        }
        warn!(start, target, clear, "descent ran out of samples");
        self.scan(sampler, clear, target, fallback_stride)
    }

    /// Scan forward from the last clear Y in small steps to latch ground
    /// contact and pick the exact resting height.
    fn settle<Q: ContactQuery + ?Sized>(&self, sampler: &mut Sampler<'_, Q>, clear: f32) -> (f32, bool) {
        let mut last_clear = clear;
        for i in 0..=self.cfg.settle_steps {
            let y = clear + i as f32 * self.cfg.settle_step;
            let r = sampler.contact(y);
            if r.on_ground {
                return (y, true);
            }
            if sampler.blocks(&r) {
                return (last_clear, false);
            }
            last_clear = y;
        }
        (clear, false)
    }
}
