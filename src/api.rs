use crate::types::*;

/// Capability handed to anything that moves through level geometry.
///
/// Implementations must be pure: the same box against the same geometry
/// always yields the same result, and a query never mutates the level.
pub trait ContactQuery {
    /// Classify how the box `(x, y, width, height)` (top-left origin) touches
    /// the geometry.
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult;

    /// Convenience: query with an [`Aabb`].
    fn check_aabb(&self, aabb: Aabb) -> ContactResult {
        self.check_collision(aabb.min.x, aabb.min.y, aabb.size.x, aabb.size.y)
    }

    /// Highest surface top `t` with `from <= t <= to` that a box spanning
    /// `x..x + width` could come to rest on while moving down.
    ///
    /// Lets the resolver sample a fall once per surface instead of walking
    /// it. The default answers [`SurfaceHint::Unknown`], which makes the
    /// resolver step the whole path at `ResolverConfig::descent_stride`.
    fn next_surface(&self, _x: f32, _width: f32, _from: f32, _to: f32) -> SurfaceHint {
        SurfaceHint::Unknown
    }
}

impl<T: ContactQuery + ?Sized> ContactQuery for &T {
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult {
        (**self).check_collision(x, y, width, height)
    }

    fn next_surface(&self, x: f32, width: f32, from: f32, to: f32) -> SurfaceHint {
        (**self).next_surface(x, width, from, to)
    }
}

impl<T: ContactQuery + ?Sized> ContactQuery for std::rc::Rc<T> {
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult {
        (**self).check_collision(x, y, width, height)
    }

    fn next_surface(&self, x: f32, width: f32, from: f32, to: f32) -> SurfaceHint {
        (**self).next_surface(x, width, from, to)
    }
}

impl<T: ContactQuery + ?Sized> ContactQuery for std::sync::Arc<T> {
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult {
        (**self).check_collision(x, y, width, height)
    }

    fn next_surface(&self, x: f32, width: f32, from: f32, to: f32) -> SurfaceHint {
        (**self).next_surface(x, width, from, to)
    }
}

/// Box-versus-single-tile primitives.
pub trait NarrowphaseApi {
    /// Strict interior overlap (shared edges do not count).
    fn overlaps(a: &Aabb, b: &Aabb) -> bool;

    /// Per-axis overlap extents; non-positive on an axis means no overlap there.
    fn overlap_extents(a: &Aabb, b: &Aabb) -> glam::Vec2;

    /// Box bottom lies in `[tile top, tile top + tolerance]` with horizontal overlap.
    fn resting_on(entity: &Aabb, tile: &Aabb, tolerance: f32) -> bool;

    /// Classify one non-empty tile against the box.
    fn classify(entity: &Aabb, tile_rect: &Aabb, tile: Tile, cfg: &ContactConfig) -> TileContact;
}
