use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kind of a single grid cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    /// Solid and climbable (ladders, chain-link walls).
    Climbable,
    /// Spikes, lava. Never blocks.
    Hazardous,
    /// Blocks only from directly above.
    OneWayPlatform,
}

impl Tile {
    /// Whether the tile stops a box in some direction.
    pub fn blocks_movement(self) -> bool {
        matches!(self, Tile::Solid | Tile::Climbable | Tile::OneWayPlatform)
    }

    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Climbable)
    }

    pub fn is_hazardous(self) -> bool {
        matches!(self, Tile::Hazardous)
    }

    pub fn is_one_way(self) -> bool {
        matches!(self, Tile::OneWayPlatform)
    }

    /// Glyph used by the ASCII level format.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Solid => '#',
            Tile::Climbable => 'H',
            Tile::Hazardous => '^',
            Tile::OneWayPlatform => '=',
        }
    }

    pub fn from_glyph(c: char) -> Option<Tile> {
        match c {
            '.' | ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Solid),
            'H' => Some(Tile::Climbable),
            '^' => Some(Tile::Hazardous),
            '=' => Some(Tile::OneWayPlatform),
            _ => None,
        }
    }
}

/// Axis-aligned box, top-left origin, y grows downward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    /// Width/height; never negative.
    pub size: Vec2,
}

impl Aabb {
    /// Negative extents are clamped to zero.
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size: size.max(Vec2::ZERO) }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Same box with one coordinate replaced.
    pub fn with_axis(mut self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::X => self.min.x = value,
            Axis::Y => self.min.y = value,
        }
        self
    }
}

/// Resolution axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }
}

/// Outcome of one contact query. Built fresh per query.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContactResult {
    /// Any non-empty tile overlapped or rested on.
    pub collided: bool,
    pub collision_x: bool,
    pub collision_y: bool,
    /// Largest horizontal overlap among wall hits (informational).
    pub penetration_x: f32,
    /// Largest vertical overlap among vertical hits (informational).
    pub penetration_y: f32,
    pub on_ground: bool,
    pub touching_wall: bool,
    pub climbable: bool,
    pub hazardous: bool,
    /// Resting on a one-way platform from above.
    pub one_way: bool,
    /// Horizontal extent of the box backed by tiles it rests on.
    pub ground_support: f32,
}

impl ContactResult {
    /// Fold one tile's classification into the running result.
    pub fn absorb(&mut self, tile: Tile, c: &TileContact) {
        if !c.touching {
            return;
        }
        self.collided = true;
        if c.resting {
            self.ground_support += c.overlap.x.max(0.0);
            if tile.is_one_way() {
                self.one_way = true;
            }
        }
        if c.wall {
            self.collision_x = true;
            self.touching_wall = true;
            self.penetration_x = self.penetration_x.max(c.overlap.x);
        }
        if c.vertical {
            self.collision_y = true;
            self.penetration_y = self.penetration_y.max(c.overlap.y);
        }
        if tile.is_climbable() {
            self.climbable = true;
        }
        if tile.is_hazardous() {
            self.hazardous = true;
        }
    }

    /// Decide `on_ground` once every tile has been absorbed.
    pub fn finish(mut self, box_width: f32, cfg: &ContactConfig) -> Self {
        self.on_ground = self.ground_support > 0.0
            && self.ground_support >= box_width * cfg.min_support_fraction;
        self
    }
}

/// Per-tile classification produced by the narrowphase.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TileContact {
    /// Signed overlap extents (≤ 0 on an axis means separated or touching).
    pub overlap: Vec2,
    /// Overlapping the tile or resting on its top edge.
    pub touching: bool,
    /// Box bottom inside the ground band of this tile, with horizontal overlap.
    pub resting: bool,
    pub wall: bool,
    pub vertical: bool,
}

/// Tunables of the contact query.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Depth below a tile's top edge still counted as resting on it.
    pub ground_tolerance: f32,
    /// Overlap that must be exceeded before a side or vertical hit registers.
    pub wall_min_overlap: f32,
    /// Share of box width a resting box must overlap a tile before it is a wall.
    pub grounded_wall_fraction: f32,
    /// Box center must lie this close to a tile edge for the grounded wall rule.
    pub grounded_wall_edge_margin: f32,
    /// Share of box width that must be supported for `on_ground`.
    pub min_support_fraction: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            ground_tolerance: 2.0,
            wall_min_overlap: 2.0,
            grounded_wall_fraction: 0.75,
            grounded_wall_edge_margin: 4.0,
            min_support_fraction: 0.5,
        }
    }
}

impl ContactConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("ground_tolerance", self.ground_tolerance)?;
        non_negative("wall_min_overlap", self.wall_min_overlap)?;
        non_negative("grounded_wall_edge_margin", self.grounded_wall_edge_margin)?;
        fraction("grounded_wall_fraction", self.grounded_wall_fraction)?;
        fraction("min_support_fraction", self.min_support_fraction)
    }
}

/// Tunables of the swept axis resolver.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Bisection bracket width at which horizontal search stops.
    pub tolerance_x: f32,
    /// Coarser on Y so the search does not chase the ground band.
    pub tolerance_y: f32,
    pub max_iterations_x: u32,
    pub max_iterations_y: u32,
    /// Forward scan after a downward search: step length and count.
    pub settle_step: f32,
    pub settle_steps: u32,
    /// Downward sample spacing over geometry that cannot report its surface
    /// tops (see [`ContactQuery::next_surface`](crate::api::ContactQuery::next_surface)).
    /// Must not exceed the query's ground tolerance; see [`ResolverConfig::validate_for`].
    pub descent_stride: f32,
    /// Upper bound on path samples per axis before bisection.
    pub max_samples: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tolerance_x: 0.01,
            tolerance_y: 0.1,
            max_iterations_x: 50,
            max_iterations_y: 30,
            settle_step: 0.1,
            settle_steps: 10,
            descent_stride: 2.0,
            max_samples: 1024,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tolerance_x", self.tolerance_x)?;
        positive("tolerance_y", self.tolerance_y)?;
        positive("settle_step", self.settle_step)?;
        positive("descent_stride", self.descent_stride)?;
        if self.max_samples == 0 {
            return Err(ConfigError::Zero { field: "max_samples" });
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the checks that tie the resolver to
    /// the contact tunables of the geometry it will move through.
    pub fn validate_for(&self, contact: &ContactConfig) -> Result<(), ConfigError> {
        self.validate()?;
        contact.validate()?;
        if self.descent_stride > contact.ground_tolerance {
            return Err(ConfigError::Exceeds {
                field: "descent_stride",
                value: self.descent_stride,
                limit: "ground_tolerance",
                max: contact.ground_tolerance,
            });
        }
        Ok(())
    }
}

/// Physics constants of a player-controlled box.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Box width/height.
    pub size: Vec2,
    /// Horizontal speed set by move commands (units/s).
    pub speed: f32,
    /// Upward launch speed of a jump (units/s).
    pub jump_speed: f32,
    /// Downward acceleration (units/s²).
    pub gravity: f32,
    /// Per-tick multiplier on horizontal velocity.
    pub friction: f32,
    /// Vertical speed while climbing (units/s).
    pub climb_speed: f32,
    /// Damage immunity window (s).
    pub damage_time: f32,
    /// Jump grace window after walking off a ledge (s).
    pub coyote_time: f32,
    /// |vx| above which the box counts as moving.
    pub moving_threshold: f32,
    /// Ground hold-over applies only below these speeds.
    pub hysteresis_max_vx: f32,
    pub hysteresis_max_vy: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            size: Vec2::splat(32.0),
            speed: 120.0,
            jump_speed: 200.0,
            gravity: 500.0,
            friction: 0.8,
            climb_speed: 84.0,
            damage_time: 1.0,
            coyote_time: 0.1,
            moving_threshold: 10.0,
            hysteresis_max_vx: 5.0,
            hysteresis_max_vy: 0.5,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("size.x", self.size.x)?;
        non_negative("size.y", self.size.y)?;
        non_negative("speed", self.speed)?;
        non_negative("jump_speed", self.jump_speed)?;
        non_negative("gravity", self.gravity)?;
        fraction("friction", self.friction)?;
        non_negative("climb_speed", self.climb_speed)?;
        non_negative("damage_time", self.damage_time)?;
        non_negative("coyote_time", self.coyote_time)?;
        non_negative("moving_threshold", self.moving_threshold)?;
        non_negative("hysteresis_max_vx", self.hysteresis_max_vx)?;
        non_negative("hysteresis_max_vy", self.hysteresis_max_vy)
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if value == 0.0 {
        return Err(ConfigError::Zero { field });
    }
    Ok(())
}

fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if value > 1.0 {
        return Err(ConfigError::OutOfRange { field, value, min: 0.0, max: 1.0 });
    }
    Ok(())
}

/// What lies under a descending box, as far as the geometry can tell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SurfaceHint {
    /// No tile top in the searched range.
    Clear,
    /// Highest tile top in range, with the depth of its ground band.
    At { top: f32, band: f32 },
    /// The geometry cannot answer; the path has to be walked.
    Unknown,
}

/// Result of resolving one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AxisMove {
    /// Final coordinate on the resolved axis.
    pub position: f32,
    /// Requested displacement was cut short; callers zero that velocity component.
    pub blocked: bool,
    /// Downward move ended resting on ground.
    pub grounded: bool,
    /// Contact queries spent on this axis.
    pub queries: u32,
    /// Bisection iterations spent on this axis.
    pub iterations: u32,
}

/// Both axes of a swept move (X resolved first, Y at the corrected X).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SweepOutcome {
    pub position: Vec2,
    /// `None` when the axis had zero displacement.
    pub x: Option<AxisMove>,
    pub y: Option<AxisMove>,
}

/// Cost of the last simulation tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Contact queries, including the final refresh query.
    pub queries: u32,
    pub iterations: u32,
}

/// Externally visible movement state, highest priority first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MotionPhase {
    Damaged,
    Climbing,
    Ascending,
    Descending,
    Moving,
    Idle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: MotionConfig = serde_json::from_str(r#"{"speed": 150.0, "size": [16.0, 24.0]}"#).unwrap();
        assert_eq!(cfg.speed, 150.0);
        assert_eq!(cfg.size, Vec2::new(16.0, 24.0));
        assert_eq!(cfg.gravity, MotionConfig::default().gravity);
        assert!(cfg.validate().is_ok());

        let r: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(r, ResolverConfig::default());
    }

    #[test]
    fn test_validate_reports_field() {
        let c = ContactConfig { min_support_fraction: 1.5, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::OutOfRange { field: "min_support_fraction", .. })));
        let m = MotionConfig { gravity: f32::INFINITY, ..Default::default() };
        assert_eq!(m.validate(), Err(ConfigError::NotFinite { field: "gravity" }));
        let m = MotionConfig { speed: -1.0, ..Default::default() };
        assert_eq!(m.validate(), Err(ConfigError::Negative { field: "speed", value: -1.0 }));
        let r = ResolverConfig { max_samples: 0, ..Default::default() };
        assert_eq!(r.validate(), Err(ConfigError::Zero { field: "max_samples" }));
    }

    #[test]
    fn test_descent_stride_checked_against_ground_band() {
        let contact = ContactConfig::default();
        assert!(ResolverConfig::default().validate_for(&contact).is_ok());

        let thin = ContactConfig { ground_tolerance: 0.5, ..Default::default() };
        assert_eq!(
            ResolverConfig::default().validate_for(&thin),
            Err(ConfigError::Exceeds { field: "descent_stride", value: 2.0, limit: "ground_tolerance", max: 0.5 })
        );
        let fine = ResolverConfig { descent_stride: 0.5, ..Default::default() };
        assert!(fine.validate_for(&thin).is_ok());

        // Each side is still validated on its own.
        let bad = ContactConfig { ground_tolerance: -1.0, ..Default::default() };
        assert!(matches!(fine.validate_for(&bad), Err(ConfigError::Negative { field: "ground_tolerance", .. })));
    }

    #[test]
    fn test_tile_glyphs() {
        for t in [Tile::Empty, Tile::Solid, Tile::Climbable, Tile::Hazardous, Tile::OneWayPlatform] {
            assert_eq!(Tile::from_glyph(t.glyph()), Some(t));
        }
        assert_eq!(Tile::from_glyph(' '), Some(Tile::Empty));
        assert!(!Tile::Hazardous.blocks_movement());
        assert!(Tile::Climbable.blocks_movement());
    }

    #[test]
    fn test_aabb_clamps_negative_size() {
        let a = Aabb::from_xywh(10.0, 20.0, -5.0, 8.0);
        assert_eq!(a.size, Vec2::new(0.0, 8.0));
        assert_eq!(a.right(), 10.0);
        assert_eq!(a.with_axis(Axis::Y, 3.0).min, Vec2::new(10.0, 3.0));
        assert_eq!(Axis::X.of(Vec2::new(1.0, 2.0)), 1.0);
    }
}
