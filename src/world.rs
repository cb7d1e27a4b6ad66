use glam::{IVec2, Vec2};

use crate::api::{ContactQuery, NarrowphaseApi};
use crate::error::GridError;
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Dense, fixed-size level grid. Row-major, `tiles[y * width + x]`.
#[derive(Clone, Debug)]
pub struct TileGrid {
    name: String,
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
    contact: ContactConfig,
}

impl TileGrid {
    /// Largest grid `new` will allocate (4096 x 4096).
    pub const MAX_CELLS: usize = 1 << 24;

    /// Empty grid of `width` x `height` tiles, each `tile_size` world units wide.
    pub fn new(name: impl Into<String>, width: u32, height: u32, tile_size: f32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        let cells = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= Self::MAX_CELLS)
            .ok_or(GridError::TooLarge { width, height, max: Self::MAX_CELLS })?;
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(GridError::BadTileSize(tile_size));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            tile_size,
            tiles: vec![Tile::Empty; cells],
            contact: ContactConfig::default(),
        })
    }

    /// Parse one glyph per cell (see [`Tile::glyph`]); all rows must be equally long.
    pub fn from_ascii(name: impl Into<String>, tile_size: f32, rows: &[&str]) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, |r| r.chars().count());
        let width = u32::try_from(expected).unwrap_or(u32::MAX);
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let mut grid = Self::new(name, width, height, tile_size)?;
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(GridError::RaggedRow { row, expected, found });
            }
            for (col, glyph) in line.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or(GridError::UnknownGlyph { glyph, row, col })?;
                grid.set_tile(IVec2::new(col as i32, row as i32), tile);
            }
        }
        Ok(grid)
    }

    /// Replace the contact tunables used by [`ContactQuery::check_collision`].
    pub fn with_contact_config(mut self, contact: ContactConfig) -> Result<Self, GridError> {
        contact.validate()?;
        self.contact = contact;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn contact_config(&self) -> &ContactConfig {
        &self.contact
    }

    /// Level extent in world units.
    pub fn world_bounds(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Tile at `cell`; anything outside the grid reads as [`Tile::Empty`].
    pub fn tile(&self, cell: IVec2) -> Tile {
        if self.in_bounds(cell) {
            self.tiles[self.index(cell)]
        } else {
            Tile::Empty
        }
    }

    /// Overwrite one cell. Out-of-range writes are ignored.
    pub fn set_tile(&mut self, cell: IVec2, tile: Tile) {
        if self.in_bounds(cell) {
            let i = self.index(cell);
            self.tiles[i] = tile;
        }
    }

    /// Like [`set_tile`](Self::set_tile) but reports out-of-range writes.
    pub fn try_set_tile(&mut self, cell: IVec2, tile: Tile) -> Result<(), GridError> {
        if !self.in_bounds(cell) {
            return Err(GridError::OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.width,
                height: self.height,
            });
        }
        self.set_tile(cell, tile);
        Ok(())
    }

    /// Set columns `x0..=x1` of `row`.
    pub fn fill_row(&mut self, row: i32, x0: i32, x1: i32, tile: Tile) {
        for x in x0..=x1 {
            self.set_tile(IVec2::new(x, row), tile);
        }
    }

    /// Set rows `y0..=y1` of `col`.
    pub fn fill_column(&mut self, col: i32, y0: i32, y1: i32, tile: Tile) {
        for y in y0..=y1 {
            self.set_tile(IVec2::new(col, y), tile);
        }
    }

    /// Floor division of a world position by the tile size.
    pub fn world_to_cell(&self, p: Vec2) -> IVec2 {
        IVec2::new((p.x / self.tile_size).floor() as i32, (p.y / self.tile_size).floor() as i32)
    }

    pub fn tile_at_world(&self, p: Vec2) -> Tile {
        self.tile(self.world_to_cell(p))
    }

    /// World-space rectangle covered by `cell`.
    pub fn tile_bounds(&self, cell: IVec2) -> Aabb {
        Aabb::new(cell.as_vec2() * self.tile_size, Vec2::splat(self.tile_size))
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, Tile)> + '_ {
        let w = self.width as usize;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != Tile::Empty)
            .map(move |(i, t)| (IVec2::new((i % w) as i32, (i / w) as i32), *t))
    }

    /// One line per row using tile glyphs.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                out.push(self.tile(IVec2::new(x, y)).glyph());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// Column or row range clamped to the grid; empty when fully outside.
    fn clamp_span(lo: i32, hi: i32, len: u32) -> std::ops::RangeInclusive<i32> {
        lo.max(0)..=hi.min(len as i32 - 1)
    }

    fn visit_cell(&self, entity: &Aabb, cell: IVec2, result: &mut ContactResult) {
        let tile = self.tile(cell);
        if tile == Tile::Empty {
            return;
        }
        let rect = self.tile_bounds(cell);
        let c = Narrowphase::classify(entity, &rect, tile, &self.contact);
        result.absorb(tile, &c);
    }
}

impl ContactQuery for TileGrid {
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult {
        let entity = Aabb::from_xywh(x, y, width, height);
        let ts = self.tile_size;
        let mut result = ContactResult::default();

        // Cells under the box interior; the `- 1` keeps a box whose edge sits
        // exactly on a tile boundary out of the neighbouring cell.
        let left = (entity.min.x / ts).floor() as i32;
        let right = ((entity.right() - 1.0) / ts).floor() as i32;
        let top = (entity.min.y / ts).floor() as i32;
        let bottom = ((entity.bottom() - 1.0) / ts).floor() as i32;
        // Row directly under the feet, so standing flush on a tile counts.
        let below = (entity.bottom() / ts).floor() as i32;

        let cols = Self::clamp_span(left, right, self.width);
        for row in Self::clamp_span(top, bottom, self.height) {
            for col in cols.clone() {
                self.visit_cell(&entity, IVec2::new(col, row), &mut result);
            }
        }
        if below > bottom {
            for col in cols {
                self.visit_cell(&entity, IVec2::new(col, below), &mut result);
            }
        }

        result.finish(entity.size.x, &self.contact)
    }

    fn next_surface(&self, x: f32, width: f32, from: f32, to: f32) -> SurfaceHint {
        // Same column span as `check_collision`, so a box sees exactly the
        // tops it can rest on.
        if !(width > 0.0 && from <= to) {
            return SurfaceHint::Clear;
        }
        let ts = self.tile_size;
        let cols = Self::clamp_span((x / ts).floor() as i32, ((x + width - 1.0) / ts).floor() as i32, self.width);
        let rows = Self::clamp_span((from / ts).ceil() as i32, (to / ts).floor() as i32, self.height);
        for row in rows {
            if cols.clone().any(|col| self.tile(IVec2::new(col, row)).blocks_movement()) {
                return SurfaceHint::At { top: row as f32 * ts, band: self.contact.ground_tolerance };
            }
        }
        SurfaceHint::Clear
    }
}

/// Endless solid floor at a fixed height.
///
/// Used by a player that has no level attached yet, so it still lands
/// somewhere instead of falling forever.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatFloor {
    pub y: f32,
    pub contact: ContactConfig,
}

impl FlatFloor {
    pub const DEFAULT_Y: f32 = 300.0;

    pub fn new(y: f32) -> Self {
        Self { y, contact: ContactConfig::default() }
    }
}

impl Default for FlatFloor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_Y)
    }
}

impl ContactQuery for FlatFloor {
    fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> ContactResult {
        let entity = Aabb::from_xywh(x, y, width, height);
        // A slab one unit wider than the box on each side, deep enough to
        // never be passed through.
        let slab = Aabb::from_xywh(x - 1.0, self.y, width + 2.0, 1.0e6);
        let c = Narrowphase::classify(&entity, &slab, Tile::Solid, &self.contact);
        let mut result = ContactResult::default();
        result.absorb(Tile::Solid, &c);
        result.finish(entity.size.x, &self.contact)
    }

    fn next_surface(&self, _x: f32, width: f32, from: f32, to: f32) -> SurfaceHint {
        if width > 0.0 && from <= self.y && self.y <= to {
            SurfaceHint::At { top: self.y, band: self.contact.ground_tolerance }
        } else {
            SurfaceHint::Clear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new("t", 10, 10, 32.0).unwrap()
    }

    #[test]
    fn test_new_rejects_degenerate() {
        assert_eq!(TileGrid::new("t", 0, 5, 32.0).unwrap_err(), GridError::EmptyGrid { width: 0, height: 5 });
        assert!(matches!(TileGrid::new("t", 5, 5, 0.0), Err(GridError::BadTileSize(_))));
        assert!(matches!(TileGrid::new("t", 5, 5, f32::NAN), Err(GridError::BadTileSize(_))));
    }

    #[test]
    fn test_new_rejects_oversized_grid() {
        let max = TileGrid::MAX_CELLS;
        assert_eq!(
            TileGrid::new("t", u32::MAX, u32::MAX, 32.0).unwrap_err(),
            GridError::TooLarge { width: u32::MAX, height: u32::MAX, max }
        );
        assert_eq!(
            TileGrid::new("t", 1 << 15, 1 << 15, 32.0).unwrap_err(),
            GridError::TooLarge { width: 1 << 15, height: 1 << 15, max }
        );
        assert!(matches!(TileGrid::new("t", u32::MAX, 1, 32.0), Err(GridError::TooLarge { .. })));
        assert!(TileGrid::new("t", 1 << 12, 1 << 10, 32.0).is_ok());
    }

    #[test]
    fn test_next_surface_reports_first_blocking_top() {
        let mut g = grid();
        g.set_tile(IVec2::new(2, 3), Tile::Hazardous); // never a surface
        g.set_tile(IVec2::new(2, 5), Tile::OneWayPlatform); // top 160
        g.set_tile(IVec2::new(3, 7), Tile::Solid); // top 224
        let band = g.contact_config().ground_tolerance;

        assert_eq!(g.next_surface(64.0, 32.0, 0.0, 300.0), SurfaceHint::At { top: 160.0, band });
        // Range bounds are inclusive.
        assert_eq!(g.next_surface(64.0, 32.0, 160.0, 160.0), SurfaceHint::At { top: 160.0, band });
        assert_eq!(g.next_surface(64.0, 32.0, 160.5, 300.0), SurfaceHint::Clear);
        // Spanning both columns picks the higher top.
        assert_eq!(g.next_surface(90.0, 32.0, 100.0, 300.0), SurfaceHint::At { top: 160.0, band });
        assert_eq!(g.next_surface(96.0, 32.0, 100.0, 300.0), SurfaceHint::At { top: 224.0, band });
        // Edge flush against a column stays out of it, as in `check_collision`.
        assert_eq!(g.next_surface(32.0, 32.0, 0.0, 300.0), SurfaceHint::Clear);
        assert_eq!(g.next_surface(-500.0, 32.0, -1.0e6, 1.0e6), SurfaceHint::Clear);
        assert_eq!(g.next_surface(64.0, 0.0, 0.0, 300.0), SurfaceHint::Clear);
    }

    #[test]
    fn test_out_of_bounds_reads_empty_and_writes_ignored() {
        let mut g = grid();
        g.set_tile(IVec2::new(-1, 0), Tile::Solid);
        g.set_tile(IVec2::new(10, 0), Tile::Solid);
        assert_eq!(g.tile(IVec2::new(-1, 0)), Tile::Empty);
        assert_eq!(g.tile(IVec2::new(10, 9)), Tile::Empty);
        assert_eq!(g.tile(IVec2::new(i32::MAX, i32::MIN)), Tile::Empty);
        assert_eq!(g.cells().count(), 0);
        assert!(matches!(g.try_set_tile(IVec2::new(3, 10), Tile::Solid), Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn test_set_tile_overwrites() {
        let mut g = grid();
        g.set_tile(IVec2::new(2, 5), Tile::Solid);
        g.set_tile(IVec2::new(2, 5), Tile::Hazardous);
        assert_eq!(g.tile(IVec2::new(2, 5)), Tile::Hazardous);
    }

    #[test]
    fn test_world_to_cell_floors() {
        let g = grid();
        assert_eq!(g.world_to_cell(Vec2::new(63.9, 160.0)), IVec2::new(1, 5));
        assert_eq!(g.world_to_cell(Vec2::new(-0.1, -32.0)), IVec2::new(-1, -1));
        assert_eq!(g.tile_bounds(IVec2::new(2, 5)), Aabb::from_xywh(64.0, 160.0, 32.0, 32.0));
        assert_eq!(g.world_bounds(), Vec2::new(320.0, 320.0));
    }

    #[test]
    fn test_from_ascii_roundtrip_and_errors() {
        let rows = ["..H.", "=.^.", "####"];
        let g = TileGrid::from_ascii("a", 16.0, &rows).unwrap();
        assert_eq!((g.width(), g.height()), (4, 3));
        assert_eq!(g.tile(IVec2::new(2, 0)), Tile::Climbable);
        assert_eq!(g.tile(IVec2::new(0, 1)), Tile::OneWayPlatform);
        assert_eq!(g.tile(IVec2::new(2, 1)), Tile::Hazardous);
        assert_eq!(g.to_ascii(), "..H.\n=.^.\n####\n");

        let err = TileGrid::from_ascii("b", 16.0, &["...", ".."]).unwrap_err();
        assert_eq!(err, GridError::RaggedRow { row: 1, expected: 3, found: 2 });
        let err = TileGrid::from_ascii("c", 16.0, &["..x"]).unwrap_err();
        assert_eq!(err, GridError::UnknownGlyph { glyph: 'x', row: 0, col: 2 });
        assert!(TileGrid::from_ascii("d", 16.0, &[]).is_err());
    }

    #[test]
    fn test_standing_flush_on_tile_is_ground() {
        let mut g = grid();
        g.set_tile(IVec2::new(2, 5), Tile::Solid);
        // Bottom edge exactly on the tile top (y = 160).
        let r = g.check_collision(64.0, 128.0, 32.0, 32.0);
        assert!(r.on_ground && r.collided);
        assert!(!r.collision_x && !r.collision_y);
        // Just above: nothing.
        let r = g.check_collision(64.0, 127.5, 32.0, 32.0);
        assert_eq!(r, ContactResult::default());
    }

    #[test]
    fn test_edge_overlap_threshold() {
        let mut g = grid();
        g.set_tile(IVec2::new(3, 7), Tile::Solid); // x 96..128, top 224
        for (x, expected) in [(90.0, true), (80.0, true), (75.0, false), (64.0, false)] {
            let r = g.check_collision(x, 192.0, 32.0, 32.0);
            assert_eq!(r.on_ground, expected, "x={x} support={}", r.ground_support);
        }
    }

    #[test]
    fn test_support_sums_across_tiles() {
        let mut g = grid();
        g.fill_row(7, 2, 3, Tile::Solid);
        // Straddles the seam: 16 + 16 units of support.
        let r = g.check_collision(80.0, 192.0, 32.0, 32.0);
        assert!(r.on_ground);
        assert!((r.ground_support - 32.0).abs() < 1e-5);
    }

    #[test]
    fn test_walking_into_wall_on_floor() {
        let mut g = grid();
        g.fill_row(7, 0, 9, Tile::Solid);
        g.set_tile(IVec2::new(4, 6), Tile::Solid); // wall block x 128..160 on the floor
        let r = g.check_collision(100.0, 192.0, 32.0, 32.0);
        assert!(r.on_ground && r.collision_x && r.touching_wall);
        assert!((r.penetration_x - 4.0).abs() < 1e-5);
        let r = g.check_collision(96.0, 192.0, 32.0, 32.0);
        assert!(r.on_ground && !r.collision_x);
    }

    #[test]
    fn test_one_way_directionality() {
        let mut g = grid();
        g.set_tile(IVec2::new(3, 7), Tile::OneWayPlatform);
        let from_above = g.check_collision(96.0, 193.0, 32.0, 32.0);
        assert!(from_above.on_ground && from_above.one_way);
        assert!(!from_above.collision_y);
        let from_below = g.check_collision(96.0, 240.0, 32.0, 32.0);
        assert!(!from_below.on_ground && !from_below.one_way);
        assert!(!from_below.collision_x && !from_below.collision_y);
        let deep = g.check_collision(96.0, 200.0, 32.0, 32.0);
        assert!(!deep.on_ground);
    }

    #[test]
    fn test_flags_are_orthogonal() {
        let mut g = grid();
        g.set_tile(IVec2::new(3, 6), Tile::Climbable);
        g.set_tile(IVec2::new(4, 6), Tile::Hazardous);
        let r = g.check_collision(100.0, 192.0, 32.0, 32.0);
        assert!(r.climbable && r.hazardous && r.collided);
        let spikes_only = g.check_collision(140.0, 192.0, 16.0, 32.0);
        assert!(spikes_only.hazardous && !spikes_only.collision_x && !spikes_only.collision_y);
    }

    #[test]
    fn test_outside_grid_is_open_space() {
        let g = grid();
        assert_eq!(g.check_collision(-500.0, -500.0, 32.0, 32.0), ContactResult::default());
        assert_eq!(g.check_collision(1.0e6, 1.0e6, 32.0, 32.0), ContactResult::default());
    }

    #[test]
    fn test_degenerate_box_never_grounds() {
        let mut g = grid();
        g.set_tile(IVec2::new(2, 5), Tile::Solid);
        let r = g.check_collision(70.0, 160.0, 0.0, 0.0);
        assert!(!r.on_ground && !r.collision_x && !r.collision_y);
    }

    #[test]
    fn test_query_is_pure() {
        let g = crate::levels::test_level().unwrap();
        let a = g.check_collision(130.0, 440.0, 32.0, 32.0);
        let b = g.check_collision(130.0, 440.0, 32.0, 32.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_floor() {
        let f = FlatFloor::default();
        assert!(f.check_collision(0.0, 268.0, 32.0, 32.0).on_ground);
        let sunk = f.check_collision(0.0, 280.0, 32.0, 32.0);
        assert!(sunk.collision_y && !sunk.on_ground);
        assert_eq!(f.check_collision(0.0, 100.0, 32.0, 32.0), ContactResult::default());
        assert_eq!(f.next_surface(0.0, 32.0, 0.0, 400.0), SurfaceHint::At { top: 300.0, band: 2.0 });
        assert_eq!(f.next_surface(0.0, 32.0, 0.0, 299.0), SurfaceHint::Clear);
    }
}
