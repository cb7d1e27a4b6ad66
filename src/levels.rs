//! Built-in development levels.

use crate::error::GridError;
use crate::types::Tile;
use crate::world::TileGrid;

pub const TILE_SIZE: f32 = 32.0;

/// 30x20 sandbox: thick floor, three platforms, two climbable walls, a
/// one-way ledge and a pair of spikes.
pub fn test_level() -> Result<TileGrid, GridError> {
    let mut level = TileGrid::new("Test Level", 30, 20, TILE_SIZE)?;
    let (w, h) = (level.width() as i32, level.height() as i32);

    level.fill_row(h - 1, 0, w - 1, Tile::Solid);
    level.fill_row(h - 2, 0, w - 1, Tile::Solid);

    level.fill_row(15, 5, 10, Tile::Solid);
    level.fill_row(12, 15, 20, Tile::Solid);
    level.fill_row(8, 25, 28, Tile::Solid);

    level.fill_column(12, 10, 17, Tile::Climbable);
    level.fill_column(22, 5, 12, Tile::Climbable);

    level.fill_row(10, 8, 12, Tile::OneWayPlatform);

    level.fill_row(h - 3, 18, 19, Tile::Hazardous);
    Ok(level)
}

/// 20x15 floor with one floating platform.
pub fn simple_level() -> Result<TileGrid, GridError> {
    let mut level = TileGrid::new("Simple Level", 20, 15, TILE_SIZE)?;
    let (w, h) = (level.width() as i32, level.height() as i32);
    level.fill_row(h - 1, 0, w - 1, Tile::Solid);
    level.fill_row(10, 8, 12, Tile::Solid);
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_test_level_layout() {
        let l = test_level().unwrap();
        assert_eq!(l.name(), "Test Level");
        assert_eq!(l.tile(IVec2::new(0, 19)), Tile::Solid);
        assert_eq!(l.tile(IVec2::new(29, 18)), Tile::Solid);
        // The one-way ledge overwrites the top of the left climbable wall.
        assert_eq!(l.tile(IVec2::new(12, 10)), Tile::OneWayPlatform);
        assert_eq!(l.tile(IVec2::new(12, 11)), Tile::Climbable);
        assert_eq!(l.tile(IVec2::new(18, 17)), Tile::Hazardous);
        assert_eq!(l.tile(IVec2::new(3, 3)), Tile::Empty);
    }

    #[test]
    fn test_simple_level_layout() {
        let l = simple_level().unwrap();
        assert_eq!(l.cells().count(), 20 + 5);
    }
}
