use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Box-versus-tile primitives used by every contact query.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn overlaps(a: &Aabb, b: &Aabb) -> bool {
        a.min.x < b.right() && a.right() > b.min.x && a.min.y < b.bottom() && a.bottom() > b.min.y
    }

    fn overlap_extents(a: &Aabb, b: &Aabb) -> Vec2 {
        let lo = a.min.max(b.min);
        let hi = Vec2::new(a.right().min(b.right()), a.bottom().min(b.bottom()));
        hi - lo
    }

    fn resting_on(entity: &Aabb, tile: &Aabb, tolerance: f32) -> bool {
        let bottom = entity.bottom();
        let top = tile.min.y;
        bottom >= top
            && bottom <= top + tolerance
            && entity.min.x < tile.right()
            && entity.right() > tile.min.x
    }

    fn classify(entity: &Aabb, tile_rect: &Aabb, tile: Tile, cfg: &ContactConfig) -> TileContact {
        let overlap = Self::overlap_extents(entity, tile_rect);
        let interior = Self::overlaps(entity, tile_rect);
        let resting = Self::resting_on(entity, tile_rect, cfg.ground_tolerance);
        let mut c = TileContact {
            overlap,
            touching: tile != Tile::Empty && (interior || resting),
            ..Default::default()
        };
        if !c.touching {
            return c;
        }

        match tile {
            Tile::Empty | Tile::Hazardous => {}
            // Only the top surface exists; from below or the side it is air.
            Tile::OneWayPlatform => c.resting = resting,
            Tile::Solid | Tile::Climbable => {
                if resting {
                    c.resting = true;
                    // A box on a platform edge overlaps the tile it stands on;
                    // that is only a wall when it is embedded almost fully.
                    let center_x = entity.center().x;
                    let near_edge = center_x < tile_rect.min.x + cfg.grounded_wall_edge_margin
                        || center_x > tile_rect.right() - cfg.grounded_wall_edge_margin;
                    c.wall = overlap.x > entity.size.x * cfg.grounded_wall_fraction && near_edge;
                } else if interior {
                    let min = cfg.wall_min_overlap;
                    c.wall = overlap.x > min && (overlap.x < overlap.y || overlap.y < min);
                    // Equal overlaps (a box sunk square into the tile) count as vertical.
                    c.vertical = overlap.y > min && (overlap.y <= overlap.x || overlap.x < min);
                }
            }
        }
        c
    }
}
