//! On-tile and gem proximity tests
//!
//! Axis-aligned checks against square tiles. All comparisons are strict, so
//! a point sitting exactly on an (extended) edge is outside.

use glam::Vec2;

use super::state::Tile;
use crate::tuning::Tolerance;

/// Whether `point` lies within `tile`, widened by the tolerance band
pub fn tile_contains(tile: &Tile, tile_size: f32, tolerance: &Tolerance, point: Vec2) -> bool {
    let left = tile.pos.x - tolerance.side;
    let right = tile.pos.x + tile_size + tolerance.side;
    let top = tile.pos.y - tolerance.above;
    let bottom = tile.pos.y + tile_size + tolerance.below;

    point.x > left && point.x < right && point.y > top && point.y < bottom
}

/// Whether any tile supports the ball at `point`
pub fn on_path(tiles: &[Tile], tile_size: f32, tolerance: &Tolerance, point: Vec2) -> bool {
    tiles
        .iter()
        .any(|tile| tile_contains(tile, tile_size, tolerance, point))
}

/// Whether `point` is close enough to the tile's gem to pick it up
///
/// Only tiles still carrying a gem qualify.
pub fn gem_in_reach(tile: &Tile, tile_size: f32, radius: f32, point: Vec2) -> bool {
    if !tile.gem {
        return false;
    }
    let d = (point - tile.center(tile_size)).abs();
    d.x < radius && d.y < radius
}

/// Index of the tile whose (untolerated) square contains `point`, if any
pub fn tile_under(tiles: &[Tile], tile_size: f32, point: Vec2) -> Option<usize> {
    let exact = Tolerance {
        above: 0.0,
        below: 0.0,
        side: 0.0,
    };
    tiles
        .iter()
        .position(|tile| tile_contains(tile, tile_size, &exact, point))
}
