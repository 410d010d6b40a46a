//! Procedural zigzag path generation
//!
//! Pure functions of the supplied RNG: the same seed yields the same path.

use glam::Vec2;
use rand::Rng;

use super::state::{Direction, Path, Tile};
use crate::tuning::Tuning;

/// Tiles produced by one generator call, plus where the next step heads
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub tiles: Vec<Tile>,
    pub heading: Direction,
}

/// Generate `length` tiles starting at `start` (top-left of the first tile)
///
/// Each step moves one tile down and one tile sideways in the current
/// heading. The heading may flip after every tile except the first. Gems
/// only appear past `gem_min_index` within this batch.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    start: Vec2,
    heading: Direction,
    length: usize,
    tuning: &Tuning,
) -> Segment {
    let step = tuning.tile_size;
    let mut tiles = Vec::with_capacity(length);
    let mut pos = start;
    let mut dir = heading;

    for i in 0..length {
        let gem = i > tuning.gem_min_index && rng.random_bool(tuning.gem_chance);
        tiles.push(Tile::new(pos, gem));

        if i > 0 && rng.random_bool(tuning.flip_chance) {
            dir = dir.flipped();
        }

        pos += Vec2::new(dir.sign() * step, step);
    }

    Segment {
        tiles,
        heading: dir,
    }
}

/// Path for a new round, heading right from `tuning.start`
pub fn initial_path<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> Path {
    let segment = generate(
        rng,
        tuning.start,
        Direction::Right,
        tuning.initial_length,
        tuning,
    );
    Path {
        tiles: segment.tiles,
        heading: segment.heading,
    }
}

/// Append a batch after the last tile, then prune old tiles
///
/// Keeps the newest `tuning.retention` existing tiles plus the new batch.
/// Returns the number of tiles appended.
pub fn extend<R: Rng + ?Sized>(path: &mut Path, rng: &mut R, tuning: &Tuning) -> usize {
    let start = match path.last() {
        Some(last) => last.pos + Vec2::new(path.heading.sign() * tuning.tile_size, tuning.tile_size),
        None => tuning.start,
    };

    let segment = generate(rng, start, path.heading, tuning.extend_length, tuning);
    let added = segment.tiles.len();

    path.retain_newest(tuning.retention);
    path.tiles.extend(segment.tiles);
    path.heading = segment.heading;

    log::debug!(
        "Path extended by {} tiles ({} retained, last y = {})",
        added,
        path.len(),
        path.last().map(|t| t.pos.y).unwrap_or_default()
    );
    added
}
