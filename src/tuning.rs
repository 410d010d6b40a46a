//! Data-driven game balance
//!
//! Every gameplay number lives here so difficulty can be changed without
//! touching the simulation. Loaded from JSON; missing fields use defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TILE_SIZE;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Extra margin around a tile that still counts as "on the tile".
///
/// Bounds stay strict inequalities; the margins only move the edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Slack above the tile's top edge (pixels)
    pub above: f32,
    /// Slack below the tile's bottom edge (pixels)
    pub below: f32,
    /// Slack past the left/right edges (pixels)
    pub side: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            above: 5.0,
            below: 10.0,
            // The ball crosses between diagonal tiles exactly on their shared
            // corner, which strict bounds with zero slack reject.
            side: 1.0,
        }
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Tile edge length (pixels)
    pub tile_size: f32,
    /// Ball displacement per tick along each axis (pixels)
    pub speed: f32,
    /// Top-left corner of the first tile
    pub start: Vec2,
    /// Tiles generated when a round starts
    pub initial_length: usize,
    /// Tiles appended per extension
    pub extend_length: usize,
    /// Extend once the ball is within this many pixels (y) of the last tile
    pub lookahead: f32,
    /// Tiles kept from the old path on each extension
    pub retention: usize,
    /// Chance per step of flipping direction
    pub flip_chance: f64,
    /// Chance per eligible tile of carrying a gem
    pub gem_chance: f64,
    /// Tiles with batch index <= this never carry a gem
    pub gem_min_index: usize,
    /// Per-axis pickup distance from a gem tile's center (pixels)
    pub gem_radius: f32,
    /// Score awarded per gem
    pub gem_bonus: u32,
    /// Milestone cue every N points of distance score
    pub milestone_every: u32,
    /// Camera sits this far above the ball (pixels)
    pub camera_lead: f32,
    /// On-tile tolerance band
    pub tolerance: Tolerance,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            speed: 4.0,
            start: Vec2::new(150.0, 100.0),
            initial_length: 100,
            extend_length: 50,
            lookahead: 500.0,
            retention: 100,
            flip_chance: 0.3,
            gem_chance: 0.15,
            gem_min_index: 5,
            gem_radius: TILE_SIZE / 2.0,
            gem_bonus: 5,
            milestone_every: 10,
            camera_lead: 200.0,
            tolerance: Tolerance::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the path or loop invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.tile_size > 0.0) {
            return invalid("tile_size", "must be positive");
        }
        if !(self.speed > 0.0) {
            return invalid("speed", "must be positive");
        }
        if self.speed > self.tile_size {
            return invalid("speed", "must not exceed tile_size");
        }
        if !(self.lookahead >= 0.0) {
            return invalid("lookahead", "must not be negative");
        }
        // Pruning must never reach the tile under the ball
        if !(self.retention as f32 * self.tile_size > self.lookahead + self.tile_size) {
            return invalid("retention", "must cover lookahead plus one tile");
        }
        if self.initial_length == 0 {
            return invalid("initial_length", "must be at least 1");
        }
        if self.extend_length == 0 {
            return invalid("extend_length", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.flip_chance) {
            return invalid("flip_chance", "must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.gem_chance) {
            return invalid("gem_chance", "must be within [0, 1]");
        }
        if self.gem_radius < 0.0 {
            return invalid("gem_radius", "must not be negative");
        }
        if self.milestone_every == 0 {
            return invalid("milestone_every", "must be at least 1");
        }
        let t = &self.tolerance;
        if t.above < 0.0 || t.below < 0.0 || t.side < 0.0 {
            return invalid("tolerance", "margins must not be negative");
        }
        Ok(())
    }
}
