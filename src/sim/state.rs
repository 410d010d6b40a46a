//! Game state and core simulation types
//!
//! Everything a round needs to be replayed lives here; the RNG is owned by
//! the caller and passed into each transition.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title panel, waiting for the first tap
    #[default]
    Menu,
    /// Ball is rolling
    Playing,
    /// Ball fell off; waiting for a tap to retry
    Over,
}

/// Horizontal direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Down and to the right
    #[default]
    Right,
    /// Down and to the left
    Left,
}

impl Direction {
    /// Signed unit value (+1 right, -1 left)
    pub fn sign(self) -> f32 {
        match self {
            Direction::Right => 1.0,
            Direction::Left => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
        }
    }

    /// Indicator glyph shown while playing
    pub fn glyph(self) -> &'static str {
        match self {
            Direction::Right => "↘",
            Direction::Left => "↙",
        }
    }
}

/// One square path segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Top-left corner (pixels)
    pub pos: Vec2,
    /// Uncollected gem on this tile
    pub gem: bool,
}

impl Tile {
    pub fn new(pos: Vec2, gem: bool) -> Self {
        Self { pos, gem }
    }

    pub fn center(&self, tile_size: f32) -> Vec2 {
        self.pos + Vec2::splat(tile_size / 2.0)
    }
}

/// Ordered tiles plus the direction the next tile continues in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub tiles: Vec<Tile>,
    pub heading: Direction,
}

impl Path {
    pub fn first(&self) -> Option<&Tile> {
        self.tiles.first()
    }

    pub fn last(&self) -> Option<&Tile> {
        self.tiles.last()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Drop all but the newest `keep` tiles
    pub fn retain_newest(&mut self, keep: usize) {
        if self.tiles.len() > keep {
            let excess = self.tiles.len() - keep;
            self.tiles.drain(..excess);
        }
    }
}

/// The player's ball
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ball {
    /// Center position (pixels)
    pub pos: Vec2,
    pub direction: Direction,
}

/// Something the shell may want to react to (sound, logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh round began
    RoundStarted,
    /// Player flipped direction
    Turned(Direction),
    /// Gem picked up; `total` is the round's gem count after pickup
    GemCollected { total: u32 },
    /// Distance score reached a multiple of the milestone step
    Milestone { score: u32 },
    /// Ball left the path
    Fell { score: u32, new_best: bool },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub ball: Ball,
    pub path: Path,
    /// Current round score
    pub score: u32,
    /// Gems collected this round
    pub gems: u32,
    /// Best score this session
    pub best_score: u32,
    /// Vertical scroll applied when rendering
    pub camera_y: f32,
    /// Ticks advanced in the current round
    pub round_ticks: u64,
    /// Last finished round beat (or tied) the previous best
    pub new_best: bool,
}

impl GameState {
    /// Fresh session state, sitting on the menu
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset round fields and place the ball on the first tile
    ///
    /// Best score survives; everything else starts over.
    pub fn reset_round(&mut self, path: Path, tuning: &Tuning) {
        let start = path
            .first()
            .map(|t| t.center(tuning.tile_size))
            .unwrap_or(tuning.start);
        self.ball = Ball {
            pos: start,
            direction: Direction::Right,
        };
        self.path = path;
        self.score = 0;
        self.gems = 0;
        self.camera_y = 0.0;
        self.round_ticks = 0;
        self.new_best = false;
        self.phase = GamePhase::Playing;
    }

    /// Distance component of the score
    pub fn distance_score(&self, tuning: &Tuning) -> u32 {
        (self.ball.pos.y / tuning.tile_size).floor().max(0.0) as u32
    }

    /// Gems still lying on the retained path
    pub fn gems_remaining(&self) -> usize {
        self.path.tiles.iter().filter(|t| t.gem).count()
    }
}
