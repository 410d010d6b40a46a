//! Play session: game state, seeded RNG and tuning in one owner
//!
//! The browser shell and the headless runner both drive the game through a
//! `Session`. Best score lives for the lifetime of the session only.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::sim::{self, GameEvent, GamePhase, GameState, TickInput, collision};
use crate::tuning::Tuning;

pub struct Session {
    seed: u64,
    rng: Pcg32,
    tuning: Tuning,
    state: GameState,
}

impl Session {
    /// New session on the menu screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            state: GameState::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Start/restart a round, or flip direction while playing
    pub fn tap(&mut self) -> Vec<GameEvent> {
        sim::apply_tap(&mut self.state, &mut self.rng, &self.tuning)
    }

    /// One timer tick with no input
    pub fn step(&mut self) -> Vec<GameEvent> {
        sim::advance(&mut self.state, &mut self.rng, &self.tuning)
    }

    /// One tick with explicit input (replays, headless runs)
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        sim::tick(&mut self.state, input, &mut self.rng, &self.tuning)
    }

    /// Whether the autopilot would tap right now
    pub fn autopilot_wants_tap(&self) -> bool {
        autopilot_wants_tap(&self.state, &self.tuning)
    }
}

/// Tap when the ball sits on a tile center and the next tile lies the other way
///
/// Only reliable when `speed` divides the tile size, so the ball passes
/// exactly through tile centers.
pub fn autopilot_wants_tap(state: &GameState, tuning: &Tuning) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    let tiles = &state.path.tiles;
    let Some(i) = collision::tile_under(tiles, tuning.tile_size, state.ball.pos) else {
        return false;
    };
    let Some(next) = tiles.get(i + 1) else {
        return false;
    };

    let offset = (state.ball.pos - tiles[i].center(tuning.tile_size)).abs();
    let at_center = offset.x < tuning.speed / 2.0 && offset.y < tuning.speed / 2.0;
    let next_sign = (next.pos.x - tiles[i].pos.x).signum();

    at_center && next_sign != state.ball.direction.sign()
}
