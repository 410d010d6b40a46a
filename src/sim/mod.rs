//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Caller-supplied RNG only
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod path;
pub mod state;
pub mod tick;

pub use collision::{gem_in_reach, on_path, tile_contains, tile_under};
pub use path::{Segment, extend, generate, initial_path};
pub use state::{Ball, Direction, GameEvent, GamePhase, GameState, Path, Tile};
pub use tick::{TickInput, advance, apply_tap, tick};
