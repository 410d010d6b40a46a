//! Zigzag - a one-button arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (path generation, ball movement, scoring)
//! - `session`: Session object tying state, seeded RNG and tuning together
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Input mapping and tick timer lifecycle
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Edge length of a square path tile (pixels)
    pub const TILE_SIZE: f32 = 40.0;
    /// Rendered ball diameter (pixels)
    pub const BALL_SIZE: f32 = 24.0;

    /// Fixed tick period while playing
    pub const TICK_MS: u32 = 20;

    /// Visible play field (pixels)
    pub const VIEW_WIDTH: f32 = 320.0;
    pub const VIEW_HEIGHT: f32 = 500.0;
}
