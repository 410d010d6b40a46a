//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (pointer, touch and key mapped to a single tap)
//! - The periodic tick timer and its lifecycle, including back/forward cache

pub mod input;
pub mod timer;

pub use input::{TAP_EVENTS, TapSource, tap_source};
pub use timer::{PageAction, TimerAction, TimerGate, page_action};
