//! Tick timer lifecycle
//!
//! The simulation ticks on a fixed interval only while playing. `TimerGate`
//! decides when the timer must start or stop; on wasm `IntervalTimer` owns
//! the browser interval and clears it on cancel or drop.

use crate::sim::GamePhase;

/// What the shell must do with its timer after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Stop,
    Keep,
}

/// Tracks whether the tick timer should be running
#[derive(Debug, Default)]
pub struct TimerGate {
    running: bool,
}

impl TimerGate {
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Reconcile the timer with the current phase
    pub fn sync(&mut self, phase: GamePhase) -> TimerAction {
        let wanted = phase == GamePhase::Playing;
        let action = match (self.running, wanted) {
            (false, true) => TimerAction::Start,
            (true, false) => TimerAction::Stop,
            _ => TimerAction::Keep,
        };
        self.running = wanted;
        action
    }

    /// Teardown: the timer must stop regardless of phase
    pub fn shutdown(&mut self) -> TimerAction {
        if std::mem::take(&mut self.running) {
            TimerAction::Stop
        } else {
            TimerAction::Keep
        }
    }
}

/// What a page lifecycle event means for the tick timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Page entered the back/forward cache: stop ticking, keep everything else
    Suspend,
    /// Page came back from the cache
    Resume,
    /// Page is being unloaded for good
    Teardown,
    Ignore,
}

/// Map `pagehide` / `pageshow` and their `persisted` flag to an action
pub fn page_action(event_type: &str, persisted: bool) -> PageAction {
    match (event_type, persisted) {
        ("pagehide", true) => PageAction::Suspend,
        ("pagehide", false) => PageAction::Teardown,
        ("pageshow", true) => PageAction::Resume,
        _ => PageAction::Ignore,
    }
}

#[cfg(target_arch = "wasm32")]
pub use interval::IntervalTimer;

#[cfg(target_arch = "wasm32")]
mod interval {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    /// A `setInterval` registration
    ///
    /// `cancel` stops further callbacks but keeps the closure alive, so it is
    /// safe to call from inside the callback itself.
    pub struct IntervalTimer {
        window: web_sys::Window,
        handle: Option<i32>,
        _closure: Closure<dyn FnMut()>,
    }

    impl IntervalTimer {
        pub fn start(period_ms: u32, callback: impl FnMut() + 'static) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let closure = Closure::<dyn FnMut()>::new(callback);
            let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            )?;
            log::debug!("Tick timer started ({} ms)", period_ms);
            Ok(Self {
                window,
                handle: Some(handle),
                _closure: closure,
            })
        }

        pub fn cancel(&mut self) {
            if let Some(handle) = self.handle.take() {
                self.window.clear_interval_with_handle(handle);
                log::debug!("Tick timer cancelled");
            }
        }
    }

    impl Drop for IntervalTimer {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}
