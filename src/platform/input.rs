//! Input mapping
//!
//! Pointer-down, touch-start and the Space key all become one tap. On wasm
//! the listeners are registered on the window and removed on drop.

/// Browser events that can produce a tap
pub const TAP_EVENTS: [&str; 3] = ["mousedown", "touchstart", "keydown"];

/// Key code (`KeyboardEvent.code`) that taps
pub const TAP_KEY: &str = "Space";

/// Where a tap came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapSource {
    Pointer,
    Touch,
    Key,
}

/// Map a browser event type (and key code, for key events) to a tap
pub fn tap_source(event_type: &str, key_code: Option<&str>) -> Option<TapSource> {
    match event_type {
        "mousedown" => Some(TapSource::Pointer),
        "touchstart" => Some(TapSource::Touch),
        "keydown" if key_code == Some(TAP_KEY) => Some(TapSource::Key),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub use listeners::TapListeners;

#[cfg(target_arch = "wasm32")]
mod listeners {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{TAP_EVENTS, TapSource, tap_source};

    /// Window-wide tap listeners, removed again on drop
    pub struct TapListeners {
        window: web_sys::Window,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl TapListeners {
        /// Register `on_tap` for every tap event on the window
        pub fn register(on_tap: impl FnMut(TapSource) + 'static) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let mut on_tap = on_tap;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let code = event
                    .dyn_ref::<web_sys::KeyboardEvent>()
                    .map(|key| key.code());
                if let Some(source) = tap_source(&event.type_(), code.as_deref()) {
                    event.prevent_default();
                    on_tap(source);
                }
            });

            for name in TAP_EVENTS {
                window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            }
            Ok(Self { window, closure })
        }
    }

    impl Drop for TapListeners {
        fn drop(&mut self) {
            for name in TAP_EVENTS {
                let _ = self
                    .window
                    .remove_event_listener_with_callback(name, self.closure.as_ref().unchecked_ref());
            }
            log::debug!("Tap listeners removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_and_touch_tap() {
        assert_eq!(tap_source("mousedown", None), Some(TapSource::Pointer));
        assert_eq!(tap_source("touchstart", None), Some(TapSource::Touch));
    }

    #[test]
    fn test_only_space_key_taps() {
        assert_eq!(tap_source("keydown", Some("Space")), Some(TapSource::Key));
        assert_eq!(tap_source("keydown", Some("Enter")), None);
        assert_eq!(tap_source("keydown", None), None);
    }

    #[test]
    fn test_every_registered_event_can_tap() {
        for name in TAP_EVENTS {
            assert!(tap_source(name, Some(TAP_KEY)).is_some(), "{name}");
        }
    }

    #[test]
    fn test_other_events_ignored() {
        assert_eq!(tap_source("mousemove", None), None);
        // Not registered, so never mapped
        assert_eq!(tap_source("pointerdown", None), None);
        assert_eq!(tap_source("keyup", Some("Space")), None);
    }
}
