//! Audio cues using the Web Audio API
//!
//! Every cue is a single decaying sine tone. Audio is best-effort: any
//! failure is swallowed and gameplay carries on. Native builds have no
//! output device and only log the tones they would play.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Gem picked up
    Gem,
    /// Distance score hit a multiple of ten
    Milestone,
    /// Player changed direction
    Turn,
    /// Ball fell off the path
    Fall,
}

/// A tone request: frequency (Hz) and duration (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub duration: f64,
}

impl SoundEffect {
    pub fn tone(self) -> Tone {
        let (freq, duration) = match self {
            SoundEffect::Gem => (880.0, 0.1),
            SoundEffect::Milestone => (440.0, 0.05),
            SoundEffect::Turn => (600.0, 0.05),
            SoundEffect::Fall => (150.0, 0.3),
        };
        Tone { freq, duration }
    }

    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RoundStarted => None,
            GameEvent::Turned(_) => Some(SoundEffect::Turn),
            GameEvent::GemCollected { .. } => Some(SoundEffect::Gem),
            GameEvent::Milestone { .. } => Some(SoundEffect::Milestone),
            GameEvent::Fell { .. } => Some(SoundEffect::Fall),
        }
    }
}

/// Peak gain of a cue at full volume
const BASE_GAIN: f32 = 0.1;
/// Gain the envelope decays to
const FLOOR_GAIN: f32 = 0.001;

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    /// Context creation already failed once; don't retry every cue
    #[cfg(target_arch = "wasm32")]
    unavailable: bool,
    /// Cues that failed to play
    dropped: u32,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx: None,
            #[cfg(target_arch = "wasm32")]
            unavailable: false,
            dropped: 0,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.apply_settings(settings);
        audio
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play the cue for every event that has one
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.beep(effect.tone(), vol * BASE_GAIN);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn beep(&mut self, tone: Tone, gain: f32) {
        log::trace!("beep {} Hz for {}s at gain {}", tone.freq, tone.duration, gain);
    }

    #[cfg(target_arch = "wasm32")]
    fn beep(&mut self, tone: Tone, gain: f32) {
        let Some(ctx) = self.context() else { return };
        if play_tone(ctx, tone, gain).is_none() {
            self.drop_cue(tone);
        }
    }

    /// Count a failed cue; only the first one warns
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn drop_cue(&mut self, tone: Tone) -> bool {
        self.dropped += 1;
        if self.dropped == 1 {
            log::warn!("Failed to play {} Hz cue - further failures are silent", tone.freq);
            true
        } else {
            log::debug!("Dropped {} Hz cue", tone.freq);
            false
        }
    }

    /// Lazily create the context; browsers only allow it after a user gesture
    #[cfg(target_arch = "wasm32")]
    fn context(&mut self) -> Option<&web_sys::AudioContext> {
        if self.ctx.is_none() && !self.unavailable {
            match web_sys::AudioContext::new() {
                Ok(ctx) => self.ctx = Some(ctx),
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    self.unavailable = true;
                }
            }
        }

        let ctx = self.ctx.as_ref()?;
        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }
}

/// Sine oscillator through a gain node with an exponential decay
#[cfg(target_arch = "wasm32")]
fn play_tone(ctx: &web_sys::AudioContext, tone: Tone, gain: f32) -> Option<()> {
    use web_sys::OscillatorType;

    let osc = ctx.create_oscillator().ok()?;
    let amp = ctx.create_gain().ok()?;

    osc.set_type(OscillatorType::Sine);
    osc.frequency().set_value(tone.freq);
    osc.connect_with_audio_node(&amp).ok()?;
    amp.connect_with_audio_node(&ctx.destination()).ok()?;

    let t = ctx.current_time();
    amp.gain().set_value_at_time(gain, t).ok()?;
    amp.gain()
        .exponential_ramp_to_value_at_time(FLOOR_GAIN, t + tone.duration)
        .ok()?;

    osc.start().ok()?;
    osc.stop_with_when(t + tone.duration).ok()?;
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;

    #[test]
    fn test_event_cues() {
        assert_eq!(SoundEffect::for_event(&GameEvent::RoundStarted), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Turned(Direction::Left)),
            Some(SoundEffect::Turn)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Fell {
                score: 3,
                new_best: false
            }),
            Some(SoundEffect::Fall)
        );
    }

    #[test]
    fn test_cues_are_distinct() {
        let gem = SoundEffect::Gem.tone();
        let milestone = SoundEffect::Milestone.tone();
        assert_eq!(gem.freq, 880.0);
        assert_eq!(milestone.freq, 440.0);
        assert_ne!(gem, milestone);
        assert_eq!(SoundEffect::Fall.tone().duration, 0.3);
    }

    #[test]
    fn test_mute_zeroes_volume() {
        let mut audio = AudioManager::new();
        assert!(audio.effective_volume() > 0.0);
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(), 0.0);
        // Playing while muted is a no-op rather than an error
        audio.play(SoundEffect::Gem);
    }

    #[test]
    fn test_dropped_cues_warn_once() {
        let mut audio = AudioManager::new();
        assert!(audio.drop_cue(SoundEffect::Gem.tone()));
        assert!(!audio.drop_cue(SoundEffect::Turn.tone()));
        assert!(!audio.drop_cue(SoundEffect::Gem.tone()));
        assert_eq!(audio.dropped, 3);
    }

    #[test]
    fn test_volume_clamped() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(3.0);
        audio.set_sfx_volume(-1.0);
        assert_eq!(audio.effective_volume(), 0.0);
        audio.set_sfx_volume(0.5);
        assert_eq!(audio.effective_volume(), 0.5);
    }
}
