//! Zigzag entry point
//!
//! On the web this wires the canvas, tap listeners, tick timer and HUD to a
//! `Session`. Natively it runs headless rounds for tuning and replay checks.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use zigzag::audio::AudioManager;
    use zigzag::consts::TICK_MS;
    use zigzag::platform::input::TapListeners;
    use zigzag::platform::timer::IntervalTimer;
    use zigzag::platform::{PageAction, TapSource, TimerAction, TimerGate, page_action};
    use zigzag::renderer::{RenderState, Viewport, build_scene};
    use zigzag::sim::{GameEvent, GamePhase};
    use zigzag::{Session, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        audio: AudioManager,
        render_state: Option<RenderState>,
        gate: TimerGate,
        timer: Option<IntervalTimer>,
        listeners: Option<TapListeners>,
        /// Cleared on teardown; stops the frame loop
        alive: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::default();
            Self {
                session: Session::new(seed, Tuning::default()),
                audio: AudioManager::from_settings(&settings),
                settings,
                render_state: None,
                gate: TimerGate::default(),
                timer: None,
                listeners: None,
                alive: true,
            }
        }

        fn on_tap(&mut self, source: TapSource) {
            log::debug!("Tap ({:?}) in {:?}", source, self.session.phase());
            let events = self.session.tap();
            self.handle_events(&events);
        }

        fn on_tick(&mut self) {
            let events = self.session.step();
            self.handle_events(&events);
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            self.audio.play_events(events);
            for event in events {
                if let GameEvent::Fell { score, new_best } = event {
                    log::info!(
                        "Round over: score {}, gems {}{}",
                        score,
                        self.session.state().gems,
                        if *new_best { " (new best)" } else { "" }
                    );
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let state = self.session.state();
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let viewport = Viewport::following(state);
            let vertices = build_scene(state, self.session.tuning(), &viewport);
            match render_state.render(&vertices, &viewport) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.session.state();
            let playing = state.phase == GamePhase::Playing;

            set_text(document, "score", &state.score.to_string());
            set_text(document, "gems", &state.gems.to_string());
            set_visible(document, "gems-item", state.gems > 0);

            set_text(document, "direction", state.ball.direction.glyph());
            set_visible(
                document,
                "direction",
                playing && self.settings.direction_indicator,
            );

            set_text(document, "best", &state.best_score.to_string());
            set_visible(
                document,
                "best-item",
                self.settings.show_best && state.best_score > 0,
            );

            set_visible(document, "menu", state.phase == GamePhase::Menu);

            let over = state.phase == GamePhase::Over;
            set_visible(document, "game-over", over);
            if over {
                set_text(document, "final-score", &state.score.to_string());
                set_text(document, "final-gems", &state.gems.to_string());
                set_visible(document, "new-best", state.new_best);
            }
        }

        /// Stop ticking while the page sits in the back/forward cache
        fn suspend(&mut self) {
            if self.gate.shutdown() == TimerAction::Stop {
                if let Some(timer) = self.timer.as_mut() {
                    timer.cancel();
                }
                log::info!("Tick timer suspended");
            }
        }

        /// Stop the timer and drop listeners; the page is going away
        fn teardown(&mut self) {
            if self.gate.shutdown() == TimerAction::Stop {
                log::info!("Stopping tick timer");
            }
            self.timer = None;
            self.listeners = None;
            self.alive = false;
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Start or stop the tick timer to match the current phase
    fn sync_timer(game: &Rc<RefCell<Game>>) {
        let action = {
            let mut g = game.borrow_mut();
            let phase = g.session.phase();
            g.gate.sync(phase)
        };

        match action {
            TimerAction::Start => {
                let weak = Rc::downgrade(game);
                let started = IntervalTimer::start(TICK_MS, move || {
                    if let Some(game) = weak.upgrade() {
                        game.borrow_mut().on_tick();
                        sync_timer(&game);
                    }
                });
                match started {
                    // Replacing drops the previous (already cancelled) interval
                    Ok(timer) => game.borrow_mut().timer = Some(timer),
                    Err(e) => log::error!("Failed to start tick timer: {:?}", e),
                }
            }
            TimerAction::Stop => {
                // Cancel only: this may run inside the timer's own callback
                if let Some(timer) = game.borrow_mut().timer.as_mut() {
                    timer.cancel();
                }
            }
            TimerAction::Keep => {}
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if !g.alive {
                return;
            }
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn setup_page_lifecycle(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let persisted = event
                .dyn_ref::<web_sys::PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            match page_action(&event.type_(), persisted) {
                PageAction::Suspend => game.borrow_mut().suspend(),
                PageAction::Resume => {
                    log::info!("Restored from page cache");
                    sync_timer(&game);
                }
                PageAction::Teardown => game.borrow_mut().teardown(),
                PageAction::Ignore => {}
            }
        });
        for name in ["pagehide", "pageshow"] {
            window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        }
        closure.forget();
        Ok(())
    }

    async fn init_renderer(canvas: HtmlCanvasElement, width: u32, height: u32) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas)) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return None;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => Some(render_state),
            Err(e) => {
                log::error!("Failed to get device: {}", e);
                None
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        // A second init (hot reload) is harmless
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Zigzag starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a canvas"))?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        let render_state = init_renderer(canvas, width, height).await;
        if render_state.is_none() {
            log::warn!("Running without a renderer");
        }
        game.borrow_mut().render_state = render_state;

        let weak = Rc::downgrade(&game);
        let listeners = TapListeners::register(move |source| {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().on_tap(source);
                sync_timer(&game);
            }
        })?;
        game.borrow_mut().listeners = Some(listeners);

        setup_page_lifecycle(game.clone())?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        request_animation_frame(game);

        log::info!("Zigzag running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use zigzag::audio::AudioManager;
    use zigzag::sim::{GameEvent, GamePhase, TickInput};
    use zigzag::{Session, Settings, Tuning};

    /// Headless zigzag runner: plays seeded rounds without a window
    #[derive(Debug, Parser)]
    #[command(name = "zigzag", version, about)]
    pub struct Args {
        /// Path seed; random when omitted
        #[arg(long)]
        pub seed: Option<u64>,
        /// Tuning overrides (JSON)
        #[arg(long)]
        pub tuning: Option<PathBuf>,
        /// Player settings (JSON)
        #[arg(long)]
        pub settings: Option<PathBuf>,
        /// Rounds to play in one session
        #[arg(long, default_value_t = 1)]
        pub rounds: u32,
        /// Tap at every corner instead of never tapping
        #[arg(long)]
        pub autopilot: bool,
        /// Give up on a round after this many ticks
        #[arg(long, default_value_t = 100_000)]
        pub max_ticks: u64,
    }

    /// Outcome of one headless round
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RoundReport {
        pub score: u32,
        pub gems: u32,
        pub ticks: u64,
        pub fell: bool,
    }

    pub fn run(args: Args) -> Result<()> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        let settings = match &args.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };

        let mut session = Session::new(args.seed.unwrap_or_else(rand::random), tuning);
        log::info!("Seed {}, {} round(s)", session.seed(), args.rounds);

        let mut audio = AudioManager::from_settings(&settings);

        for round in 1..=args.rounds {
            let report = play_round(&mut session, &mut audio, args.autopilot, args.max_ticks);
            if !report.fell {
                log::warn!("Round {} hit the tick limit", round);
            }
            println!(
                "round {}: score {} gems {} ticks {}",
                round, report.score, report.gems, report.ticks
            );
        }
        println!("{}", summary(&session));
        Ok(())
    }

    /// Closing line: the seed to replay the session with, and its best score
    pub fn summary(session: &Session) -> String {
        format!("seed {} best {}", session.seed(), session.state().best_score)
    }

    /// Start a round and tick until the ball falls or `max_ticks` pass
    pub fn play_round(
        session: &mut Session,
        audio: &mut AudioManager,
        autopilot: bool,
        max_ticks: u64,
    ) -> RoundReport {
        let events = session.tap();
        audio.play_events(&events);

        let mut ticks = 0;
        let mut fell = false;
        while session.phase() == GamePhase::Playing && ticks < max_ticks {
            let input = TickInput {
                tap: autopilot && session.autopilot_wants_tap(),
            };
            let events = session.tick(&input);
            audio.play_events(&events);
            fell |= events.iter().any(|e| matches!(e, GameEvent::Fell { .. }));
            ticks += 1;
        }

        let state = session.state();
        RoundReport {
            score: state.score,
            gems: state.gems,
            ticks,
            fell,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_never_tapping_falls_quickly() {
            let mut session = Session::new(11, Tuning::default());
            let mut audio = AudioManager::new();
            let report = play_round(&mut session, &mut audio, false, 10_000);
            assert!(report.fell);
            assert!(report.ticks < 10_000);
            assert_eq!(session.phase(), GamePhase::Over);
        }

        #[test]
        fn test_tick_limit_stops_autopilot() {
            let mut session = Session::new(3, Tuning::default());
            let mut audio = AudioManager::new();
            let report = play_round(&mut session, &mut audio, true, 500);
            assert!(!report.fell);
            assert_eq!(report.ticks, 500);
            assert_eq!(session.phase(), GamePhase::Playing);
        }

        #[test]
        fn test_summary_names_seed_and_best() {
            let mut session = Session::new(4242, Tuning::default());
            let mut audio = AudioManager::new();
            play_round(&mut session, &mut audio, false, 10_000);
            let best = session.state().best_score;
            assert_eq!(summary(&session), format!("seed 4242 best {}", best));
        }

        #[test]
        fn test_args_parse() {
            let args = Args::parse_from(["zigzag", "--seed", "7", "--rounds", "3", "--autopilot"]);
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.rounds, 3);
            assert!(args.autopilot);
            assert_eq!(args.max_ticks, 100_000);
            assert!(args.tuning.is_none());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();

    let args = headless::Args::parse();
    if let Err(e) = headless::run(args) {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
