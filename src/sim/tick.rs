//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. Taps and
//! ticks are the only inputs; randomness comes from the caller's RNG.

use glam::Vec2;
use rand::Rng;

use super::collision::{gem_in_reach, on_path};
use super::path;
use super::state::{GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Tap (pointer down, touch start or Space) since the last tick
    pub tap: bool,
}

impl TickInput {
    pub const TAP: TickInput = TickInput { tap: true };
}

/// Advance the game by one fixed timestep, applying any tap first
///
/// A tap on the menu or game-over screen only starts the round; the ball
/// first moves on the following tick.
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let was_playing = state.phase == GamePhase::Playing;

    if input.tap {
        tap_into(state, rng, tuning, &mut events);
    }
    if was_playing {
        advance_into(state, rng, tuning, &mut events);
    }

    events
}

/// Handle a tap outside the timer: start a round or flip direction
pub fn apply_tap<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    tap_into(state, rng, tuning, &mut events);
    events
}

/// Move the ball one step without any input
pub fn advance<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    advance_into(state, rng, tuning, &mut events);
    events
}

fn tap_into<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    match state.phase {
        GamePhase::Menu | GamePhase::Over => {
            let path = path::initial_path(rng, tuning);
            state.reset_round(path, tuning);
            log::info!(
                "Round started: {} tiles, {} gems, best {}",
                state.path.len(),
                state.gems_remaining(),
                state.best_score
            );
            events.push(GameEvent::RoundStarted);
        }
        GamePhase::Playing => {
            state.ball.direction = state.ball.direction.flipped();
            events.push(GameEvent::Turned(state.ball.direction));
        }
    }
}

fn advance_into<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let step = Vec2::new(state.ball.direction.sign() * tuning.speed, tuning.speed);
    let next = state.ball.pos + step;

    if !on_path(&state.path.tiles, tuning.tile_size, &tuning.tolerance, next) {
        fall(state, events);
        return;
    }

    state.ball.pos = next;
    state.round_ticks += 1;
    state.camera_y = next.y - tuning.camera_lead;

    for tile in state.path.tiles.iter_mut() {
        if gem_in_reach(tile, tuning.tile_size, tuning.gem_radius, next) {
            tile.gem = false;
            state.gems += 1;
            state.score += tuning.gem_bonus;
            events.push(GameEvent::GemCollected { total: state.gems });
        }
    }

    let distance = state.distance_score(tuning);
    if distance > state.score {
        state.score = distance;
        if distance % tuning.milestone_every == 0 {
            events.push(GameEvent::Milestone { score: distance });
        }
    }

    let needs_more = state
        .path
        .last()
        .is_some_and(|last| next.y > last.pos.y - tuning.lookahead);
    if needs_more {
        path::extend(&mut state.path, rng, tuning);
    }
}

fn fall(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let score = state.score;
    let new_best = score > 0 && score >= state.best_score;

    state.best_score = state.best_score.max(score);
    state.new_best = new_best;
    state.phase = GamePhase::Over;

    log::info!(
        "Fell after {} ticks: score {}, gems {}, best {}{}",
        state.round_ticks,
        score,
        state.gems,
        state.best_score,
        if new_best { " (new best)" } else { "" }
    );
    events.push(GameEvent::Fell { score, new_best });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Ball, Direction, Path, Tile};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Tiles from `start`, each following one step of `steps`
    fn path_from_steps(start: Vec2, steps: &[Direction]) -> Path {
        let mut tiles = vec![Tile::new(start, false)];
        let mut pos = start;
        for dir in steps {
            pos += Vec2::new(dir.sign() * 40.0, 40.0);
            tiles.push(Tile::new(pos, false));
        }
        Path {
            tiles,
            heading: steps.last().copied().unwrap_or_default(),
        }
    }

    fn playing_on(path: Path) -> GameState {
        let tuning = Tuning::default();
        let mut state = GameState::new();
        state.reset_round(path, &tuning);
        state
    }

    fn run(state: &mut GameState, rng: &mut Pcg32, ticks: usize) -> Vec<GameEvent> {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(tick(state, &TickInput::default(), rng, &tuning));
        }
        events
    }

    #[test]
    fn test_tick_menu_to_playing() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut state = GameState::new();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.score, 0);
        assert_eq!(state.gems, 0);

        // Tick without tap - stays on the menu
        let events = tick(&mut state, &TickInput::default(), &mut rng, &tuning);
        assert!(events.is_empty());
        assert_eq!(state.phase, GamePhase::Menu);

        let events = tick(&mut state, &TickInput::TAP, &mut rng, &tuning);
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.path.len(), tuning.initial_length);

        let first = state.path.first().expect("non-empty path");
        assert_eq!(state.ball.pos, first.center(tuning.tile_size));
        assert_eq!(state.ball.direction, Direction::Right);
        assert_eq!(state.camera_y, 0.0);
    }

    #[test]
    fn test_tap_flips_direction() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right; 5],
        ));

        let events = tick(&mut state, &TickInput::TAP, &mut rng, &tuning);
        assert_eq!(events[0], GameEvent::Turned(Direction::Left));
        assert_eq!(state.ball.direction, Direction::Left);
        assert_eq!(state.ball.pos, Vec2::new(166.0, 124.0));
    }

    #[test]
    fn test_falls_off_turn_without_tap() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right, Direction::Left, Direction::Left],
        ));
        state.best_score = 2;

        let events = run(&mut state, &mut rng, 15);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Fell { .. })));
        assert_eq!(state.ball.pos, Vec2::new(230.0, 180.0));

        let events = run(&mut state, &mut rng, 1);
        assert_eq!(state.phase, GamePhase::Over);
        assert_eq!(
            events,
            vec![GameEvent::Fell {
                score: 4,
                new_best: true
            }]
        );
        assert_eq!(state.best_score, 4);
        // Ball stays at its last supported position
        assert_eq!(state.ball.pos, Vec2::new(230.0, 180.0));

        // Further ticks do nothing
        assert!(run(&mut state, &mut rng, 3).is_empty());
    }

    #[test]
    fn test_best_score_not_lowered() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right, Direction::Left, Direction::Left],
        ));
        state.best_score = 50;

        let events = run(&mut state, &mut rng, 40);
        assert_eq!(state.phase, GamePhase::Over);
        assert!(events.contains(&GameEvent::Fell {
            score: 4,
            new_best: false
        }));
        assert_eq!(state.best_score, 50);
        assert!(!state.new_best);
    }

    #[test]
    fn test_timely_tap_follows_turn() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right, Direction::Left, Direction::Left],
        ));

        run(&mut state, &mut rng, 9);
        // Ball reaches the center of tile 1 on this tick's move, so tap on the next
        tick(&mut state, &TickInput::default(), &mut rng, &tuning);
        assert_eq!(state.ball.pos, Vec2::new(210.0, 160.0));
        tick(&mut state, &TickInput::TAP, &mut rng, &tuning);

        run(&mut state, &mut rng, 9);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ball.pos, Vec2::new(170.0, 200.0));
    }

    #[test]
    fn test_gem_collected_once() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut path = path_from_steps(Vec2::new(150.0, 100.0), &[Direction::Right; 6]);
        path.tiles[1].gem = true;
        let mut state = playing_on(path);

        let events = run(&mut state, &mut rng, 5);
        assert!(events.iter().all(|e| !matches!(e, GameEvent::GemCollected { .. })));
        assert_eq!(state.score, 3);

        let events = run(&mut state, &mut rng, 1);
        assert_eq!(events, vec![GameEvent::GemCollected { total: 1 }]);
        assert_eq!(state.gems, 1);
        assert_eq!(state.score, 8);
        assert!(!state.path.tiles[1].gem);

        let events = run(&mut state, &mut rng, 10);
        assert!(events.iter().all(|e| !matches!(e, GameEvent::GemCollected { .. })));
        assert_eq!(state.gems, 1);
        // Distance (floor(184 / 40) = 4) has not caught up with the bonus
        assert_eq!(state.score, 8);
    }

    #[test]
    fn test_milestone_on_tenth_row() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = playing_on(path_from_steps(Vec2::ZERO, &[Direction::Right; 30]));
        state.ball = Ball {
            pos: Vec2::new(380.0, 380.0),
            direction: Direction::Right,
        };
        state.score = 9;

        let events = run(&mut state, &mut rng, 4);
        assert!(events.is_empty());
        let events = run(&mut state, &mut rng, 1);
        assert_eq!(events, vec![GameEvent::Milestone { score: 10 }]);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_path_extends_near_end() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right, Direction::Right],
        ));
        let last = *state.path.last().expect("tiles");

        run(&mut state, &mut rng, 1);
        assert_eq!(state.path.len(), 3 + tuning.extend_length);
        assert_eq!(state.path.tiles[3].pos, last.pos + Vec2::new(40.0, 40.0));
    }

    #[test]
    fn test_never_tapping_ends_round() {
        let tuning = Tuning::default();
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = GameState::new();
            tick(&mut state, &TickInput::TAP, &mut rng, &tuning);

            let mut ticks = 0;
            while state.phase == GamePhase::Playing && ticks < 5_000 {
                tick(&mut state, &TickInput::default(), &mut rng, &tuning);
                ticks += 1;
            }
            assert_eq!(state.phase, GamePhase::Over, "seed {seed} never fell");
        }
    }

    #[test]
    fn test_retry_resets_round_but_keeps_best() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut state = playing_on(path_from_steps(
            Vec2::new(150.0, 100.0),
            &[Direction::Right, Direction::Left],
        ));
        run(&mut state, &mut rng, 40);
        assert_eq!(state.phase, GamePhase::Over);
        let best = state.best_score;
        assert!(best > 0);

        let events = tick(&mut state, &TickInput::TAP, &mut rng, &tuning);
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.gems, 0);
        assert_eq!(state.best_score, best);
        assert_eq!(state.round_ticks, 0);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let inputs = [
            TickInput::TAP,
            TickInput::default(),
            TickInput::default(),
            TickInput::TAP,
            TickInput::default(),
        ];

        let mut state1 = GameState::new();
        let mut state2 = GameState::new();
        let mut rng1 = Pcg32::seed_from_u64(99999);
        let mut rng2 = Pcg32::seed_from_u64(99999);

        for input in &inputs {
            let e1 = tick(&mut state1, input, &mut rng1, &tuning);
            let e2 = tick(&mut state2, input, &mut rng2, &tuning);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.path, state2.path);
        assert_eq!(state1.ball, state2.ball);
        assert_eq!(state1.score, state2.score);
    }

    proptest! {
        #[test]
        fn prop_score_and_gems_monotonic(
            seed in any::<u64>(),
            taps in proptest::collection::vec(any::<bool>(), 1..400),
        ) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = GameState::new();
            tick(&mut state, &TickInput::TAP, &mut rng, &tuning);

            for tap in taps {
                if state.phase != GamePhase::Playing {
                    break;
                }
                let (score, gems) = (state.score, state.gems);
                let events = tick(&mut state, &TickInput { tap }, &mut rng, &tuning);

                prop_assert!(state.score >= score);
                let pickups = events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GemCollected { .. }))
                    .count() as u32;
                prop_assert_eq!(state.gems, gems + pickups);
            }
        }

        #[test]
        fn prop_fall_sets_best_to_max(seed in any::<u64>(), prior_best in 0u32..40) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = GameState::new();
            state.best_score = prior_best;
            tick(&mut state, &TickInput::TAP, &mut rng, &tuning);

            let mut ticks = 0;
            while state.phase == GamePhase::Playing && ticks < 5_000 {
                tick(&mut state, &TickInput::default(), &mut rng, &tuning);
                ticks += 1;
            }
            prop_assert_eq!(state.phase, GamePhase::Over);
            prop_assert_eq!(state.best_score, prior_best.max(state.score));
        }
    }
}
