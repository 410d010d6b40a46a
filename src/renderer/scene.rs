//! Scene geometry from game state
//!
//! Builds colored triangles in world pixels; `Viewport` maps them to NDC
//! with the camera offset and letterboxing applied.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::{BALL_SIZE, VIEW_HEIGHT, VIEW_WIDTH};
use crate::sim::{GamePhase, GameState};
use crate::tuning::Tuning;

/// Circle tessellation for the ball
const BALL_SEGMENTS: u32 = 24;
/// Height of the darker strip along a tile's bottom edge
const TILE_EDGE: f32 = 4.0;

/// Visible window onto the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Play field size in world pixels
    pub size: Vec2,
    /// Vertical scroll (world y at the top of the view)
    pub camera_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
            camera_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn following(state: &GameState) -> Self {
        Self {
            camera_y: state.camera_y,
            ..Self::default()
        }
    }

    /// Whether a horizontal band [top, bottom] overlaps the view
    pub fn shows_rows(&self, top: f32, bottom: f32) -> bool {
        bottom >= self.camera_y && top <= self.camera_y + self.size.y
    }

    /// Convert world pixels to normalized device coordinates
    ///
    /// World y grows downward; the play field is letterboxed to keep its
    /// aspect ratio on any surface.
    pub fn to_ndc(&self, p: Vec2, surface: (u32, u32)) -> Vec2 {
        let local = Vec2::new(p.x, p.y - self.camera_y);
        let half = self.size / 2.0;
        let mut ndc = Vec2::new((local.x - half.x) / half.x, (half.y - local.y) / half.y);

        let (w, h) = surface;
        if w > 0 && h > 0 {
            let surface_aspect = w as f32 / h as f32;
            let view_aspect = self.size.x / self.size.y;
            if surface_aspect > view_aspect {
                // Wider than the field: pillarbox
                ndc.x *= view_aspect / surface_aspect;
            } else {
                // Taller than the field: letterbox
                ndc.y *= surface_aspect / view_aspect;
            }
        }
        ndc
    }
}

/// Triangles for every visible tile, gem and (while playing) the ball
pub fn build_scene(state: &GameState, tuning: &Tuning, viewport: &Viewport) -> Vec<Vertex> {
    let size = tuning.tile_size;
    let mut vertices = Vec::new();

    for tile in &state.path.tiles {
        if !viewport.shows_rows(tile.pos.y, tile.pos.y + size) {
            continue;
        }
        vertices.extend(shapes::rect(
            tile.pos - Vec2::splat(2.0),
            Vec2::splat(size + 4.0),
            colors::TILE_GLOW,
        ));
        vertices.extend(shapes::rect(tile.pos, Vec2::splat(size), colors::TILE));
        vertices.extend(shapes::rect(
            tile.pos + Vec2::new(0.0, size - TILE_EDGE),
            Vec2::new(size, TILE_EDGE),
            colors::TILE_EDGE,
        ));
        if tile.gem {
            vertices.extend(shapes::diamond(
                tile.center(size),
                size * 0.2,
                size * 0.28,
                colors::GEM,
            ));
        }
    }

    if state.phase == GamePhase::Playing {
        let r = BALL_SIZE / 2.0;
        vertices.extend(shapes::ring(
            state.ball.pos,
            r,
            r * 1.6,
            colors::BALL_GLOW,
            BALL_SEGMENTS,
        ));
        vertices.extend(shapes::circle(
            state.ball.pos,
            r,
            colors::BALL,
            BALL_SEGMENTS,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Direction, Path, Tile};

    fn state_with(tiles: Vec<Tile>, phase: GamePhase) -> GameState {
        GameState {
            phase,
            path: Path {
                tiles,
                heading: Direction::Right,
            },
            ..GameState::default()
        }
    }

    #[test]
    fn test_ndc_corners() {
        let vp = Viewport::default();
        let surface = (320, 500);
        assert_eq!(vp.to_ndc(Vec2::ZERO, surface), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.to_ndc(Vec2::new(320.0, 500.0), surface), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_ndc_camera_and_pillarbox() {
        let vp = Viewport {
            camera_y: 100.0,
            ..Viewport::default()
        };
        // Twice as wide as the field's aspect: x squeezed by half
        let surface = (1280, 1000);
        let p = vp.to_ndc(Vec2::new(320.0, 100.0), surface);
        assert_eq!(p, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_offscreen_tiles_culled() {
        let tuning = Tuning::default();
        let tiles = vec![
            Tile::new(Vec2::new(150.0, 100.0), false),
            Tile::new(Vec2::new(150.0, 2000.0), false),
        ];
        let state = state_with(tiles, GamePhase::Over);
        let vertices = build_scene(&state, &tuning, &Viewport::default());
        // Glow, body and edge strip for the one visible tile
        assert_eq!(vertices.len(), 18);
    }

    #[test]
    fn test_ball_and_gem_drawn() {
        let tuning = Tuning::default();
        let tiles = vec![Tile::new(Vec2::new(150.0, 100.0), true)];
        let over = build_scene(
            &state_with(tiles.clone(), GamePhase::Over),
            &tuning,
            &Viewport::default(),
        );
        let playing = build_scene(
            &state_with(tiles, GamePhase::Playing),
            &tuning,
            &Viewport::default(),
        );

        assert_eq!(over.len(), 18 + 6);
        assert_eq!(
            playing.len(),
            over.len() + (BALL_SEGMENTS * 6 + BALL_SEGMENTS * 3) as usize
        );
        assert!(playing.iter().any(|v| v.color == colors::BALL));
    }
}
