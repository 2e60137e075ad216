#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tilepush.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use tilepush_core::{Direction, Material};
use tilepush_rendering::{
    palette, AnimationStatus, AnimationSubject, BoxPresentation, FrameInput, MoveAnimation,
    Presentation, RenderingBackend, Scene, TileGridPresentation, MOVE_TWEEN,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// Arrow keys or `WASD` to step the player.
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    /// `R` restarts the current level.
    restart: bool,
    /// `N` advances to the next level.
    next_level: bool,
    /// `P` returns to the previous level.
    previous_level: bool,
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            up: is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W),
            down: is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S),
            left: is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A),
            right: is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D),
            restart: is_key_pressed(KeyCode::R),
            next_level: is_key_pressed(KeyCode::N),
            previous_level: is_key_pressed(KeyCode::P),
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

fn frame_input_from_observations(keyboard: KeyboardShortcuts) -> FrameInput {
    // Vertical presses win over horizontal when both land on one frame, so
    // diagonal chords resolve deterministically.
    let direction = if keyboard.up {
        Some(Direction::Up)
    } else if keyboard.down {
        Some(Direction::Down)
    } else if keyboard.left {
        Some(Direction::Left)
    } else if keyboard.right {
        Some(Direction::Right)
    } else {
        None
    };

    FrameInput {
        direction,
        restart: keyboard.restart,
        next_level: keyboard.next_level,
        previous_level: keyboard.previous_level,
        quit: keyboard.quit_requested,
    }
}

/// Sequential tween playback over the scene's pending translations.
///
/// Animations play oldest first, each over [`MOVE_TWEEN`]; leftover frame time
/// spills into the next animation so long slide chains keep a steady pace.
#[derive(Debug, Default)]
struct AnimationQueue {
    pending: VecDeque<MoveAnimation>,
    elapsed: Duration,
}

impl AnimationQueue {
    /// Takes ownership of the scene's freshly emitted translations.
    fn absorb(&mut self, animations: &mut Vec<MoveAnimation>) {
        self.pending.extend(animations.drain(..));
    }

    /// Advances playback and reports whether the queue drained on this frame.
    fn advance(&mut self, dt: Duration) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        self.elapsed += dt;
        while self.elapsed >= MOVE_TWEEN {
            self.elapsed -= MOVE_TWEEN;
            let _ = self.pending.pop_front();
            if self.pending.is_empty() {
                self.elapsed = Duration::ZERO;
                return true;
            }
        }

        false
    }

    /// Interpolated position of the subject if it is currently tweening.
    ///
    /// Later queued translations of the same subject pin it at their start
    /// cell until their turn comes.
    fn position_of(&self, subject: AnimationSubject, grid: &TileGridPresentation) -> Option<Vec2> {
        for (index, animation) in self.pending.iter().enumerate() {
            if animation.subject != subject {
                continue;
            }
            let progress = if index == 0 {
                self.elapsed.as_secs_f32() / MOVE_TWEEN.as_secs_f32()
            } else {
                0.0
            };
            return Some(animation.position_at(grid, progress));
        }
        None
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second average once one
    /// second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = if seconds <= f32::EPSILON {
            0.0
        } else {
            self.frames as f32 / seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, AnimationStatus, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut queue = AnimationQueue::default();
            let mut completed_last_frame = false;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                let frame_input = frame_input_from_observations(keyboard);
                if frame_input.quit {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let status = AnimationStatus {
                    completed: completed_last_frame,
                };
                update_scene(frame_dt, frame_input, status, &mut scene);
                queue.absorb(&mut scene.animations);
                completed_last_frame = queue.advance(frame_dt);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                let render_start = Instant::now();
                draw_tiles(&scene, &metrics);
                draw_grid_lines(&scene, &metrics);
                draw_boxes(&scene, &metrics, &queue);
                draw_player(&scene, &metrics, &queue);
                draw_hud(&scene, &metrics);
                let render_duration = render_start.elapsed();

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        println!(
                            "FPS: {per_second:.2} | render: {:>6.2}ms",
                            render_duration.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen-space placement of the scene computed once per frame.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    cell_step: f32,
}

const HUD_STRIP_HEIGHT: f32 = 72.0;

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let world_width = scene.grid.width();
        let world_height = scene.grid.height();
        let available_height = (screen_height - HUD_STRIP_HEIGHT).max(0.0);

        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(available_height / world_height)
        };

        let scaled_width = world_width * scale;
        let scaled_height = world_height * scale;
        let offset_x = ((screen_width - scaled_width) * 0.5).max(0.0);
        let offset_y = HUD_STRIP_HEIGHT + ((available_height - scaled_height) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
            cell_step: scene.grid.cell_length * scale,
        }
    }

    /// Maps a world-space point onto the screen.
    fn project(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }
}

fn draw_tiles(scene: &Scene, metrics: &SceneMetrics) {
    for tile in &scene.tiles {
        let fill = match tile.material {
            Material::Empty => palette::FLOOR,
            Material::Wall => palette::WALL,
            Material::Target(color) => palette::target_fill(color),
            Material::Slide => palette::SLIDE,
            Material::Hole => palette::HOLE,
        };
        let origin = metrics.project(Vec2::new(
            tile.cell.column() as f32 * scene.grid.cell_length,
            tile.cell.row() as f32 * scene.grid.cell_length,
        ));
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            metrics.cell_step,
            metrics.cell_step,
            to_macroquad_color(fill),
        );
    }
}

fn draw_grid_lines(scene: &Scene, metrics: &SceneMetrics) {
    let line_color = to_macroquad_color(scene.grid.line_color);
    let width = scene.grid.columns as f32 * metrics.cell_step;
    let height = scene.grid.rows as f32 * metrics.cell_step;

    for column in 0..=scene.grid.columns {
        let x = metrics.offset_x + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(x, metrics.offset_y, x, metrics.offset_y + height, 1.0, line_color);
    }
    for row in 0..=scene.grid.rows {
        let y = metrics.offset_y + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(metrics.offset_x, y, metrics.offset_x + width, y, 1.0, line_color);
    }
}

fn draw_boxes(scene: &Scene, metrics: &SceneMetrics, queue: &AnimationQueue) {
    let inset = metrics.cell_step * 0.08;
    for BoxPresentation {
        id,
        color,
        cell,
        anchored,
    } in &scene.boxes
    {
        let center = queue
            .position_of(AnimationSubject::Box(*id), &scene.grid)
            .unwrap_or_else(|| scene.grid.cell_center(*cell));
        let center = metrics.project(center);
        let fill = if *anchored {
            palette::box_fill(*color).lighten(0.3)
        } else {
            palette::box_fill(*color)
        };
        let side = metrics.cell_step - 2.0 * inset;
        macroquad::shapes::draw_rectangle(
            center.x - side * 0.5,
            center.y - side * 0.5,
            side,
            side,
            to_macroquad_color(fill),
        );
    }
}

fn draw_player(scene: &Scene, metrics: &SceneMetrics, queue: &AnimationQueue) {
    if !scene.player.visible {
        return;
    }

    let center = queue
        .position_of(AnimationSubject::Player, &scene.grid)
        .unwrap_or_else(|| scene.grid.cell_center(scene.player.cell));
    let center = metrics.project(center);
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        metrics.cell_step * 0.35,
        to_macroquad_color(palette::PLAYER),
    );
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let hud = &scene.hud;
    let text_color = to_macroquad_color(palette::PLAYER);
    let left = metrics.offset_x.max(8.0);

    macroquad::text::draw_text(&hud.banner, left, 22.0, 24.0, text_color);

    let mode_tag = match hud.mode {
        tilepush_core::GameMode::Normal => "",
        tilepush_core::GameMode::Change => "  [change]",
    };
    let status = format!(
        "Level {} \"{}\"{mode_tag}  steps: {}",
        hud.level.get(),
        hud.title,
        hud.steps,
    );
    macroquad::text::draw_text(&status, left, 46.0, 20.0, text_color);

    let mut score_line = String::new();
    for line in &hud.scores {
        if !score_line.is_empty() {
            score_line.push_str("  ");
        }
        score_line.push_str(&format!("{:?}: {}/{}", line.color, line.anchored, line.total));
    }
    if hud.solved {
        score_line.push_str("  SOLVED, press N for the next level");
    }
    macroquad::text::draw_text(&score_line, left, 66.0, 20.0, text_color);
}

fn to_macroquad_color(color: tilepush_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::{frame_input_from_observations, AnimationQueue, KeyboardShortcuts, SceneMetrics};
    use glam::Vec2;
    use tilepush_core::{BoxId, CellCoord, Direction, GameMode, LevelNumber, Material};
    use tilepush_rendering::{
        palette, AnimationSubject, HudPresentation, MoveAnimation, PlayerPresentation, Scene,
        TileGridPresentation, TilePresentation, MOVE_TWEEN,
    };

    fn grid() -> TileGridPresentation {
        TileGridPresentation::new(6, 4, 32.0, palette::GRID_LINE).expect("valid grid")
    }

    fn base_scene() -> Scene {
        Scene {
            grid: grid(),
            tiles: vec![TilePresentation::new(CellCoord::new(0, 0), Material::Wall)],
            boxes: Vec::new(),
            player: PlayerPresentation::new(CellCoord::new(1, 1), true),
            animations: Vec::new(),
            hud: HudPresentation {
                banner: String::new(),
                level: LevelNumber::new(1),
                title: String::from("1-1"),
                mode: GameMode::Normal,
                steps: 0,
                scores: Vec::new(),
                solved: false,
            },
        }
    }

    #[test]
    fn vertical_presses_win_over_horizontal_chords() {
        let keyboard = KeyboardShortcuts {
            up: true,
            left: true,
            ..KeyboardShortcuts::default()
        };
        let input = frame_input_from_observations(keyboard);
        assert_eq!(input.direction, Some(Direction::Up));
    }

    #[test]
    fn session_shortcuts_pass_through() {
        let keyboard = KeyboardShortcuts {
            restart: true,
            next_level: true,
            ..KeyboardShortcuts::default()
        };
        let input = frame_input_from_observations(keyboard);
        assert!(input.restart);
        assert!(input.next_level);
        assert!(!input.previous_level);
        assert_eq!(input.direction, None);
    }

    #[test]
    fn queue_reports_completion_only_when_it_drains() {
        let mut queue = AnimationQueue::default();
        let mut animations = vec![
            MoveAnimation::new(
                AnimationSubject::Player,
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
            ),
            MoveAnimation::new(
                AnimationSubject::Player,
                CellCoord::new(2, 1),
                CellCoord::new(3, 1),
            ),
        ];
        queue.absorb(&mut animations);
        assert!(animations.is_empty());

        assert!(!queue.advance(MOVE_TWEEN / 2));
        assert!(!queue.advance(MOVE_TWEEN / 2));
        assert!(queue.advance(MOVE_TWEEN));
        assert!(queue.pending.is_empty());
        assert!(!queue.advance(MOVE_TWEEN));
    }

    #[test]
    fn leftover_frame_time_spills_into_the_next_animation() {
        let mut queue = AnimationQueue::default();
        let mut animations = vec![
            MoveAnimation::new(
                AnimationSubject::Player,
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
            ),
            MoveAnimation::new(
                AnimationSubject::Player,
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
            ),
        ];
        queue.absorb(&mut animations);

        // One and a half tweens: first finishes, second is halfway through.
        assert!(!queue.advance(MOVE_TWEEN + MOVE_TWEEN / 2));
        let position = queue
            .position_of(AnimationSubject::Player, &grid())
            .expect("player is tweening");
        assert_eq!(position, Vec2::new(64.0, 16.0));
    }

    #[test]
    fn queued_subjects_pin_at_their_start_cell_until_their_turn() {
        let mut queue = AnimationQueue::default();
        let mut animations = vec![
            MoveAnimation::new(
                AnimationSubject::Player,
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
            ),
            MoveAnimation::new(
                AnimationSubject::Box(BoxId::new(0)),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
            ),
        ];
        queue.absorb(&mut animations);
        assert!(!queue.advance(MOVE_TWEEN / 2));

        let box_position = queue
            .position_of(AnimationSubject::Box(BoxId::new(0)), &grid())
            .expect("box is queued");
        assert_eq!(box_position, grid().cell_center(CellCoord::new(1, 0)));
    }

    #[test]
    fn idle_queue_defers_to_scene_positions() {
        let queue = AnimationQueue::default();
        assert!(queue
            .position_of(AnimationSubject::Player, &grid())
            .is_none());
    }

    #[test]
    fn metrics_center_the_board_beneath_the_hud_strip() {
        let scene = base_scene();
        let metrics = SceneMetrics::from_scene(&scene, 960.0, 720.0);

        assert!(metrics.scale > 0.0);
        assert!(metrics.offset_y >= super::HUD_STRIP_HEIGHT);
        let projected = metrics.project(Vec2::ZERO);
        assert_eq!(projected, Vec2::new(metrics.offset_x, metrics.offset_y));
    }
}
