#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilepush adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use tilepush_core::{BoxColor, BoxId, CellCoord, Direction, GameMode, LevelNumber, Material};
use std::{error::Error, fmt, time::Duration};

/// Duration over which a single-cell translation is tweened.
pub const MOVE_TWEEN: Duration = Duration::from_millis(500);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Shared palette so every backend colors the board identically.
pub mod palette {
    use super::Color;
    use tilepush_core::{BoxColor, TargetColor};

    /// Solid color used to clear each frame.
    pub const BACKGROUND: Color = Color::from_rgb_u8(24, 24, 32);
    /// Fill used for wall cells.
    pub const WALL: Color = Color::from_rgb_u8(84, 84, 96);
    /// Fill used for plain floor cells.
    pub const FLOOR: Color = Color::from_rgb_u8(40, 40, 52);
    /// Fill used for slide cells.
    pub const SLIDE: Color = Color::from_rgb_u8(96, 160, 192);
    /// Fill used for hole cells.
    pub const HOLE: Color = Color::from_rgb_u8(12, 12, 16);
    /// Fill used for the player.
    pub const PLAYER: Color = Color::from_rgb_u8(240, 240, 240);
    /// Grid line color.
    pub const GRID_LINE: Color = Color::from_rgb_u8(56, 56, 68);

    /// Fill for a box of the provided color.
    #[must_use]
    pub const fn box_fill(color: BoxColor) -> Color {
        match color {
            BoxColor::Orange => Color::from_rgb_u8(232, 144, 48),
            BoxColor::Red => Color::from_rgb_u8(208, 64, 64),
            BoxColor::Blue => Color::from_rgb_u8(64, 112, 224),
            BoxColor::Green => Color::from_rgb_u8(72, 176, 88),
            BoxColor::Grey => Color::from_rgb_u8(144, 144, 152),
            BoxColor::Solid => Color::from_rgb_u8(104, 88, 72),
        }
    }

    /// Fill for a target of the provided color, faded from the box fill.
    #[must_use]
    pub fn target_fill(color: TargetColor) -> Color {
        let base = match color {
            TargetColor::Orange => box_fill(BoxColor::Orange),
            TargetColor::Red => box_fill(BoxColor::Red),
            TargetColor::Blue => box_fill(BoxColor::Blue),
            TargetColor::Green => box_fill(BoxColor::Green),
            TargetColor::Grey => box_fill(BoxColor::Grey),
        };
        base.lighten(0.45)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directional press detected on this frame, if any.
    pub direction: Option<Direction>,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
    /// Whether the adapter detected a next-level request on this frame.
    pub next_level: bool,
    /// Whether the adapter detected a previous-level request on this frame.
    pub previous_level: bool,
    /// Whether the adapter detected an exit request on this frame.
    pub quit: bool,
}

/// Describes the square cell grid that composes the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `cell_length` is not positive.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if cell_length <= f32::EPSILON {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_length,
            (cell.row() as f32 + 0.5) * self.cell_length,
        )
    }
}

/// Single board cell paired with the material it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePresentation {
    /// Cell the material occupies.
    pub cell: CellCoord,
    /// Material drawn at the cell.
    pub material: Material,
}

impl TilePresentation {
    /// Creates a new tile descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, material: Material) -> Self {
        Self { cell, material }
    }
}

/// Box rendered as a filled square scaled to a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxPresentation {
    /// Identifier of the box within the world.
    pub id: BoxId,
    /// Color of the box body.
    pub color: BoxColor,
    /// Cell the box rests on.
    pub cell: CellCoord,
    /// Whether the box covers its matching target.
    pub anchored: bool,
}

impl BoxPresentation {
    /// Creates a new box descriptor.
    #[must_use]
    pub const fn new(id: BoxId, color: BoxColor, cell: CellCoord, anchored: bool) -> Self {
        Self {
            id,
            color,
            cell,
            anchored,
        }
    }
}

/// Player rendered as a filled circle scaled to a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerPresentation {
    /// Cell the player occupies.
    pub cell: CellCoord,
    /// Whether the player should be drawn at all.
    pub visible: bool,
}

impl PlayerPresentation {
    /// Creates a new player descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, visible: bool) -> Self {
        Self { cell, visible }
    }
}

/// Entity whose translation an animation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationSubject {
    /// The player avatar.
    Player,
    /// The box with the provided identifier.
    Box(BoxId),
}

/// One-cell translation tweened over [`MOVE_TWEEN`].
///
/// Chained slide continuations produce one animation per traversed cell;
/// backends play them back to back in the order received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveAnimation {
    /// Entity being translated.
    pub subject: AnimationSubject,
    /// Cell the entity departed.
    pub from: CellCoord,
    /// Cell the entity arrives at.
    pub to: CellCoord,
}

impl MoveAnimation {
    /// Creates a new translation descriptor.
    #[must_use]
    pub const fn new(subject: AnimationSubject, from: CellCoord, to: CellCoord) -> Self {
        Self { subject, from, to }
    }

    /// Interpolated world-space position for progress in `0.0..=1.0`.
    #[must_use]
    pub fn position_at(&self, grid: &TileGridPresentation, progress: f32) -> Vec2 {
        let progress = progress.clamp(0.0, 1.0);
        let from = grid.cell_center(self.from);
        let to = grid.cell_center(self.to);
        from.lerp(to, progress)
    }
}

/// Per-color score line displayed by the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreLine {
    /// Color the line reports on.
    pub color: BoxColor,
    /// Boxes of the color currently covering matching targets.
    pub anchored: u32,
    /// Boxes of the color alive on the board.
    pub total: u32,
}

/// Textual state drawn alongside the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Banner line shown above the board.
    pub banner: String,
    /// Number of the active level.
    pub level: LevelNumber,
    /// Title of the active level.
    pub title: String,
    /// Color behavior of the active level.
    pub mode: GameMode,
    /// Steps taken so far in the active level.
    pub steps: u32,
    /// Score lines in ascending color-code order.
    pub scores: Vec<ScoreLine>,
    /// Whether the level has been solved.
    pub solved: bool,
}

/// Scene description combining the board, its inhabitants, and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Cell grid that composes the board.
    pub grid: TileGridPresentation,
    /// Materials drawn beneath boxes and player.
    pub tiles: Vec<TilePresentation>,
    /// Boxes currently alive on the board.
    pub boxes: Vec<BoxPresentation>,
    /// The player avatar.
    pub player: PlayerPresentation,
    /// Pending translations for the backend to tween, oldest first.
    pub animations: Vec<MoveAnimation>,
    /// Textual state drawn alongside the board.
    pub hud: HudPresentation,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Report the backend hands the frame callback about tween playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AnimationStatus {
    /// Whether the backend finished every pending animation since the last frame.
    pub completed: bool,
}

/// Rendering backend capable of presenting Tilepush scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and the backend's animation
    /// playback status, and may mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, AnimationStatus, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cell length must be positive to avoid a zero-sized board.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
