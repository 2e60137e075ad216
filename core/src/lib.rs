#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilepush puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world resolves those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. It also carries the tile-code conventions and
//! the pure box-color to target/anchor mapping shared by the level decoder
//! and the move resolver.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tilepush.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a decoded level layout as the active board.
    LoadLevel {
        /// Fully decoded level ready for play.
        layout: LevelLayout,
    },
    /// Requests that the player take one step in the specified direction.
    ///
    /// The world resolves the complete effect of the step (pushed box,
    /// chained slide continuations, hole consumption, color cycling, and
    /// scoring) before returning. Illegal moves mutate nothing and emit no
    /// events.
    MovePlayer {
        /// Direction of the attempted step.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level layout was installed.
    LevelLoaded {
        /// Number of the level that became active.
        level: LevelNumber,
    },
    /// Confirms that the player moved between two cells.
    ///
    /// Slide continuations emit one event per traversed cell, in order.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after the move.
        to: CellCoord,
    },
    /// Confirms that a box was pushed one cell.
    BoxPushed {
        /// Identifier of the pushed box.
        box_id: BoxId,
        /// Cell the box occupied before the push.
        from: CellCoord,
        /// Cell the box occupies after the push.
        to: CellCoord,
    },
    /// Reports that a Change-mode push cycled a box to its next color.
    BoxRecolored {
        /// Identifier of the recolored box.
        box_id: BoxId,
        /// Color the box carried before the push.
        from: BoxColor,
        /// Color assigned to the box for scoring and display.
        to: BoxColor,
    },
    /// Reports that a box newly covers the target matching its color.
    ///
    /// Drives the "box settled" audio cue and the anchored visual state.
    BoxSettled {
        /// Identifier of the settled box.
        box_id: BoxId,
        /// Color whose score was incremented.
        color: BoxColor,
    },
    /// Reports that a box left the target it had been covering.
    BoxUnsettled {
        /// Identifier of the box that reverted to its unanchored state.
        box_id: BoxId,
    },
    /// Reports that a hole tile consumed a box.
    ///
    /// The hole becomes passable empty floor after consuming exactly one box.
    BoxConsumed {
        /// Identifier of the destroyed box.
        box_id: BoxId,
        /// Cell whose material changed from hole to empty.
        cell: CellCoord,
    },
    /// Reports that a hole tile swallowed the player.
    ///
    /// The player becomes invisible and ignores further input until a new
    /// level is loaded.
    PlayerSwallowed {
        /// Cell containing the hole that swallowed the player.
        cell: CellCoord,
    },
    /// Announces that every non-solid color reached full target coverage.
    ///
    /// The world latches the solved state and ignores further movement until
    /// the next [`Command::LoadLevel`].
    LevelSolved {
        /// Number of the completed level.
        level: LevelNumber,
    },
}

/// Directions the player may attempt to move in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Unit offset applied to a cell when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that stepping off the board produces an
/// out-of-bounds coordinate rather than wrapping; lookups fail closed as
/// [`Material::Wall`] for such cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the neighboring cell one step away in the provided direction.
    #[must_use]
    pub const fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            column: self.column + dx,
            row: self.row + dy,
        }
    }
}

/// Unique identifier assigned to a box for the lifetime of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u32);

impl BoxId {
    /// Creates a new box identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based number identifying a level within a level set.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelNumber(u32);

impl LevelNumber {
    /// Creates a new level number wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Describes how box colors behave over a level's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Box colors are fixed for the lifetime of the level.
    #[default]
    Normal,
    /// Every push cycles the box to the next color in the level's palette.
    Change,
}

/// Colors a box may carry.
///
/// `Solid` is the colorless variant: it has no matching target or anchor,
/// never scores, and never participates in the completion check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoxColor {
    /// Orange box, scored on orange targets.
    Orange,
    /// Red box, scored on red targets.
    Red,
    /// Blue box, scored on blue targets.
    Blue,
    /// Green box, scored on green targets.
    Green,
    /// Grey box, scored on grey targets.
    Grey,
    /// Colorless box that occupies space but never scores.
    Solid,
}

impl BoxColor {
    /// All colors that participate in target scoring, in ascending code order.
    pub const SCORING: [Self; 5] = [Self::Orange, Self::Red, Self::Blue, Self::Green, Self::Grey];

    /// Tile code used for this box color in level data.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Orange => 6,
            Self::Red => 7,
            Self::Blue => 8,
            Self::Green => 9,
            Self::Grey => 10,
            Self::Solid => 36,
        }
    }

    /// Decodes a box color from its tile code.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            6 => Some(Self::Orange),
            7 => Some(Self::Red),
            8 => Some(Self::Blue),
            9 => Some(Self::Green),
            10 => Some(Self::Grey),
            36 => Some(Self::Solid),
            _ => None,
        }
    }

    /// Target color this box must cover to score, if any.
    #[must_use]
    pub const fn target_color(self) -> Option<TargetColor> {
        match self {
            Self::Orange => Some(TargetColor::Orange),
            Self::Red => Some(TargetColor::Red),
            Self::Blue => Some(TargetColor::Blue),
            Self::Green => Some(TargetColor::Green),
            Self::Grey => Some(TargetColor::Grey),
            Self::Solid => None,
        }
    }

    /// Anchor visual shown when this box covers its matching target, if any.
    #[must_use]
    pub const fn anchor_color(self) -> Option<AnchorColor> {
        match self {
            Self::Orange => Some(AnchorColor::Orange),
            Self::Red => Some(AnchorColor::Red),
            Self::Blue => Some(AnchorColor::Blue),
            Self::Green => Some(AnchorColor::Green),
            Self::Grey => Some(AnchorColor::Grey),
            Self::Solid => None,
        }
    }

    /// Reports whether this is the colorless solid variant.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Solid)
    }
}

/// Colors a target tile may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetColor {
    /// Target matched by orange boxes.
    Orange,
    /// Target matched by red boxes.
    Red,
    /// Target matched by blue boxes.
    Blue,
    /// Target matched by green boxes.
    Green,
    /// Target matched by grey boxes.
    Grey,
}

impl TargetColor {
    /// Tile code used for this target color in level data.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Orange => 25,
            Self::Red => 38,
            Self::Blue => 51,
            Self::Green => 64,
            Self::Grey => 77,
        }
    }

    /// Decodes a target color from its tile code.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            25 => Some(Self::Orange),
            38 => Some(Self::Red),
            51 => Some(Self::Blue),
            64 => Some(Self::Green),
            77 => Some(Self::Grey),
            _ => None,
        }
    }
}

/// Visual frame shown for a box anchored on its matching target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnchorColor {
    /// Anchor frame for orange boxes.
    Orange,
    /// Anchor frame for red boxes.
    Red,
    /// Anchor frame for blue boxes.
    Blue,
    /// Anchor frame for green boxes.
    Green,
    /// Anchor frame for grey boxes.
    Grey,
}

/// Material occupying a single board cell.
///
/// Materials are immutable per level once loaded, with one exception: a
/// [`Material::Hole`] becomes [`Material::Empty`] after consuming a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Material {
    /// Plain passable floor.
    #[default]
    Empty,
    /// Impassable wall; also the fail-closed value for out-of-bounds cells.
    Wall,
    /// Floor tile that scores a box of the matching color.
    Target(TargetColor),
    /// Floor tile that forces an entity landing on it to keep moving.
    Slide,
    /// Floor tile that consumes the first box or player entering it.
    Hole,
}

/// Tile-code conventions used by level data files.
pub mod tile {
    use super::{BoxColor, Material, TargetColor};

    /// Code for plain empty floor.
    pub const EMPTY: u16 = 0;
    /// Code for an impassable wall tile.
    pub const WALL: u16 = 100;
    /// Code for a slide tile.
    pub const SLIDE: u16 = 39;
    /// Code for a hole tile.
    pub const HOLE: u16 = 11;
    /// Code marking the player spawn cell.
    pub const PLAYER_SPAWN: u16 = 52;
    /// Codes above this threshold encode a box pre-placed on a target.
    pub const MIXIN_THRESHOLD: u16 = 105;

    /// Decodes a plain material tile code.
    ///
    /// Box, player-spawn, and mixin codes are entity encodings rather than
    /// materials and return `None` here.
    #[must_use]
    pub const fn material_from_code(code: u16) -> Option<Material> {
        if let Some(target) = TargetColor::from_code(code) {
            return Some(Material::Target(target));
        }
        match code {
            EMPTY => Some(Material::Empty),
            WALL => Some(Material::Wall),
            SLIDE => Some(Material::Slide),
            HOLE => Some(Material::Hole),
            _ => None,
        }
    }

    /// Decodes a mixin code of the form `box_color * 100 + target_color`.
    ///
    /// Mixin codes place a box of the decoded color on a target of the
    /// decoded color at load time. Codes at or below the threshold and codes
    /// whose components are not valid box/target colors return `None`.
    #[must_use]
    pub const fn decode_mixin(code: u16) -> Option<(BoxColor, TargetColor)> {
        if code <= MIXIN_THRESHOLD {
            return None;
        }
        let box_color = match BoxColor::from_code(code / 100) {
            Some(color) => color,
            None => return None,
        };
        let target_color = match TargetColor::from_code(code % 100) {
            Some(color) => color,
            None => return None,
        };
        Some((box_color, target_color))
    }
}

/// Box pre-placed by a level layout at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxSeed {
    /// Color the box starts with.
    pub color: BoxColor,
    /// Cell the box occupies at load time.
    pub cell: CellCoord,
    /// Whether the box already covers its matching target (mixin encoding).
    pub anchored: bool,
}

/// Fully decoded level ready to be installed into the world.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelLayout {
    /// Number of the level within its set.
    pub level: LevelNumber,
    /// Display title carried into the progress record.
    pub title: String,
    /// Number of columns in the board grid.
    pub columns: u32,
    /// Number of rows in the board grid.
    pub rows: u32,
    /// Row-major materials grid of `columns * rows` cells.
    pub materials: Vec<Material>,
    /// Boxes pre-placed by the level.
    pub boxes: Vec<BoxSeed>,
    /// Cell the player spawns in.
    pub player: CellCoord,
    /// Color behavior for this level.
    pub mode: GameMode,
}
