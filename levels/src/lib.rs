#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level data source for Tilepush.
//!
//! Level sets are JSON documents holding grids of tile codes. This crate
//! parses them, validates the numbering and grid shape, and decodes each
//! grid into the [`LevelLayout`] the world consumes, including the mixin
//! encoding (a box pre-placed on a target via a composite code) and the
//! pixin encoding (the player spawning atop a non-empty tile).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tilepush_core::{
    tile, BoxColor, BoxSeed, CellCoord, GameMode, LevelLayout, LevelNumber, Material,
};

/// Number of the first level in every set.
pub const FIRST_LEVEL: LevelNumber = LevelNumber::new(1);

/// Failures produced while loading or decoding level data.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level set file could not be read.
    #[error("failed to read level set: {0}")]
    Io(#[from] std::io::Error),
    /// The level set document is not valid JSON of the expected shape.
    #[error("failed to parse level set: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but contained no levels.
    #[error("level set is empty")]
    EmptySet,
    /// Level numbers must run consecutively starting at 1.
    #[error("expected level {expected} at position {position}, found level {found}")]
    NonConsecutive {
        /// Level number that should have appeared.
        expected: u32,
        /// Level number actually present.
        found: u32,
        /// Zero-based position within the document.
        position: usize,
    },
    /// A level grid row differs in width from the first row.
    #[error("level {level}: row {row} has {found} columns, expected {expected}")]
    RaggedGrid {
        /// Number of the offending level.
        level: u32,
        /// Zero-based row index.
        row: usize,
        /// Number of columns found in the row.
        found: usize,
        /// Number of columns in the first row.
        expected: usize,
    },
    /// A level grid contains a code with no defined meaning.
    #[error("level {level}: unknown tile code {code}")]
    UnknownTileCode {
        /// Number of the offending level.
        level: u32,
        /// The unrecognized code.
        code: u16,
    },
    /// A level declares no player spawn marker.
    #[error("level {level}: no player spawn")]
    MissingPlayer {
        /// Number of the offending level.
        level: u32,
    },
    /// A level declares more than one player spawn marker.
    #[error("level {level}: more than one player spawn")]
    DuplicatePlayer {
        /// Number of the offending level.
        level: u32,
    },
    /// A pixin code does not decode to a material the player can stand on.
    #[error("level {level}: pixin code {code} is not a material")]
    InvalidPixin {
        /// Number of the offending level.
        level: u32,
        /// The rejected pixin code.
        code: u16,
    },
    /// The requested level number is not part of this set.
    #[error("no level numbered {} in this set", .0.get())]
    UnknownLevel(LevelNumber),
}

/// Raw level definition as authored in the JSON document.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelSpec {
    level: u32,
    title: String,
    #[serde(default)]
    mixin: bool,
    #[serde(default)]
    pixin: Option<u16>,
    #[serde(default)]
    mode: GameMode,
    data: Vec<Vec<u16>>,
}

impl LevelSpec {
    /// Number of the level within its set.
    #[must_use]
    pub fn number(&self) -> LevelNumber {
        LevelNumber::new(self.level)
    }

    /// Display title carried into the progress record.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Color behavior declared for the level.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }
}

/// Ordered, validated collection of levels.
#[derive(Clone, Debug)]
pub struct LevelSet {
    specs: Vec<LevelSpec>,
}

impl LevelSet {
    /// Parses and validates a level set from a JSON document.
    pub fn from_json(document: &str) -> Result<Self, LevelError> {
        let specs: Vec<LevelSpec> = serde_json::from_str(document)?;
        if specs.is_empty() {
            return Err(LevelError::EmptySet);
        }
        for (position, spec) in specs.iter().enumerate() {
            let expected = FIRST_LEVEL.get() + position as u32;
            if spec.level != expected {
                return Err(LevelError::NonConsecutive {
                    expected,
                    found: spec.level,
                    position,
                });
            }
        }
        Ok(Self { specs })
    }

    /// Reads and parses a level set from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, LevelError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_json(&document)
    }

    /// Loads the level set shipped with the game.
    pub fn built_in() -> Result<Self, LevelError> {
        Self::from_json(include_str!("../assets/levels.json"))
    }

    /// Highest level number available in this set.
    #[must_use]
    pub fn highest(&self) -> LevelNumber {
        LevelNumber::new(FIRST_LEVEL.get() + self.specs.len() as u32 - 1)
    }

    /// Clamps a level number into this set's `[first, highest]` range.
    #[must_use]
    pub fn clamp(&self, level: LevelNumber) -> LevelNumber {
        LevelNumber::new(level.get().clamp(FIRST_LEVEL.get(), self.highest().get()))
    }

    /// Retrieves the raw definition of the requested level.
    pub fn get(&self, level: LevelNumber) -> Result<&LevelSpec, LevelError> {
        if level.get() < FIRST_LEVEL.get() {
            return Err(LevelError::UnknownLevel(level));
        }
        self.specs
            .get((level.get() - FIRST_LEVEL.get()) as usize)
            .ok_or(LevelError::UnknownLevel(level))
    }

    /// Iterates over the raw level definitions in order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelSpec> {
        self.specs.iter()
    }

    /// Decodes the requested level into a layout ready for the world.
    pub fn decode(&self, level: LevelNumber) -> Result<LevelLayout, LevelError> {
        decode_spec(self.get(level)?)
    }
}

/// Decodes a raw grid of tile codes into a playable layout.
fn decode_spec(spec: &LevelSpec) -> Result<LevelLayout, LevelError> {
    let rows = spec.data.len();
    let columns = spec.data.first().map_or(0, Vec::len);

    let mut materials = Vec::with_capacity(columns * rows);
    let mut boxes: Vec<BoxSeed> = Vec::new();
    let mut player: Option<CellCoord> = None;

    for (row_index, row) in spec.data.iter().enumerate() {
        if row.len() != columns {
            return Err(LevelError::RaggedGrid {
                level: spec.level,
                row: row_index,
                found: row.len(),
                expected: columns,
            });
        }

        for (column_index, &code) in row.iter().enumerate() {
            let cell = CellCoord::new(column_index as i32, row_index as i32);
            materials.push(decode_cell(spec, code, cell, &mut boxes, &mut player)?);
        }
    }

    let Some(player) = player else {
        return Err(LevelError::MissingPlayer { level: spec.level });
    };

    Ok(LevelLayout {
        level: spec.number(),
        title: spec.title.clone(),
        columns: columns as u32,
        rows: rows as u32,
        materials,
        boxes,
        player,
        mode: spec.mode,
    })
}

/// Decodes one grid cell, recording any entity it encodes.
fn decode_cell(
    spec: &LevelSpec,
    code: u16,
    cell: CellCoord,
    boxes: &mut Vec<BoxSeed>,
    player: &mut Option<CellCoord>,
) -> Result<Material, LevelError> {
    if code == tile::PLAYER_SPAWN {
        if player.is_some() {
            return Err(LevelError::DuplicatePlayer { level: spec.level });
        }
        *player = Some(cell);
        // Pixin: the player spawns atop the declared tile instead of floor.
        return match spec.pixin {
            None => Ok(Material::Empty),
            Some(pixin) => tile::material_from_code(pixin).ok_or(LevelError::InvalidPixin {
                level: spec.level,
                code: pixin,
            }),
        };
    }

    if let Some(material) = tile::material_from_code(code) {
        return Ok(material);
    }

    if let Some(color) = BoxColor::from_code(code) {
        boxes.push(BoxSeed {
            color,
            cell,
            anchored: false,
        });
        return Ok(Material::Empty);
    }

    if spec.mixin {
        if let Some((color, target)) = tile::decode_mixin(code) {
            boxes.push(BoxSeed {
                color,
                cell,
                anchored: color.target_color() == Some(target),
            });
            return Ok(Material::Target(target));
        }
    }

    Err(LevelError::UnknownTileCode {
        level: spec.level,
        code,
    })
}
