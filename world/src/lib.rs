#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state and the move resolver for Tilepush.
//!
//! The world owns the materials grid, the live box set, the player, and the
//! score table. Adapters and systems mutate it exclusively through
//! [`apply`], which resolves the complete effect of each command, including
//! chained slide continuations and hole consumption, before returning, and
//! read it exclusively through the [`query`] module.

use tilepush_core::{
    BoxColor, BoxId, CellCoord, Command, Direction, Event, GameMode, LevelLayout, LevelNumber,
    Material, WELCOME_BANNER,
};

/// Represents the authoritative Tilepush board state.
///
/// A freshly constructed world is inert: the player is invisible and every
/// movement command is ignored until a [`Command::LoadLevel`] installs a
/// layout.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    board: Board,
    boxes: Vec<BoxEntity>,
    player: Player,
    scores: ScoreBoard,
    color_cycle: Vec<BoxColor>,
    mode: GameMode,
    level: LevelNumber,
    solved: bool,
}

impl World {
    /// Creates a new world awaiting its first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            board: Board::new(0, 0),
            boxes: Vec::new(),
            player: Player {
                cell: CellCoord::new(0, 0),
                visible: false,
            },
            scores: ScoreBoard::default(),
            color_cycle: Vec::new(),
            mode: GameMode::Normal,
            level: LevelNumber::new(0),
            solved: false,
        }
    }

    fn install(&mut self, layout: LevelLayout, out_events: &mut Vec<Event>) {
        debug_assert_eq!(
            layout.materials.len(),
            layout.columns as usize * layout.rows as usize,
            "layout grid must be rectangular"
        );

        self.board = Board {
            columns: layout.columns,
            rows: layout.rows,
            materials: layout.materials,
        };
        self.player = Player {
            cell: layout.player,
            visible: true,
        };
        self.mode = layout.mode;
        self.level = layout.level;
        self.solved = false;

        self.scores = ScoreBoard::default();
        self.boxes.clear();
        for (index, seed) in layout.boxes.iter().enumerate() {
            let id = BoxId::new(index as u32);
            self.boxes.push(BoxEntity {
                id,
                color: seed.color,
                cell: seed.cell,
                anchored: seed.anchored,
            });
            self.scores.add_total(seed.color);
            if seed.anchored {
                self.scores.settle(seed.color);
            }
        }

        // The available-color cycle is frozen at load time from the level's
        // scoring boxes; Change mode never re-derives it from live placement.
        self.color_cycle = frozen_color_cycle(&self.boxes);

        out_events.push(Event::LevelLoaded { level: self.level });
    }

    fn resolve_player_move(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.solved || !self.player.visible {
            return;
        }

        let moved = self.resolve(PushMode::Normal, None, direction, out_events);

        if moved && self.scores.is_complete() {
            self.solved = true;
            out_events.push(Event::LevelSolved { level: self.level });
        }
    }

    /// Single resolver entry point shared by player steps and continuations.
    ///
    /// `mover` is required in [`PushMode::OnlyBox`]; invoking a box
    /// continuation without one is a caller defect, not a runtime condition.
    fn resolve(
        &mut self,
        mode: PushMode,
        mover: Option<BoxId>,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        match mode {
            PushMode::OnlyBox => {
                let Some(box_id) = mover else {
                    debug_assert!(false, "OnlyBox continuation requires a mover");
                    return false;
                };
                self.slide_box(box_id, direction, out_events)
            }
            PushMode::Normal | PushMode::OnlyPlayer => {
                self.step_player(mode, direction, out_events)
            }
        }
    }

    /// Advances the player one cell, pushing a box when mode permits.
    ///
    /// Returns whether anything moved. Rejections leave the world untouched.
    fn step_player(
        &mut self,
        mode: PushMode,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let dest = self.player.cell.stepped(direction);
        if self.board.material_at(dest) == Material::Wall {
            return false;
        }

        if let Some(box_id) = self.box_id_at(dest) {
            if mode == PushMode::OnlyPlayer {
                // A box on a slide-continuation cell blocks the sliding
                // player entirely; it is never pushed mid-slide.
                return false;
            }

            // Push legality reads resting positions: the box ahead of the
            // pushed box is wherever it sits right now, so a row of boxes
            // can never compress through each other in one resolution.
            let box_dest = dest.stepped(direction);
            if self.board.material_at(box_dest) == Material::Wall
                || self.box_id_at(box_dest).is_some()
            {
                return false;
            }

            self.push_box(box_id, direction, out_events);

            let from = self.player.cell;
            self.player.cell = dest;
            out_events.push(Event::PlayerMoved { from, to: dest });
            // The player never slides on the cell a push deposits it on.
            return true;
        }

        let from = self.player.cell;
        self.player.cell = dest;
        out_events.push(Event::PlayerMoved { from, to: dest });

        match self.board.material_at(dest) {
            Material::Slide => {
                let _ = self.resolve(PushMode::OnlyPlayer, None, direction, out_events);
            }
            Material::Hole => {
                self.player.visible = false;
                out_events.push(Event::PlayerSwallowed { cell: dest });
            }
            _ => {}
        }

        true
    }

    /// Moves a box one validated cell and applies every follow-up effect:
    /// Change-mode recolor, scoring, slide continuation, hole consumption.
    fn push_box(&mut self, box_id: BoxId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(index) = self.box_index(box_id) else {
            debug_assert!(false, "push target must be a live box");
            return;
        };

        let from = self.boxes[index].cell;
        let to = from.stepped(direction);
        self.boxes[index].cell = to;
        out_events.push(Event::BoxPushed { box_id, from, to });

        // In Change mode the color advances before scoring, on every push
        // of the box including each slide-continuation hop.
        let previous_color = self.boxes[index].color;
        if self.mode == GameMode::Change && !previous_color.is_solid() {
            if let Some(next) = next_in_cycle(&self.color_cycle, previous_color) {
                if next != previous_color {
                    self.boxes[index].color = next;
                    // Totals track the colors boxes currently carry, so the
                    // completion check stays reachable as colors shift.
                    self.scores.remove_total(previous_color);
                    self.scores.add_total(next);
                    out_events.push(Event::BoxRecolored {
                        box_id,
                        from: previous_color,
                        to: next,
                    });
                }
            }
        }
        let color = self.boxes[index].color;

        let newly_settled = matches!(
            self.board.material_at(to),
            Material::Target(target) if color.target_color() == Some(target)
        );
        let left_target = matches!(
            self.board.material_at(from),
            Material::Target(target) if previous_color.target_color() == Some(target)
        );

        if newly_settled {
            self.boxes[index].anchored = true;
            self.scores.settle(color);
            out_events.push(Event::BoxSettled { box_id, color });
        }
        if left_target {
            self.scores.unsettle(previous_color);
        }
        if !newly_settled && self.boxes[index].anchored {
            self.boxes[index].anchored = false;
            out_events.push(Event::BoxUnsettled { box_id });
        }

        match self.board.material_at(to) {
            Material::Slide => {
                let _ = self.resolve(PushMode::OnlyBox, Some(box_id), direction, out_events);
            }
            Material::Hole => {
                let consumed = self.boxes.remove(index);
                // A destroyed box leaves the completion check as well,
                // otherwise disposing of a surplus box would wedge the level.
                self.scores.remove_total(consumed.color);
                self.board.set_material(to, Material::Empty);
                out_events.push(Event::BoxConsumed { box_id, cell: to });
            }
            _ => {}
        }
    }

    /// Continues an already-pushed box one more cell along a slide run.
    ///
    /// The run ends where the next cell is a wall or a resting sibling box;
    /// hops already taken stand.
    fn slide_box(
        &mut self,
        box_id: BoxId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(index) = self.box_index(box_id) else {
            debug_assert!(false, "slide continuation requires a live box");
            return false;
        };

        let dest = self.boxes[index].cell.stepped(direction);
        if self.board.material_at(dest) == Material::Wall || self.box_id_at(dest).is_some() {
            return false;
        }

        self.push_box(box_id, direction, out_events);
        true
    }

    fn box_index(&self, box_id: BoxId) -> Option<usize> {
        self.boxes.iter().position(|entity| entity.id == box_id)
    }

    fn box_id_at(&self, cell: CellCoord) -> Option<BoxId> {
        self.boxes
            .iter()
            .find(|entity| entity.cell == cell)
            .map(|entity| entity.id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => world.install(layout, out_events),
        Command::MovePlayer { direction } => world.resolve_player_move(direction, out_events),
    }
}

/// Distinguishes the three resolver invocation modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PushMode {
    /// Player-initiated step that may push a box.
    Normal,
    /// Box continuing along a slide run without further player movement.
    OnlyBox,
    /// Player continuing a slide alone; boxes block rather than push.
    OnlyPlayer,
}

#[derive(Clone, Copy, Debug)]
struct BoxEntity {
    id: BoxId,
    color: BoxColor,
    cell: CellCoord,
    anchored: bool,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    visible: bool,
}

#[derive(Debug)]
struct Board {
    columns: u32,
    rows: u32,
    materials: Vec<Material>,
}

impl Board {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            materials: vec![Material::Empty; capacity],
        }
    }

    /// Material lookup that fails closed: out-of-bounds cells read as walls.
    fn material_at(&self, cell: CellCoord) -> Material {
        match self.index(cell) {
            Some(index) => self.materials.get(index).copied().unwrap_or(Material::Wall),
            None => Material::Wall,
        }
    }

    fn set_material(&mut self, cell: CellCoord, material: Material) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.materials.get_mut(index) {
                *slot = material;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < 0 || cell.row() < 0 {
            return None;
        }
        let column = cell.column() as u32;
        let row = cell.row() as u32;
        if column < self.columns && row < self.rows {
            let width = usize::try_from(self.columns).ok()?;
            Some(row as usize * width + column as usize)
        } else {
            None
        }
    }
}

/// Per-color tally of anchored boxes against each color's box total.
#[derive(Clone, Copy, Debug, Default)]
struct ScoreBoard {
    anchored: [u32; BoxColor::SCORING.len()],
    totals: [u32; BoxColor::SCORING.len()],
}

impl ScoreBoard {
    fn slot(color: BoxColor) -> Option<usize> {
        BoxColor::SCORING.iter().position(|entry| *entry == color)
    }

    fn add_total(&mut self, color: BoxColor) {
        if let Some(slot) = Self::slot(color) {
            self.totals[slot] += 1;
        }
    }

    fn settle(&mut self, color: BoxColor) {
        if let Some(slot) = Self::slot(color) {
            self.anchored[slot] += 1;
            debug_assert!(self.anchored[slot] <= self.totals[slot]);
        }
    }

    fn remove_total(&mut self, color: BoxColor) {
        if let Some(slot) = Self::slot(color) {
            self.totals[slot] = self.totals[slot].saturating_sub(1);
        }
    }

    fn unsettle(&mut self, color: BoxColor) {
        if let Some(slot) = Self::slot(color) {
            self.anchored[slot] = self.anchored[slot].saturating_sub(1);
        }
    }

    fn count(&self, color: BoxColor) -> u32 {
        Self::slot(color).map_or(0, |slot| self.anchored[slot])
    }

    fn total(&self, color: BoxColor) -> u32 {
        Self::slot(color).map_or(0, |slot| self.totals[slot])
    }

    /// Complete iff every scoring color present has full coverage. Solid
    /// boxes have no slot and can never hold a level open.
    fn is_complete(&self) -> bool {
        self.anchored
            .iter()
            .zip(self.totals.iter())
            .all(|(anchored, total)| anchored == total)
    }
}

/// Collects the distinct scoring colors present at load, ascending by code.
fn frozen_color_cycle(boxes: &[BoxEntity]) -> Vec<BoxColor> {
    let mut cycle: Vec<BoxColor> = boxes
        .iter()
        .map(|entity| entity.color)
        .filter(|color| !color.is_solid())
        .collect();
    cycle.sort_by_key(|color| color.code());
    cycle.dedup();
    cycle
}

/// Next color in the frozen cycle, wrapping from the maximum back to the
/// minimum available color.
fn next_in_cycle(cycle: &[BoxColor], current: BoxColor) -> Option<BoxColor> {
    let position = cycle.iter().position(|color| *color == current)?;
    let next = (position + 1) % cycle.len();
    cycle.get(next).copied()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tilepush_core::{BoxColor, BoxId, CellCoord, GameMode, LevelNumber, Material};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Board dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.board.columns, world.board.rows)
    }

    /// Material occupying the provided cell; out-of-bounds reads as wall.
    #[must_use]
    pub fn material_at(world: &World, cell: CellCoord) -> Material {
        world.board.material_at(cell)
    }

    /// Number of the currently installed level.
    #[must_use]
    pub fn level(world: &World) -> LevelNumber {
        world.level
    }

    /// Color behavior of the currently installed level.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Whether the world has latched the solved state.
    #[must_use]
    pub fn is_solved(world: &World) -> bool {
        world.solved
    }

    /// Frozen ascending cycle of scoring colors present in the level.
    #[must_use]
    pub fn available_colors(world: &World) -> &[BoxColor] {
        &world.color_cycle
    }

    /// Captures a read-only view of the boxes on the board.
    #[must_use]
    pub fn box_view(world: &World) -> BoxView {
        let mut snapshots: Vec<BoxSnapshot> = world
            .boxes
            .iter()
            .map(|entity| BoxSnapshot {
                id: entity.id,
                color: entity.color,
                cell: entity.cell,
                anchored: entity.anchored,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        BoxView { snapshots }
    }

    /// Returns the box resting on the provided cell, if any.
    #[must_use]
    pub fn box_at(world: &World, cell: CellCoord) -> Option<BoxSnapshot> {
        world
            .boxes
            .iter()
            .find(|entity| entity.cell == cell)
            .map(|entity| BoxSnapshot {
                id: entity.id,
                color: entity.color,
                cell: entity.cell,
                anchored: entity.anchored,
            })
    }

    /// Captures the player's current cell and visibility.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            visible: world.player.visible,
        }
    }

    /// Captures the per-color score table.
    #[must_use]
    pub fn score_view(world: &World) -> ScoreView {
        ScoreView {
            scores: world.scores,
        }
    }

    /// Read-only snapshot describing all boxes on the board.
    #[derive(Clone, Debug, Default)]
    pub struct BoxView {
        snapshots: Vec<BoxSnapshot>,
    }

    impl BoxView {
        /// Iterator over the captured box snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &BoxSnapshot> {
            self.snapshots.iter()
        }

        /// Number of boxes alive on the board.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether the board carries no boxes.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<BoxSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single box used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BoxSnapshot {
        /// Unique identifier assigned to the box at load time.
        pub id: BoxId,
        /// Current color of the box.
        pub color: BoxColor,
        /// Cell the box rests on.
        pub cell: CellCoord,
        /// Whether the box currently covers its matching target.
        pub anchored: bool,
    }

    /// Immutable representation of the player used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Cell the player occupies.
        pub cell: CellCoord,
        /// False once a hole has swallowed the player.
        pub visible: bool,
    }

    /// Read-only view of the per-color score table.
    #[derive(Clone, Copy, Debug)]
    pub struct ScoreView {
        scores: super::ScoreBoard,
    }

    impl ScoreView {
        /// Anchored-box count recorded for the provided color.
        #[must_use]
        pub fn count(&self, color: BoxColor) -> u32 {
            self.scores.count(color)
        }

        /// Total boxes of the provided color present in the level.
        #[must_use]
        pub fn total(&self, color: BoxColor) -> u32 {
            self.scores.total(color)
        }

        /// Whether every scoring color has full target coverage.
        #[must_use]
        pub fn is_complete(&self) -> bool {
            self.scores.is_complete()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{frozen_color_cycle, next_in_cycle, BoxEntity, ScoreBoard};
    use tilepush_core::{BoxColor, BoxId, CellCoord};

    fn entity(color: BoxColor) -> BoxEntity {
        BoxEntity {
            id: BoxId::new(0),
            color,
            cell: CellCoord::new(0, 0),
            anchored: false,
        }
    }

    #[test]
    fn score_board_floors_at_zero() {
        let mut scores = ScoreBoard::default();
        scores.add_total(BoxColor::Blue);
        scores.unsettle(BoxColor::Blue);
        assert_eq!(scores.count(BoxColor::Blue), 0);
    }

    #[test]
    fn solid_boxes_never_enter_the_score_table() {
        let mut scores = ScoreBoard::default();
        scores.add_total(BoxColor::Solid);
        scores.settle(BoxColor::Solid);
        assert_eq!(scores.total(BoxColor::Solid), 0);
        assert_eq!(scores.count(BoxColor::Solid), 0);
        assert!(scores.is_complete());
    }

    #[test]
    fn completion_requires_every_color_covered() {
        let mut scores = ScoreBoard::default();
        scores.add_total(BoxColor::Red);
        scores.add_total(BoxColor::Red);
        scores.add_total(BoxColor::Green);
        scores.settle(BoxColor::Red);
        scores.settle(BoxColor::Green);
        assert!(!scores.is_complete());
        scores.settle(BoxColor::Red);
        assert!(scores.is_complete());
    }

    #[test]
    fn color_cycle_is_sorted_and_distinct() {
        let boxes = vec![
            entity(BoxColor::Blue),
            entity(BoxColor::Orange),
            entity(BoxColor::Blue),
            entity(BoxColor::Solid),
            entity(BoxColor::Red),
        ];
        let cycle = frozen_color_cycle(&boxes);
        assert_eq!(cycle, vec![BoxColor::Orange, BoxColor::Red, BoxColor::Blue]);
    }

    #[test]
    fn cycle_wraps_from_maximum_to_minimum() {
        let cycle = vec![BoxColor::Orange, BoxColor::Red, BoxColor::Blue];
        assert_eq!(next_in_cycle(&cycle, BoxColor::Blue), Some(BoxColor::Orange));
        assert_eq!(next_in_cycle(&cycle, BoxColor::Orange), Some(BoxColor::Red));
        assert_eq!(next_in_cycle(&cycle, BoxColor::Grey), None);
    }
}
