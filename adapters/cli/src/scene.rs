//! Pure scene population from world snapshots and event batches.

use tilepush_core::{CellCoord, Event};
use tilepush_rendering::{
    palette, AnimationSubject, BoxPresentation, HudPresentation, MoveAnimation, PlayerPresentation,
    RenderingError, Scene, ScoreLine, TileGridPresentation, TilePresentation,
};
use tilepush_system_session::Session;
use tilepush_world::{query, World};

/// Side length of a board cell in world units; backends rescale to fit.
const CELL_LENGTH: f32 = 32.0;

/// Builds a complete scene from the world snapshot and session state.
pub(crate) fn populate(world: &World, session: &Session) -> Result<Scene, RenderingError> {
    let (columns, rows) = query::dimensions(world);
    let grid = TileGridPresentation::new(columns, rows, CELL_LENGTH, palette::GRID_LINE)?;

    let mut tiles = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows as i32 {
        for column in 0..columns as i32 {
            let cell = CellCoord::new(column, row);
            tiles.push(TilePresentation::new(cell, query::material_at(world, cell)));
        }
    }

    let boxes = query::box_view(world)
        .iter()
        .map(|snapshot| {
            BoxPresentation::new(snapshot.id, snapshot.color, snapshot.cell, snapshot.anchored)
        })
        .collect();

    let player_snapshot = query::player(world);
    let player = PlayerPresentation::new(player_snapshot.cell, player_snapshot.visible);

    let scores = query::score_view(world);
    let score_lines = query::available_colors(world)
        .iter()
        .map(|&color| ScoreLine {
            color,
            anchored: scores.count(color),
            total: scores.total(color),
        })
        .collect();

    let title = session
        .level_set()
        .get(session.current_level())
        .map(|spec| spec.title().to_owned())
        .unwrap_or_default();

    let hud = HudPresentation {
        banner: query::welcome_banner(world).to_owned(),
        level: query::level(world),
        title,
        mode: query::mode(world),
        steps: session.steps(),
        scores: score_lines,
        solved: query::is_solved(world),
    };

    Ok(Scene {
        grid,
        tiles,
        boxes,
        player,
        animations: Vec::new(),
        hud,
    })
}

/// Maps an event batch onto per-cell translations, in emission order.
pub(crate) fn animations_from_events(events: &[Event]) -> Vec<MoveAnimation> {
    let mut animations = Vec::new();
    for event in events {
        match event {
            Event::PlayerMoved { from, to } => {
                animations.push(MoveAnimation::new(AnimationSubject::Player, *from, *to));
            }
            Event::BoxPushed { box_id, from, to } => {
                animations.push(MoveAnimation::new(
                    AnimationSubject::Box(*box_id),
                    *from,
                    *to,
                ));
            }
            _ => {}
        }
    }
    animations
}
