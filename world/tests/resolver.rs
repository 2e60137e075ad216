use tilepush_core::{
    BoxColor, BoxSeed, CellCoord, Command, Direction, Event, GameMode, LevelLayout, LevelNumber,
    Material, TargetColor,
};
use tilepush_world::{self as world, query, World};

/// Builds a layout from a character map.
///
/// `#` wall, `-` empty, `@` player, `~` slide, `h` hole, `O R B G Y` boxes,
/// `*` solid box, `o r b g y` targets.
fn layout(mode: GameMode, rows: &[&str]) -> LevelLayout {
    let height = rows.len();
    let width = rows.first().map_or(0, |row| row.len());
    let mut materials = Vec::with_capacity(width * height);
    let mut boxes = Vec::new();
    let mut player = None;

    for (row_index, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), width, "test layout must be rectangular");
        for (column_index, symbol) in row.chars().enumerate() {
            let cell = CellCoord::new(column_index as i32, row_index as i32);
            let material = match symbol {
                '#' => Material::Wall,
                '-' => Material::Empty,
                '~' => Material::Slide,
                'h' => Material::Hole,
                '@' => {
                    player = Some(cell);
                    Material::Empty
                }
                'o' => Material::Target(TargetColor::Orange),
                'r' => Material::Target(TargetColor::Red),
                'b' => Material::Target(TargetColor::Blue),
                'g' => Material::Target(TargetColor::Green),
                'y' => Material::Target(TargetColor::Grey),
                other => {
                    let color = match other {
                        'O' => BoxColor::Orange,
                        'R' => BoxColor::Red,
                        'B' => BoxColor::Blue,
                        'G' => BoxColor::Green,
                        'Y' => BoxColor::Grey,
                        '*' => BoxColor::Solid,
                        _ => panic!("unknown layout symbol {other:?}"),
                    };
                    boxes.push(BoxSeed {
                        color,
                        cell,
                        anchored: false,
                    });
                    Material::Empty
                }
            };
            materials.push(material);
        }
    }

    LevelLayout {
        level: LevelNumber::new(1),
        title: "test".to_owned(),
        columns: width as u32,
        rows: height as u32,
        materials,
        boxes,
        player: player.expect("test layout needs a player"),
        mode,
    }
}

fn load(mode: GameMode, rows: &[&str]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            layout: layout(mode, rows),
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::LevelLoaded { .. }]));
    world
}

fn push(world: &mut World, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::MovePlayer { direction }, &mut events);
    events
}

#[test]
fn single_push_onto_target_completes_the_level() {
    // Box at (3,3), target at (4,3), player at (2,3).
    let mut world = load(
        GameMode::Normal,
        &[
            "#######", //
            "#-----#",
            "#-----#",
            "#-@Bb-#",
            "#-----#",
            "#######",
        ],
    );

    let events = push(&mut world, Direction::Right);

    let settled = events
        .iter()
        .any(|event| matches!(event, Event::BoxSettled { .. }));
    let solved = events
        .iter()
        .any(|event| matches!(event, Event::LevelSolved { .. }));
    assert!(settled, "expected a settle event, got {events:?}");
    assert!(solved, "expected a solved event, got {events:?}");

    let scores = query::score_view(&world);
    assert_eq!(scores.count(BoxColor::Blue), 1);
    assert!(scores.is_complete());
    assert_eq!(query::player(&world).cell, CellCoord::new(3, 3));
    let settled_box = query::box_at(&world, CellCoord::new(4, 3)).expect("box on target");
    assert!(settled_box.anchored);
}

#[test]
fn blocked_moves_are_silently_idempotent() {
    let mut world = load(
        GameMode::Normal,
        &[
            "###", //
            "#@#",
            "###",
        ],
    );
    let before_player = query::player(&world);

    for _ in 0..3 {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            let events = push(&mut world, direction);
            assert!(events.is_empty(), "wall rejection must emit nothing");
        }
    }

    assert_eq!(query::player(&world), before_player);
}

#[test]
fn pushes_are_rejected_by_walls_and_sibling_boxes() {
    let mut world = load(
        GameMode::Normal,
        &[
            "#######", //
            "#@BB-b#",
            "#B----#",
            "##----#",
            "#######",
        ],
    );

    // Box ahead of the pushed box blocks the push.
    assert!(push(&mut world, Direction::Right).is_empty());

    // Wall ahead of the pushed box blocks the push.
    let events = push(&mut world, Direction::Down);
    assert!(events.is_empty(), "got {events:?}");

    // Nothing moved at rest.
    let boxes: Vec<_> = query::box_view(&world).into_vec();
    assert_eq!(boxes.len(), 3);
    assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
}

#[test]
fn slide_run_carries_a_box_to_the_first_plain_cell() {
    let mut world = load(
        GameMode::Normal,
        &[
            "########", //
            "#@B~~~-#",
            "########",
        ],
    );

    let events = push(&mut world, Direction::Right);

    let hops: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::BoxPushed { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        hops,
        vec![
            CellCoord::new(3, 1),
            CellCoord::new(4, 1),
            CellCoord::new(5, 1),
            CellCoord::new(6, 1),
        ]
    );
    assert!(query::box_at(&world, CellCoord::new(6, 1)).is_some());
    // The player stepped exactly one cell.
    assert_eq!(query::player(&world).cell, CellCoord::new(2, 1));
    let player_moves = events
        .iter()
        .filter(|event| matches!(event, Event::PlayerMoved { .. }))
        .count();
    assert_eq!(player_moves, 1);
}

#[test]
fn slide_run_ends_early_at_a_wall() {
    let mut world = load(
        GameMode::Normal,
        &[
            "######", //
            "#@B~-#",
            "#--#-#",
            "######",
        ],
    );

    // Box lands on the slide, then continues one more cell and rests.
    let _ = push(&mut world, Direction::Right);
    assert!(query::box_at(&world, CellCoord::new(4, 1)).is_some());

    let mut world = load(
        GameMode::Normal,
        &[
            "#####", //
            "#@B~#",
            "#####",
        ],
    );
    // The wall directly past the slide strands the box on the slide tile.
    let _ = push(&mut world, Direction::Right);
    assert!(query::box_at(&world, CellCoord::new(3, 1)).is_some());
}

#[test]
fn sliding_player_is_blocked_by_a_resting_box() {
    let mut world = load(
        GameMode::Normal,
        &[
            "#######", //
            "#@~~B-#",
            "#######",
        ],
    );

    let events = push(&mut world, Direction::Right);

    // The player enters the run and stops on the slide cell before the box;
    // the box is never pushed during an OnlyPlayer continuation.
    assert_eq!(query::player(&world).cell, CellCoord::new(3, 1));
    assert!(query::box_at(&world, CellCoord::new(4, 1)).is_some());
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::BoxPushed { .. })));
}

#[test]
fn hole_consumes_one_box_then_becomes_floor() {
    let mut world = load(
        GameMode::Normal,
        &[
            "########", //
            "#@B-hBb#",
            "########",
        ],
    );

    // First push walks the lead box up to the hole's edge.
    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::BoxConsumed { .. })));

    // Second push drops it in.
    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BoxConsumed { .. })));
    assert!(query::box_at(&world, CellCoord::new(4, 1)).is_none());
    assert_eq!(
        query::material_at(&world, CellCoord::new(4, 1)),
        Material::Empty
    );

    // The surviving box now pushes freely onto the target, completing the
    // level: the consumed box left the totals.
    let mut solved = false;
    for _ in 0..4 {
        let events = push(&mut world, Direction::Right);
        solved |= events
            .iter()
            .any(|event| matches!(event, Event::LevelSolved { .. }));
    }
    assert!(solved);
    assert!(query::score_view(&world).is_complete());
}

#[test]
fn hole_swallows_the_player_and_disables_input() {
    let mut world = load(
        GameMode::Normal,
        &[
            "######", //
            "#@h-b#",
            "#-B--#",
            "######",
        ],
    );

    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerSwallowed { .. })));
    assert!(!query::player(&world).visible);

    // An invisible player can no longer move or push.
    for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
        assert!(push(&mut world, direction).is_empty());
    }
}

#[test]
fn change_mode_cycles_colors_with_wrap_before_scoring() {
    // Available colors are frozen as [Orange, Red, Blue].
    let mut world = load(
        GameMode::Change,
        &[
            "########", //
            "#@B--r-#",
            "#-O----#",
            "#--R---#",
            "########",
        ],
    );
    assert_eq!(
        query::available_colors(&world),
        &[BoxColor::Orange, BoxColor::Red, BoxColor::Blue]
    );

    // Pushing the Blue box wraps it to Orange.
    let events = push(&mut world, Direction::Right);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BoxRecolored {
            from: BoxColor::Blue,
            to: BoxColor::Orange,
            ..
        }
    )));

    // Pushing an Orange box advances it to Red, and scoring uses the
    // post-change color: it settles on the red target it lands on.
    let mut world = load(
        GameMode::Change,
        &[
            "########", //
            "#-@Or--#",
            "#-B-R--#",
            "########",
        ],
    );
    let events = push(&mut world, Direction::Right);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BoxRecolored {
            from: BoxColor::Orange,
            to: BoxColor::Red,
            ..
        }
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BoxSettled {
            color: BoxColor::Red,
            ..
        }
    )));
    assert_eq!(query::score_view(&world).count(BoxColor::Red), 1);
}

#[test]
fn leaving_a_target_revokes_the_score() {
    // A second box keeps the level open so the settle does not latch it.
    let mut world = load(
        GameMode::Normal,
        &[
            "#######", //
            "#@Bb-b#",
            "#-B---#",
            "#######",
        ],
    );
    let _ = push(&mut world, Direction::Right);
    assert_eq!(query::score_view(&world).count(BoxColor::Blue), 1);

    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BoxUnsettled { .. })));
    assert_eq!(query::score_view(&world).count(BoxColor::Blue), 0);
    let moved_box = query::box_at(&world, CellCoord::new(4, 1)).expect("box moved off target");
    assert!(!moved_box.anchored);
}

#[test]
fn completion_requires_every_box_of_every_color() {
    let mut world = load(
        GameMode::Normal,
        &[
            "########", //
            "#@Bb-Bb#",
            "########",
        ],
    );

    let events = push(&mut world, Direction::Right);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LevelSolved { .. })));
    assert!(!query::score_view(&world).is_complete());
}

#[test]
fn solid_boxes_block_pushes_but_never_gate_completion() {
    let mut world = load(
        GameMode::Normal,
        &[
            "#######", //
            "#@Bb-*#",
            "#######",
        ],
    );

    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelSolved { .. })));
    // The solid box sits on plain floor, unanchored, and the level is done.
    let solid = query::box_at(&world, CellCoord::new(5, 1)).expect("solid box");
    assert!(!solid.anchored);
}

#[test]
fn moves_are_ignored_after_the_level_is_solved() {
    let mut world = load(
        GameMode::Normal,
        &[
            "######", //
            "#@Bb-#",
            "######",
        ],
    );

    let events = push(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelSolved { .. })));

    assert!(push(&mut world, Direction::Left).is_empty());
    assert!(push(&mut world, Direction::Right).is_empty());
}

#[test]
fn a_fresh_world_ignores_movement() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MovePlayer {
            direction: Direction::Up,
        },
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn random_walk_never_collides_boxes_or_breaks_score_bounds() {
    let mut world = load(
        GameMode::Normal,
        &[
            "##########", //
            "#@-B-b---#",
            "#-B--~---#",
            "#--#----h#",
            "#-B-b----#",
            "#---#--~-#",
            "#-b------#",
            "##########",
        ],
    );

    let directions = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
    let mut rng_state: u64 = 0x4d59_5df4_d0f3_3173;

    for _ in 0..500 {
        rng_state = rng_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        let direction = directions[(rng_state >> 33) as usize % directions.len()];
        let _ = push(&mut world, direction);

        let boxes = query::box_view(&world).into_vec();
        for (index, first) in boxes.iter().enumerate() {
            for second in boxes.iter().skip(index + 1) {
                assert_ne!(first.cell, second.cell, "two boxes share a cell");
            }
        }

        let scores = query::score_view(&world);
        for color in BoxColor::SCORING {
            assert!(scores.count(color) <= scores.total(color));
        }
    }
}
