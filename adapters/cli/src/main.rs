#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tilepush experience.
//!
//! The adapter owns all io: argument parsing, the progress record on disk,
//! and the rendering backend. Each frame it distills backend input into a
//! session input, applies the session's command batch to the world, and
//! rebuilds the scene from the resulting snapshot.

mod progress;
mod scene;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tilepush_core::LevelNumber;
use tilepush_levels::{LevelSet, FIRST_LEVEL};
use tilepush_rendering::{palette, Presentation, RenderingBackend};
use tilepush_rendering_macroquad::MacroquadBackend;
use tilepush_system_session::{Session, SessionInput};
use tilepush_world::{apply, query, World};

#[derive(Debug, Parser)]
#[command(name = "tilepush", about = "A tile-pushing puzzle game")]
struct Args {
    /// Level to start at, overriding the saved progress record.
    #[arg(long)]
    level: Option<u32>,

    /// Path to a custom level set document.
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Print the level list and exit.
    #[arg(long)]
    list: bool,

    /// Path of the progress record file.
    #[arg(long, default_value = "tilepush-progress.toml")]
    progress: PathBuf,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Render as fast as possible instead of synchronising with the display.
    #[arg(long)]
    no_vsync: bool,
}

/// Entry point for the Tilepush command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let set = match &args.levels {
        Some(path) => LevelSet::from_path(path)?,
        None => LevelSet::built_in()?,
    };

    if args.list {
        for spec in set.iter() {
            println!("{:>3}  {}", spec.number().get(), spec.title());
        }
        return Ok(());
    }

    let saved = progress::load(&args.progress)?;
    let start = args
        .level
        .map(LevelNumber::new)
        .or_else(|| saved.as_ref().map(|record| record.level))
        .unwrap_or(FIRST_LEVEL);

    let mut session = Session::new(set, start)?;
    let mut world = World::new();

    let mut commands = Vec::new();
    let mut events = Vec::new();
    session.begin(&mut commands);
    for command in commands {
        apply(&mut world, command, &mut events);
    }

    println!("{}", query::welcome_banner(&world));

    let initial_scene = scene::populate(&world, &session)?;
    let presentation = Presentation::new("Tilepush", palette::BACKGROUND, initial_scene);

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    let progress_path = args.progress;
    let mut last_progress = session.progress().clone();
    let mut announced: Option<LevelNumber> = None;

    backend.run(presentation, move |_dt, frame_input, animation_status, out_scene| {
        let input = SessionInput {
            direction: frame_input.direction,
            restart: frame_input.restart,
            next_level: frame_input.next_level,
            previous_level: frame_input.previous_level,
            animation_done: animation_status.completed,
        };

        let mut commands = Vec::new();
        session.handle(&input, &events, &mut commands);
        events.clear();
        for command in commands {
            apply(&mut world, command, &mut events);
        }

        let animations = scene::animations_from_events(&events);
        match scene::populate(&world, &session) {
            Ok(mut next) => {
                next.animations = animations;
                *out_scene = next;
            }
            Err(error) => eprintln!("failed to rebuild scene: {error}"),
        }

        if let Some(notice) = session.completion_notice() {
            if announced != Some(notice.level) {
                announced = Some(notice.level);
                println!(
                    "Level {} solved in {} steps",
                    notice.level.get(),
                    notice.steps,
                );
            }
        }

        if session.progress() != &last_progress {
            last_progress = session.progress().clone();
            if let Err(error) = progress::save(&progress_path, &last_progress) {
                eprintln!("failed to persist progress: {error}");
            }
        }
    })
}
