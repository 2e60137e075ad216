#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure session system that orchestrates one playthrough.
//!
//! The session owns the current level index, the step counter, the
//! at-most-one in-flight move latch, and the furthest-progress record. Each
//! frame it consumes the events the world emitted for the previous command
//! batch plus the adapter's distilled input, and replies with new commands.
//! It never touches the world directly.

use serde::{Deserialize, Serialize};
use tilepush_core::{Command, Direction, Event, LevelLayout, LevelNumber};
use tilepush_levels::{LevelError, LevelSet, FIRST_LEVEL};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionInput {
    /// Directional press detected on this frame, if any.
    pub direction: Option<Direction>,
    /// Whether the player requested a level restart.
    pub restart: bool,
    /// Whether the player requested the next level.
    pub next_level: bool,
    /// Whether the player requested the previous level.
    pub previous_level: bool,
    /// Whether the adapter finished animating the previous move.
    pub animation_done: bool,
}

impl SessionInput {
    /// Input carrying only a directional press.
    #[must_use]
    pub const fn press(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            restart: false,
            next_level: false,
            previous_level: false,
            animation_done: false,
        }
    }

    /// Input reporting only animation completion.
    #[must_use]
    pub const fn animation_complete() -> Self {
        Self {
            direction: None,
            restart: false,
            next_level: false,
            previous_level: false,
            animation_done: true,
        }
    }
}

/// Furthest-progress record persisted between runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Furthest level reached.
    pub level: LevelNumber,
    /// Title of that level.
    pub title: String,
}

/// Notification handed to the UI when a level completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionNotice {
    /// Level that was completed.
    pub level: LevelNumber,
    /// Steps the completion took.
    pub steps: u32,
}

/// Pure system orchestrating level selection, step counting, and the
/// in-flight move latch for one playthrough.
#[derive(Debug)]
pub struct Session {
    set: LevelSet,
    layouts: Vec<LevelLayout>,
    current: LevelNumber,
    steps: u32,
    awaiting_animation: bool,
    progress: ProgressRecord,
    completion: Option<CompletionNotice>,
}

impl Session {
    /// Builds a session over the provided level set, starting at the given
    /// level clamped into the set's range.
    ///
    /// Every level is decoded up front so navigation can never fail
    /// mid-playthrough.
    pub fn new(set: LevelSet, start: LevelNumber) -> Result<Self, LevelError> {
        let mut layouts = Vec::new();
        for spec in set.iter() {
            layouts.push(set.decode(spec.number())?);
        }

        let current = set.clamp(start);
        let progress = ProgressRecord {
            level: current,
            title: set.get(current)?.title().to_owned(),
        };

        Ok(Self {
            set,
            layouts,
            current,
            steps: 0,
            awaiting_animation: false,
            progress,
            completion: None,
        })
    }

    /// Emits the command that installs the session's current level.
    pub fn begin(&self, out: &mut Vec<Command>) {
        self.emit_load(self.current, out);
    }

    /// Consumes world events and frame input, emitting new commands.
    pub fn handle(&mut self, input: &SessionInput, events: &[Event], out: &mut Vec<Command>) {
        self.observe(events);

        if input.animation_done {
            self.awaiting_animation = false;
        }

        // Session commands preempt movement and clear any pending state.
        if input.restart {
            self.emit_load(self.current, out);
            return;
        }
        if input.next_level {
            self.emit_load(self.set.clamp(LevelNumber::new(self.current.get() + 1)), out);
            return;
        }
        if input.previous_level {
            let previous = self.current.get().saturating_sub(1);
            self.emit_load(self.set.clamp(LevelNumber::new(previous)), out);
            return;
        }

        if let Some(direction) = input.direction {
            // One outstanding move at a time: input arriving while a
            // translation is still animating is dropped, not queued.
            if !self.awaiting_animation && self.completion.is_none() {
                out.push(Command::MovePlayer { direction });
            }
        }
    }

    /// Level the session currently points at.
    #[must_use]
    pub fn current_level(&self) -> LevelNumber {
        self.current
    }

    /// Steps taken in the current level so far.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Whether a resolved move is still animating.
    #[must_use]
    pub fn awaiting_animation(&self) -> bool {
        self.awaiting_animation
    }

    /// Furthest-progress record to persist.
    #[must_use]
    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    /// Pending completion notice, cleared by the next level load.
    #[must_use]
    pub fn completion_notice(&self) -> Option<CompletionNotice> {
        self.completion
    }

    /// The level set backing this session.
    #[must_use]
    pub fn level_set(&self) -> &LevelSet {
        &self.set
    }

    fn observe(&mut self, events: &[Event]) {
        let mut moved = false;
        let mut solved: Option<LevelNumber> = None;

        for event in events {
            match event {
                Event::LevelLoaded { level } => {
                    self.current = *level;
                    self.steps = 0;
                    self.awaiting_animation = false;
                    self.completion = None;
                }
                Event::PlayerMoved { .. } => moved = true,
                Event::LevelSolved { level } => solved = Some(*level),
                _ => {}
            }
        }

        // Exactly one step per accepted move; chained slide continuations
        // arrive in the same batch and cannot double-count.
        if moved {
            self.steps += 1;
            self.awaiting_animation = true;
        }

        if let Some(level) = solved {
            self.completion = Some(CompletionNotice {
                level,
                steps: self.steps,
            });
            self.advance_progress(level);
        }
    }

    /// Moves the furthest-progress record to the level after the one just
    /// solved, clamped to the set; progress never regresses.
    fn advance_progress(&mut self, solved: LevelNumber) {
        let reached = self.set.clamp(LevelNumber::new(solved.get() + 1));
        if reached > self.progress.level {
            if let Ok(spec) = self.set.get(reached) {
                self.progress = ProgressRecord {
                    level: reached,
                    title: spec.title().to_owned(),
                };
            }
        }
    }

    fn emit_load(&self, level: LevelNumber, out: &mut Vec<Command>) {
        let index = (level.get() - FIRST_LEVEL.get()) as usize;
        if let Some(layout) = self.layouts.get(index) {
            out.push(Command::LoadLevel {
                layout: layout.clone(),
            });
        }
    }
}
