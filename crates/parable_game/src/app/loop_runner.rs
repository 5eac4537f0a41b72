use std::process::ExitCode;

use parable_engine::LevelRuntime;
use tracing::{info, warn};

use super::bootstrap::AppWiring;
use super::script::SessionScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) frames_run: u64,
    pub(crate) puzzles_solved: u32,
    pub(crate) complete: bool,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring { mut level, script } = app;
    let summary = run_session(&mut level, &script);
    level.teardown();

    if summary.complete {
        info!(
            frames = summary.frames_run,
            puzzles_solved = summary.puzzles_solved,
            "session_complete"
        );
    } else {
        warn!(
            frames = summary.frames_run,
            puzzles_solved = summary.puzzles_solved,
            "session_ended_before_game_complete"
        );
    }
    ExitCode::SUCCESS
}

/// Starts the level and feeds it the script frame by frame, stopping early
/// once the game reports completion.
pub(crate) fn run_session(level: &mut LevelRuntime, script: &SessionScript) -> SessionSummary {
    level.start();
    let dt = script.frame_dt_seconds();
    let mut frames_run = 0u64;
    let mut puzzles_solved = 0u32;
    for input in script.frames() {
        let report = level.step(dt, &input);
        frames_run = report.frame_index;
        puzzles_solved = puzzles_solved.saturating_add(report.event_counts.puzzle_solved);
        for event in &report.events {
            info!(frame = report.frame_index, event = %event, "lifecycle_event");
        }
        if report.game_complete {
            return SessionSummary {
                frames_run,
                puzzles_solved,
                complete: true,
            };
        }
    }
    SessionSummary {
        frames_run,
        puzzles_solved,
        complete: level.puzzles().is_complete(),
    }
}
