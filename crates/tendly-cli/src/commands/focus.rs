use clap::Subcommand;
use std::io::Write;
use tendly_core::timer::drive;
use tendly_core::{SessionMood, SessionPatch, TickOutcome, TimerMode, TimerState};

use super::{finish, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Start an interval
    Start {
        /// focus, short-break or long-break (default: the mode the timer is on)
        #[arg(long)]
        mode: Option<TimerMode>,
        /// Task to focus on
        #[arg(long)]
        task: Option<String>,
    },
    /// Pause the running interval
    Pause,
    /// Resume a paused interval
    Resume,
    /// Abandon the current interval
    Reset,
    /// Count a distraction against the current focus interval
    Distract,
    /// Advance the countdown by whole seconds
    Tick {
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Count down in real time until the interval ends (Ctrl-C abandons it)
    Run {
        #[arg(long)]
        mode: Option<TimerMode>,
        #[arg(long)]
        task: Option<String>,
    },
    /// Print current timer state as JSON
    Status,
    /// List recorded sessions, newest first
    Sessions {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Edit mood or notes of a recorded session
    Edit {
        id: String,
        /// focused, distracted, tired or energized
        #[arg(long)]
        mood: Option<SessionMood>,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },
    /// Delete a recorded session (earned compost is kept)
    Delete {
        id: String,
    },
}

fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn run(action: FocusAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        FocusAction::Start { mode, task } => {
            engine.start_focus(mode, task)?;
            print_json(&engine.timer().snapshot())?;
        }
        FocusAction::Pause => {
            if !engine.pause_focus() {
                eprintln!("timer is not running");
            }
            print_json(&engine.timer().snapshot())?;
        }
        FocusAction::Resume => {
            if !engine.resume_focus() {
                eprintln!("timer is not paused");
            }
            print_json(&engine.timer().snapshot())?;
        }
        FocusAction::Reset => {
            engine.reset_focus();
            print_json(&engine.timer().snapshot())?;
        }
        FocusAction::Distract => match engine.record_distraction() {
            Some(count) => print_json(&serde_json::json!({ "distractions": count }))?,
            None => return Err("no focus interval in progress".into()),
        },
        FocusAction::Tick { count } => {
            let mut last = TickOutcome::Inactive;
            for _ in 0..count {
                last = engine.tick();
                if !matches!(last, TickOutcome::Counting { .. }) {
                    break;
                }
            }
            print_json(&last)?;
        }
        FocusAction::Run { mode, task } => {
            if engine.timer().state() != TimerState::Running {
                engine.start_focus(mode, task)?;
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(drive(
                &mut engine,
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                },
                |outcome| {
                    if let TickOutcome::Counting { remaining_secs } = outcome {
                        eprint!("\r{} ", format_remaining(*remaining_secs));
                        let _ = std::io::stderr().flush();
                    }
                },
            ));
            eprintln!();
            print_json(&outcome)?;
        }
        FocusAction::Status => {
            print_json(&engine.timer().snapshot())?;
        }
        FocusAction::Sessions { limit } => {
            let sessions = engine.sessions();
            let shown = &sessions[..limit.unwrap_or(sessions.len()).min(sessions.len())];
            print_json(shown)?;
        }
        FocusAction::Edit {
            id,
            mood,
            notes,
            clear_notes,
        } => {
            let notes = if clear_notes { Some(None) } else { notes.map(Some) };
            let session = engine.update_session(&id, SessionPatch { mood, notes })?;
            print_json(&session)?;
        }
        FocusAction::Delete { id } => {
            engine.delete_session(&id)?;
            eprintln!("Session deleted: {id}");
        }
    }

    finish(&mut engine);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_minutes_and_seconds() {
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(0), "00:00");
    }
}
