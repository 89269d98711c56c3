use clap::Subcommand;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's statistics (local calendar day)
    Today,
    /// Every recorded session
    All,
}

pub fn run(action: StatsAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        StatsAction::Today => {
            print_json(&engine.stats())?;
        }
        StatsAction::All => {
            let sessions = engine.sessions();
            let total_secs: u64 = sessions.iter().map(|s| s.duration_secs).sum();
            let compost: u64 = sessions.iter().map(|s| s.compost_earned).sum();
            print_json(&serde_json::json!({
                "sessions": sessions.len(),
                "total_focus_secs": total_secs,
                "compost_from_focus": compost,
                "profile": engine.profile(),
            }))?;
        }
    }
    Ok(())
}
