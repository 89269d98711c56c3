use clap::Subcommand;
use serde::Serialize;
use tendly_core::{GardenWeather, GrowthStage, Plant};

use super::{finish, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum GardenAction {
    /// List plants with their growth stage
    Plants {
        /// Only plants grown by this task
        #[arg(long)]
        task: Option<String>,
    },
    /// Show the player profile
    Profile,
    /// Show or set today's garden weather
    Weather {
        /// sunny, cloudy or rainy
        weather: Option<GardenWeather>,
    },
    /// Spend compost
    Spend {
        amount: u64,
    },
    /// Trade compost for a rare seed
    BuySeed,
    /// List achievements with progress
    Achievements,
}

#[derive(Serialize)]
struct PlantView<'a> {
    #[serde(flatten)]
    plant: &'a Plant,
    stage: GrowthStage,
    task_title: Option<&'a str>,
}

#[derive(Serialize)]
struct AchievementView<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    unlocked: bool,
    unlocked_at: Option<chrono::DateTime<chrono::Utc>>,
    progress_pct: u8,
    verified: bool,
}

pub fn run(action: GardenAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        GardenAction::Plants { task } => {
            let plants: Vec<&Plant> = match task.as_deref() {
                Some(task_id) => engine.state().plants_for(task_id).collect(),
                None => engine.plants().iter().collect(),
            };
            let views: Vec<_> = plants
                .into_iter()
                .map(|plant| PlantView {
                    plant,
                    stage: plant.stage(),
                    task_title: engine.task(&plant.task_id).map(|t| t.title.as_str()),
                })
                .collect();
            print_json(&views)?;
        }
        GardenAction::Profile => {
            let profile = engine.profile();
            print_json(&serde_json::json!({
                "user_id": engine.identity().user_id,
                "display_name": engine.identity().display_name,
                "profile": profile,
                "total_focus_hours": profile.total_focus_hours(),
            }))?;
        }
        GardenAction::Weather { weather } => {
            if let Some(weather) = weather {
                engine.set_weather(weather);
            }
            let weather = engine.weather();
            print_json(&serde_json::json!({
                "weather": weather,
                "description": weather.description(),
            }))?;
        }
        GardenAction::Spend { amount } => {
            let balance = engine.spend_compost(amount)?;
            print_json(&serde_json::json!({ "spent": amount, "balance": balance }))?;
        }
        GardenAction::BuySeed => {
            let rare_seeds = engine.buy_rare_seed()?;
            print_json(&serde_json::json!({
                "rare_seeds": rare_seeds,
                "balance": engine.profile().compost,
            }))?;
        }
        GardenAction::Achievements => {
            let metrics = tendly_core::MetricSnapshot::from_profile(
                engine.profile(),
                engine.feed().interactions_by(&engine.identity().user_id),
            );
            let views: Vec<_> = engine
                .achievements()
                .iter()
                .map(|a| AchievementView {
                    id: &a.id,
                    name: &a.name,
                    description: &a.description,
                    unlocked: a.is_unlocked(),
                    unlocked_at: a.unlocked_at,
                    progress_pct: a.progress_pct(&metrics),
                    verified: a.verification.is_some(),
                })
                .collect();
            print_json(&views)?;
        }
    }

    finish(&mut engine);
    Ok(())
}
