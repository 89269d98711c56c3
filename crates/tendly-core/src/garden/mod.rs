//! Garden domain records: tasks, plants, the player profile, and the
//! collections the engine persists.

mod plant;
mod profile;
mod state;
mod task;

pub use plant::{GrowthStage, Plant, Position, MAX_GROWTH};
pub use profile::{level_for, Profile};
pub use state::GardenState;
pub use task::{NewTask, PlantType, Priority, Task, TaskCategory, TaskPatch, TaskStatus};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Daily mood shown as the garden's weather.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GardenWeather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
}

impl GardenWeather {
    pub fn description(&self) -> &'static str {
        match self {
            GardenWeather::Sunny => "Feeling bright and motivated",
            GardenWeather::Cloudy => "Taking things steady",
            GardenWeather::Rainy => "Nurturing and reflective",
        }
    }
}

impl FromStr for GardenWeather {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunny" => Ok(GardenWeather::Sunny),
            "cloudy" => Ok(GardenWeather::Cloudy),
            "rainy" => Ok(GardenWeather::Rainy),
            other => Err(ValidationError::invalid(
                "weather",
                format!("'{other}' is not one of sunny, cloudy, rainy"),
            )),
        }
    }
}
