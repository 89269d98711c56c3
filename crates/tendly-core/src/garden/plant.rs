use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::task::PlantType;
use crate::storage::GardenConfig;

/// Upper bound for plant growth.
pub const MAX_GROWTH: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Uniformly random point inside the configured display area.
    pub fn random_within<R: Rng + ?Sized>(bounds: &GardenConfig, rng: &mut R) -> Self {
        let (min_x, max_x) = ordered(bounds.min_x, bounds.max_x);
        let (min_y, max_y) = ordered(bounds.min_y, bounds.max_y);
        Self {
            x: snap(rng.gen_range(min_x..=max_x), min_x, max_x),
            y: snap(rng.gen_range(min_y..=max_y), min_y, max_y),
        }
    }
}

/// Display coordinates are kept to a tenth of a unit.
fn snap(v: f64, min: f64, max: f64) -> f64 {
    ((v * 10.0).round() / 10.0).clamp(min, max)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Display stage derived from growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seedling,
    Growing,
    Maturing,
    Bloomed,
}

/// A garden element grown from a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    /// Owning task, resolved by lookup.
    pub task_id: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    /// 0..=100
    pub growth: u8,
    pub position: Position,
    pub planted_at: DateTime<Utc>,
    #[serde(default)]
    pub last_watered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub health: Option<u8>,
}

impl Plant {
    pub fn new(
        id: String,
        task_id: String,
        plant_type: PlantType,
        growth: u8,
        position: Position,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            plant_type,
            growth: growth.min(MAX_GROWTH),
            position,
            planted_at: now,
            last_watered: None,
            health: None,
        }
    }

    /// Add growth points, clamped at [`MAX_GROWTH`]. Returns the points
    /// actually applied.
    pub fn grow(&mut self, points: u32, now: DateTime<Utc>) -> u8 {
        let before = self.growth;
        let target = u32::from(self.growth)
            .saturating_add(points)
            .min(u32::from(MAX_GROWTH));
        self.growth = target as u8;
        self.last_watered = Some(now);
        self.growth - before
    }

    pub fn stage(&self) -> GrowthStage {
        match self.growth {
            0..=29 => GrowthStage::Seedling,
            30..=59 => GrowthStage::Growing,
            60..=89 => GrowthStage::Maturing,
            _ => GrowthStage::Bloomed,
        }
    }

    pub fn is_fully_grown(&self) -> bool {
        self.growth >= MAX_GROWTH
    }
}
