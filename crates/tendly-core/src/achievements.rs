//! Threshold achievements.
//!
//! Each achievement lists `(metric, target)` requirements checked against a
//! [`MetricSnapshot`]. Unlocking stamps `unlocked_at` once and is never
//! reverted, even if a metric later drops (for example after an undone
//! task completion).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attestation::Proof;
use crate::garden::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TasksCompleted,
    FocusSessions,
    FocusHours,
    StreakDays,
    PlantsGrown,
    LifetimeCompost,
    SocialInteractions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub metric: Metric,
    pub target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    Compost { amount: u64 },
    RareSeed,
    Badge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirements: Vec<Requirement>,
    pub reward: Reward,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verification: Option<Proof>,
}

/// Current values of every metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub tasks_completed: u64,
    pub focus_sessions: u64,
    pub focus_hours: u64,
    pub streak_days: u64,
    pub plants_grown: u64,
    pub lifetime_compost: u64,
    pub social_interactions: u64,
}

impl MetricSnapshot {
    pub fn from_profile(profile: &Profile, social_interactions: usize) -> Self {
        Self {
            tasks_completed: u64::from(profile.tasks_completed),
            focus_sessions: u64::from(profile.focus_sessions_completed),
            focus_hours: profile.total_focus_secs / 3600,
            streak_days: u64::from(profile.longest_streak),
            plants_grown: u64::from(profile.plants_grown),
            lifetime_compost: profile.lifetime_compost,
            social_interactions: social_interactions as u64,
        }
    }

    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TasksCompleted => self.tasks_completed,
            Metric::FocusSessions => self.focus_sessions,
            Metric::FocusHours => self.focus_hours,
            Metric::StreakDays => self.streak_days,
            Metric::PlantsGrown => self.plants_grown,
            Metric::LifetimeCompost => self.lifetime_compost,
            Metric::SocialInteractions => self.social_interactions,
        }
    }
}

impl Achievement {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        requirements: Vec<Requirement>,
        reward: Reward,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            requirements,
            reward,
            unlocked_at: None,
            verification: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn is_satisfied(&self, metrics: &MetricSnapshot) -> bool {
        self.requirements
            .iter()
            .all(|r| metrics.value(r.metric) >= r.target)
    }

    /// 0..=100, averaged over requirements. Unlocked reads as 100.
    pub fn progress_pct(&self, metrics: &MetricSnapshot) -> u8 {
        if self.is_unlocked() || self.requirements.is_empty() {
            return 100;
        }
        let total: u64 = self
            .requirements
            .iter()
            .map(|r| {
                if r.target == 0 {
                    100
                } else {
                    (metrics.value(r.metric).min(r.target) * 100) / r.target
                }
            })
            .sum();
        (total / self.requirements.len() as u64) as u8
    }
}

fn req(metric: Metric, target: u64) -> Vec<Requirement> {
    vec![Requirement { metric, target }]
}

/// Built-in catalog.
pub fn default_catalog() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "first_sprout",
            "First Sprout",
            "Completed your first task",
            req(Metric::TasksCompleted, 1),
            Reward::Badge,
        ),
        Achievement::new(
            "green_thumb",
            "Green Thumb",
            "Grow 25 plants",
            req(Metric::PlantsGrown, 25),
            Reward::RareSeed,
        ),
        Achievement::new(
            "focus_master",
            "Focus Master",
            "Complete 50 focus sessions",
            req(Metric::FocusSessions, 50),
            Reward::Compost { amount: 50 },
        ),
        Achievement::new(
            "zen_master",
            "Zen Master",
            "Complete 200 focus sessions",
            req(Metric::FocusSessions, 200),
            Reward::RareSeed,
        ),
        Achievement::new(
            "streak_warrior",
            "Streak Warrior",
            "Maintain a 30-day streak",
            req(Metric::StreakDays, 30),
            Reward::RareSeed,
        ),
        Achievement::new(
            "garden_guardian",
            "Garden Guardian",
            "Complete 500 tasks",
            req(Metric::TasksCompleted, 500),
            Reward::Badge,
        ),
        Achievement::new(
            "deep_roots",
            "Deep Roots",
            "Spend 10 hours in focus",
            req(Metric::FocusHours, 10),
            Reward::Compost { amount: 25 },
        ),
        Achievement::new(
            "compost_hoarder",
            "Compost Hoarder",
            "Earn 1000 compost",
            req(Metric::LifetimeCompost, 1000),
            Reward::Badge,
        ),
        Achievement::new(
            "good_neighbor",
            "Good Neighbor",
            "Like, comment or post 10 times",
            req(Metric::SocialInteractions, 10),
            Reward::Badge,
        ),
    ]
}

/// Keep the catalog's definitions but carry over unlock state from `stored`.
/// Stored entries no longer in the catalog are dropped.
pub fn merge_with_catalog(stored: Vec<Achievement>, catalog: Vec<Achievement>) -> Vec<Achievement> {
    catalog
        .into_iter()
        .map(|mut def| {
            if let Some(prev) = stored.iter().find(|s| s.id == def.id) {
                def.unlocked_at = prev.unlocked_at;
                def.verification = prev.verification.clone();
            }
            def
        })
        .collect()
}

/// Unlock everything newly satisfied. Returns indexes of the new unlocks.
pub fn evaluate(
    achievements: &mut [Achievement],
    metrics: &MetricSnapshot,
    now: DateTime<Utc>,
) -> Vec<usize> {
    let mut unlocked = Vec::new();
    for (idx, achievement) in achievements.iter_mut().enumerate() {
        if !achievement.is_unlocked() && achievement.is_satisfied(metrics) {
            achievement.unlocked_at = Some(now);
            unlocked.push(idx);
        }
    }
    unlocked
}
