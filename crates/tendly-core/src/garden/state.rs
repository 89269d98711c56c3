//! Everything the engine persists, in one place.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GardenWeather, NewTask, Plant, Position, Priority, Profile, Task, TaskCategory};
use crate::achievements::{default_catalog, Achievement};
use crate::challenges::ChallengeBoard;
use crate::social::Feed;
use crate::stats::local_day;
use crate::storage::Config;
use crate::timer::FocusSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenState {
    /// Newest first.
    pub tasks: Vec<Task>,
    pub plants: Vec<Plant>,
    /// Newest first.
    pub sessions: Vec<FocusSession>,
    pub profile: Profile,
    pub achievements: Vec<Achievement>,
    pub feed: Feed,
    pub weather: GardenWeather,
    pub challenges: ChallengeBoard,
}

impl Default for GardenState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            plants: Vec::new(),
            sessions: Vec::new(),
            profile: Profile::default(),
            achievements: default_catalog(),
            feed: Feed::default(),
            weather: GardenWeather::default(),
            challenges: ChallengeBoard::default(),
        }
    }
}

impl GardenState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Plants owned by `task_id`.
    pub fn plants_for<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Plant> + 'a {
        self.plants.iter().filter(move |p| p.task_id == task_id)
    }

    /// Remove the plants owned by `task_id`, returning how many went.
    pub(crate) fn remove_plants_for(&mut self, task_id: &str) -> usize {
        let before = self.plants.len();
        self.plants.retain(|p| p.task_id != task_id);
        before - self.plants.len()
    }

    /// First-run garden: three tasks, one already completed with a
    /// well-grown plant.
    pub fn sample<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R, config: &Config) -> Self {
        let mut state = Self::default();

        let mut workout = NewTask::new("Morning workout", Priority::High);
        workout.description = "30 minutes of cardio and stretching".into();
        workout.category = TaskCategory::Health;
        workout.tags = vec!["fitness".into()];

        let mut proposal = NewTask::new("Review project proposal", Priority::Medium);
        proposal.description = "Go through the Q1 proposal and leave comments".into();
        proposal.category = TaskCategory::Work;
        proposal.estimated_focus_minutes = Some(50);

        let mut reading = NewTask::new("Read for 20 minutes", Priority::Low);
        reading.category = TaskCategory::Learning;

        let inputs = [(reading, 1), (proposal, 2), (workout, 3)];
        for (idx, (input, id)) in inputs.into_iter().enumerate() {
            let created = now - Duration::hours(6 - idx as i64);
            // Titles are non-empty literals.
            if let Ok(task) = Task::new(format!("sample-task-{id}"), input, created) {
                state.tasks.insert(0, task);
            }
        }

        let completed_at = now - Duration::hours(2);
        if let Some(task) = state.task_mut("sample-task-2") {
            task.mark_completed(completed_at);
            let plant = Plant::new(
                "sample-plant-1".into(),
                task.id.clone(),
                task.plant_type,
                90,
                Position::random_within(&config.garden, rng),
                completed_at,
            );
            state.plants.push(plant);
        }

        state.profile.credit(10, config.rewards.compost_per_level);
        state.profile.tasks_completed = 1;
        state.profile.plants_grown = 1;
        state.profile.record_activity(local_day(completed_at));
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::{PlantType, TaskStatus};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn default_state_carries_catalog() {
        let state = GardenState::default();
        assert!(state.tasks.is_empty());
        assert_eq!(state.achievements.len(), default_catalog().len());
        assert_eq!(state.profile.level, 1);
    }

    #[test]
    fn sample_garden_is_consistent() {
        let config = Config::default();
        let mut rng = Pcg64::seed_from_u64(7);
        let state = GardenState::sample(Utc::now(), &mut rng, &config);

        assert_eq!(state.tasks.len(), 3);
        assert_eq!(state.tasks[0].title, "Morning workout");
        assert_eq!(state.tasks[0].plant_type, PlantType::Tree);

        let completed: Vec<_> = state.tasks.iter().filter(|t| t.is_completed()).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].plant_type, PlantType::Flower);
        assert!(completed[0].completed_at.is_some());

        let plants: Vec<_> = state.plants_for(&completed[0].id).collect();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].growth, 90);
        assert!(state
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .all(|t| t.completed_at.is_none()));
        assert_eq!(state.profile.compost, 10);
    }

    #[test]
    fn sample_activity_uses_local_day() {
        let now = Utc::now();
        let mut rng = Pcg64::seed_from_u64(3);
        let state = GardenState::sample(now, &mut rng, &Config::default());
        assert_eq!(
            state.profile.last_active_on,
            Some(local_day(now - Duration::hours(2)))
        );
        assert_eq!(state.profile.current_streak, 1);
    }

    #[test]
    fn remove_plants_only_touches_owner() {
        let mut state = GardenState::default();
        let pos = Position { x: 60.0, y: 160.0 };
        let now = Utc::now();
        state.plants.push(Plant::new("p1".into(), "a".into(), PlantType::Sprout, 25, pos, now));
        state.plants.push(Plant::new("p2".into(), "b".into(), PlantType::Tree, 25, pos, now));
        assert_eq!(state.remove_plants_for("a"), 1);
        assert_eq!(state.plants.len(), 1);
        assert_eq!(state.plants[0].id, "p2");
        assert_eq!(state.remove_plants_for("a"), 0);
    }
}
