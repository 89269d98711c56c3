//! The garden engine: one owner for every collection, the focus timer and
//! the persistence and attestation seams.
//!
//! Every mutating operation validates first, then applies its rule,
//! re-evaluates achievements, queues [`Event`]s and persists. Validation
//! and lookup failures leave the state untouched. Persistence and
//! attestation failures are logged and never undo a change that already
//! happened in memory.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use std::collections::HashMap;

use crate::achievements::{self, default_catalog, merge_with_catalog, Achievement, MetricSnapshot, Reward};
use crate::attestation::{AttestationKind, AttestationProvider, AttestationRecord, Proof};
use crate::challenges::{self, ChallengeBoard, ChallengeStatus};
use crate::error::{CoreError, EntityKind, Result, ValidationError};
use crate::events::Event;
use crate::garden::{GardenState, GardenWeather, NewTask, Plant, Position, Profile, Task, TaskPatch};
use crate::identity::Identity;
use crate::social::{Comment, Feed, Post, PostKind};
use crate::stats::{local_day, GardenStats};
use crate::storage::snapshot::{self, ALL_KEYS};
use crate::storage::{Config, PersistenceProvider};
use crate::timer::{
    compost_for, focus_score, ActiveSession, Completion, FocusSession, FocusTimer, SessionMood,
    SessionPatch, TimerMode, TimerState,
};

/// Result of one `tick()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Timer is not running.
    Inactive,
    Counting { remaining_secs: u64 },
    Completed {
        mode: TimerMode,
        next_mode: TimerMode,
        /// The recorded session, for focus intervals.
        session: Option<FocusSession>,
    },
}

/// What `load()` found in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Keys decoded from stored documents.
    pub restored: usize,
    /// Keys that existed but could not be read or decoded.
    pub fallbacks: usize,
    /// Whether the sample garden was planted.
    pub seeded: bool,
}

/// What `persist()` did per key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    pub written: usize,
    /// Unchanged since the last successful write.
    pub skipped: usize,
    /// Still dirty; retried on the next persist.
    pub failed: usize,
}

impl PersistOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub struct GardenEngine {
    store: Box<dyn PersistenceProvider>,
    attestor: Option<Box<dyn AttestationProvider>>,
    identity: Identity,
    config: Config,
    state: GardenState,
    timer: FocusTimer,
    rng: Pcg64,
    events: Vec<Event>,
    /// Last payload successfully written per key.
    saved: HashMap<&'static str, String>,
}

impl GardenEngine {
    /// Empty engine. Call [`GardenEngine::load`] to restore stored state.
    pub fn new(
        store: Box<dyn PersistenceProvider>,
        attestor: Option<Box<dyn AttestationProvider>>,
        identity: Identity,
        config: Config,
    ) -> Self {
        let timer = FocusTimer::new(&config.timer);
        Self {
            store,
            attestor,
            identity,
            config,
            state: GardenState::default(),
            timer,
            rng: Pcg64::from_entropy(),
            events: Vec::new(),
            saved: HashMap::new(),
        }
    }

    /// Fix the plant placement sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg64::seed_from_u64(seed);
        self
    }

    // ── Loading and saving ───────────────────────────────────────────

    /// Restore every collection from the store. Unreadable keys fall back
    /// to their defaults. A store with nothing in it is planted with the
    /// sample garden when `seed_sample_data` is set.
    pub fn load(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        let mut found_any = false;
        let mut state = GardenState::default();

        if let Some(v) = self.read(snapshot::TASKS, &mut report, &mut found_any) {
            state.tasks = v;
        }
        if let Some(v) = self.read(snapshot::PLANTS, &mut report, &mut found_any) {
            state.plants = v;
        }
        if let Some(v) = self.read(snapshot::SESSIONS, &mut report, &mut found_any) {
            state.sessions = v;
        }
        if let Some(v) = self.read(snapshot::PROFILE, &mut report, &mut found_any) {
            state.profile = v;
        }
        if let Some(stored) = self.read::<Vec<Achievement>>(snapshot::ACHIEVEMENTS, &mut report, &mut found_any) {
            state.achievements = merge_with_catalog(stored, default_catalog());
        }
        if let Some(v) = self.read(snapshot::FEED, &mut report, &mut found_any) {
            state.feed = v;
        }
        if let Some(v) = self.read(snapshot::WEATHER, &mut report, &mut found_any) {
            state.weather = v;
        }
        if let Some(v) = self.read(snapshot::CHALLENGES, &mut report, &mut found_any) {
            state.challenges = v;
        }
        let mut timer = self
            .read::<FocusTimer>(snapshot::TIMER, &mut report, &mut found_any)
            .unwrap_or_else(|| FocusTimer::new(&self.config.timer));
        timer.apply_settings(&self.config.timer);

        if !found_any && self.config.seed_sample_data {
            state = GardenState::sample(Utc::now(), &mut self.rng, &self.config);
            report.seeded = true;
            tracing::info!("planted sample garden");
        }

        self.state = state;
        self.timer = timer;
        tracing::debug!(
            store = self.store.name(),
            restored = report.restored,
            fallbacks = report.fallbacks,
            "loaded garden"
        );
        self.persist();
        report
    }

    fn read<T: serde::de::DeserializeOwned>(
        &mut self,
        key: &'static str,
        report: &mut LoadReport,
        found_any: &mut bool,
    ) -> Option<T> {
        let raw = match self.store.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "load failed, using defaults");
                report.fallbacks += 1;
                *found_any = true;
                return None;
            }
        };
        *found_any = true;
        match snapshot::decode::<T>(&raw) {
            Ok(value) => {
                report.restored += 1;
                self.saved.insert(key, raw);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable document");
                report.fallbacks += 1;
                None
            }
        }
    }

    fn encode_key(&self, key: &str) -> std::result::Result<String, serde_json::Error> {
        match key {
            snapshot::TASKS => snapshot::encode(&self.state.tasks),
            snapshot::PLANTS => snapshot::encode(&self.state.plants),
            snapshot::SESSIONS => snapshot::encode(&self.state.sessions),
            snapshot::PROFILE => snapshot::encode(&self.state.profile),
            snapshot::ACHIEVEMENTS => snapshot::encode(&self.state.achievements),
            snapshot::FEED => snapshot::encode(&self.state.feed),
            snapshot::TIMER => snapshot::encode(&self.timer),
            snapshot::CHALLENGES => snapshot::encode(&self.state.challenges),
            _ => snapshot::encode(&self.state.weather),
        }
    }

    /// Write every changed collection. Identical payloads are skipped, so
    /// calling this twice in a row writes nothing the second time.
    pub fn persist(&mut self) -> PersistOutcome {
        let mut outcome = PersistOutcome::default();
        for key in ALL_KEYS {
            let payload = match self.encode_key(key) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to encode collection");
                    outcome.failed += 1;
                    continue;
                }
            };
            if self.saved.get(key) == Some(&payload) {
                outcome.skipped += 1;
                continue;
            }
            match self.store.save(key, &payload) {
                Ok(()) => {
                    self.saved.insert(key, payload);
                    outcome.written += 1;
                }
                Err(e) => {
                    tracing::warn!(key, store = self.store.name(), error = %e, "save failed, will retry");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    fn commit(&mut self, now: DateTime<Utc>) {
        self.evaluate_challenges(now);
        self.evaluate_achievements(now);
        self.persist();
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &GardenState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn plants(&self) -> &[Plant] {
        &self.state.plants
    }

    pub fn sessions(&self) -> &[FocusSession] {
        &self.state.sessions
    }

    pub fn profile(&self) -> &Profile {
        &self.state.profile
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.state.achievements
    }

    pub fn feed(&self) -> &Feed {
        &self.state.feed
    }

    pub fn challenges(&self) -> &ChallengeBoard {
        &self.state.challenges
    }

    /// Progress on this week's challenges.
    pub fn weekly_challenges(&self) -> Vec<ChallengeStatus> {
        self.weekly_challenges_at(Utc::now())
    }

    pub fn weekly_challenges_at(&self, now: DateTime<Utc>) -> Vec<ChallengeStatus> {
        challenges::status(&self.state.challenges, &self.state, now)
    }

    pub fn weather(&self) -> GardenWeather {
        self.state.weather
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn stats(&self) -> GardenStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> GardenStats {
        GardenStats::compute(&self.state, now)
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Swap in a new configuration. Timer durations apply from the next
    /// interval.
    pub fn update_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        self.timer.apply_settings(&config.timer);
        self.config = config;
        self.persist();
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────

    fn existing_task(&self, id: &str) -> Result<&Task> {
        self.state
            .task(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))
    }

    fn task_snapshot(&self, id: &str) -> Result<Task> {
        self.existing_task(id).cloned()
    }

    pub fn create_task(&mut self, input: NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task::new(new_id(), input, now)?;
        tracing::debug!(task_id = %task.id, priority = %task.priority, "task created");
        self.events.push(Event::TaskCreated {
            task_id: task.id.clone(),
            at: now,
        });
        self.state.tasks.insert(0, task.clone());
        self.commit(now);
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let now = Utc::now();
        let task = self
            .state
            .task_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))?;
        if patch.is_empty() {
            return Ok(task.clone());
        }
        task.apply(patch, now)?;
        let task = task.clone();
        self.events.push(Event::TaskUpdated {
            task_id: task.id.clone(),
            at: now,
        });
        self.commit(now);
        Ok(task)
    }

    /// Complete a pending task: credit its reward and plant one plant.
    /// Completing an already completed task changes nothing.
    pub fn complete_task(&mut self, id: &str) -> Result<Task> {
        let now = Utc::now();
        let task = self.existing_task(id)?;
        if task.is_archived() {
            return Err(ValidationError::TaskArchived { id: id.to_string() }.into());
        }
        if task.is_completed() {
            tracing::debug!(task_id = id, "task already completed");
            return Ok(task.clone());
        }
        self.complete_pending(id, now);
        self.commit(now);
        self.task_snapshot(id)
    }

    /// Complete a pending task, or undo the completion of a completed one.
    pub fn toggle_task_completion(&mut self, id: &str) -> Result<Task> {
        let now = Utc::now();
        let task = self.existing_task(id)?;
        if task.is_archived() {
            return Err(ValidationError::TaskArchived { id: id.to_string() }.into());
        }
        if task.is_completed() {
            self.reopen(id, now);
        } else {
            self.complete_pending(id, now);
        }
        self.commit(now);
        self.task_snapshot(id)
    }

    fn complete_pending(&mut self, id: &str, now: DateTime<Utc>) {
        let Some(task) = self.state.task_mut(id) else {
            return;
        };
        task.mark_completed(now);
        let task_id = task.id.clone();
        let reward = task.compost_reward;
        let plant_type = task.plant_type;
        let payload = serde_json::json!({
            "title": task.title,
            "priority": task.priority,
            "compost_reward": reward,
        });

        let profile = &mut self.state.profile;
        profile.credit(reward, self.config.rewards.compost_per_level);
        profile.tasks_completed = profile.tasks_completed.saturating_add(1);
        profile.plants_grown = profile.plants_grown.saturating_add(1);
        profile.record_activity(local_day(now));

        let position = Position::random_within(&self.config.garden, &mut self.rng);
        let plant = Plant::new(
            new_id(),
            task_id.clone(),
            plant_type,
            self.config.garden.initial_growth,
            position,
            now,
        );
        tracing::info!(task_id = %task_id, compost = reward, plant = ?plant_type, "task completed");
        self.events.push(Event::TaskCompleted {
            task_id: task_id.clone(),
            compost_earned: reward,
            at: now,
        });
        self.events.push(Event::PlantPlanted {
            plant_id: plant.id.clone(),
            task_id: task_id.clone(),
            plant_type,
            at: now,
        });
        self.state.plants.push(plant);

        if let Some(proof) = self.attest(AttestationKind::TaskCompletion, &task_id, payload, now) {
            if let Some(task) = self.state.task_mut(&task_id) {
                task.verification = Some(proof);
            }
        }
    }

    fn reopen(&mut self, id: &str, now: DateTime<Utc>) {
        let Some(task) = self.state.task_mut(id) else {
            return;
        };
        task.mark_pending(now);
        let reward = task.compost_reward;
        let removed = self.state.remove_plants_for(id);

        let profile = &mut self.state.profile;
        let debited = profile.revoke(reward, self.config.rewards.compost_per_level);
        profile.tasks_completed = profile.tasks_completed.saturating_sub(1);
        profile.plants_grown = profile.plants_grown.saturating_sub(removed as u32);

        tracing::info!(task_id = id, compost = debited, plants_removed = removed, "task reopened");
        self.events.push(Event::TaskReopened {
            task_id: id.to_string(),
            compost_debited: debited,
            at: now,
        });
    }

    /// Hide a task from the active views. The record and its plant stay.
    pub fn archive_task(&mut self, id: &str) -> Result<Task> {
        let now = Utc::now();
        let task = self
            .state
            .task_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))?;
        if task.is_archived() {
            return Ok(task.clone());
        }
        task.mark_archived(now);
        let task = task.clone();
        self.events.push(Event::TaskArchived {
            task_id: task.id.clone(),
            at: now,
        });
        self.commit(now);
        Ok(task)
    }

    /// Remove a task and every plant it owns. Compost already earned stays.
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let now = Utc::now();
        let idx = self
            .state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))?;
        let task = self.state.tasks.remove(idx);
        let plants_removed = self.state.remove_plants_for(id);
        tracing::debug!(task_id = id, plants_removed, "task deleted");
        self.events.push(Event::TaskDeleted {
            task_id: task.id.clone(),
            plants_removed,
            at: now,
        });
        self.commit(now);
        Ok(task)
    }

    // ── Focus timer ──────────────────────────────────────────────────

    /// Start an interval. `mode` defaults to whatever the timer is parked
    /// on; a task may only be attached to a focus interval.
    pub fn start_focus(&mut self, mode: Option<TimerMode>, task_id: Option<String>) -> Result<()> {
        if let Some(id) = task_id.as_deref() {
            let task = self.existing_task(id)?;
            if task.is_archived() {
                return Err(ValidationError::TaskArchived { id: id.to_string() }.into());
            }
        }
        let event = self.timer.start(mode, task_id).ok_or_else(|| {
            ValidationError::invalid("timer", "an interval is already in progress")
        })?;
        tracing::debug!(mode = ?self.timer.mode(), "timer started");
        self.events.push(event);
        self.persist();
        Ok(())
    }

    /// Returns false when nothing was running.
    pub fn pause_focus(&mut self) -> bool {
        match self.timer.pause() {
            Some(event) => {
                self.events.push(event);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Returns false when nothing was paused.
    pub fn resume_focus(&mut self) -> bool {
        match self.timer.resume() {
            Some(event) => {
                self.events.push(event);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Abandon the current interval. Nothing is recorded or credited.
    pub fn reset_focus(&mut self) {
        let event = self.timer.reset();
        tracing::debug!(mode = ?self.timer.mode(), "timer reset");
        self.events.push(event);
        self.persist();
    }

    pub fn record_distraction(&mut self) -> Option<u32> {
        let count = self.timer.record_distraction()?;
        self.events.push(Event::DistractionRecorded {
            count,
            at: Utc::now(),
        });
        self.persist();
        Some(count)
    }

    /// Advance the countdown by one second. Counting ticks are not
    /// persisted; a finished interval is.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(completion) = self.timer.tick() else {
            return match self.timer.state() {
                TimerState::Running => TickOutcome::Counting {
                    remaining_secs: self.timer.remaining_secs(),
                },
                _ => TickOutcome::Inactive,
            };
        };

        let now = completion.ended_at;
        self.events.push(Event::TimerCompleted {
            mode: completion.mode,
            next_mode: completion.next_mode,
            at: now,
        });
        let session = match (completion.mode, completion.session.clone()) {
            (TimerMode::Focus, Some(active)) => Some(self.finalize_focus(&completion, active)),
            _ => None,
        };
        tracing::debug!(mode = ?completion.mode, next = ?completion.next_mode, "interval finished");
        self.commit(now);
        TickOutcome::Completed {
            mode: completion.mode,
            next_mode: completion.next_mode,
            session,
        }
    }

    fn finalize_focus(&mut self, completion: &Completion, active: ActiveSession) -> FocusSession {
        let now = completion.ended_at;
        let elapsed = completion.elapsed_secs;
        let compost = compost_for(elapsed, self.config.rewards.compost_per_focus_minute);
        let growth = self.config.garden.focus_growth;

        let profile = &mut self.state.profile;
        profile.credit(compost, self.config.rewards.compost_per_level);
        profile.total_focus_secs = profile.total_focus_secs.saturating_add(elapsed);
        profile.focus_sessions_completed = profile.focus_sessions_completed.saturating_add(1);
        profile.record_activity(local_day(now));

        for plant in &mut self.state.plants {
            plant.grow(growth, now);
        }
        if !self.state.plants.is_empty() {
            self.events.push(Event::GardenGrown {
                plants: self.state.plants.len(),
                growth_points: growth,
                at: now,
            });
        }

        if let Some(task) = active.task_id.as_deref().and_then(|id| self.state.task_mut(id)) {
            task.actual_focus_secs = task.actual_focus_secs.saturating_add(elapsed);
        }

        let mut session = FocusSession {
            id: new_id(),
            task_id: active.task_id,
            duration_secs: elapsed,
            planned_duration_secs: completion.planned_secs,
            start_time: active.started_at,
            end_time: now,
            distractions_count: active.distractions,
            focus_score: focus_score(active.distractions),
            compost_earned: compost,
            plant_growth_contributed: growth,
            mood: SessionMood::default(),
            notes: None,
            verification: None,
        };
        let payload = serde_json::json!({
            "duration_secs": session.duration_secs,
            "focus_score": session.focus_score,
            "compost_earned": session.compost_earned,
        });
        session.verification = self.attest(AttestationKind::FocusSession, &session.id, payload, now);

        tracing::info!(
            session_id = %session.id,
            minutes = elapsed / 60,
            score = session.focus_score,
            compost,
            "focus session recorded"
        );
        self.events.push(Event::SessionRecorded {
            session_id: session.id.clone(),
            duration_secs: session.duration_secs,
            focus_score: session.focus_score,
            compost_earned: compost,
            at: now,
        });
        self.state.sessions.insert(0, session.clone());
        session
    }

    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> Result<FocusSession> {
        let session = self
            .state
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        session.apply(patch);
        let session = session.clone();
        self.persist();
        Ok(session)
    }

    pub fn set_session_mood(&mut self, id: &str, mood: SessionMood) -> Result<FocusSession> {
        self.update_session(
            id,
            SessionPatch {
                mood: Some(mood),
                notes: None,
            },
        )
    }

    /// Drop a recorded session. Compost it earned is kept.
    pub fn delete_session(&mut self, id: &str) -> Result<FocusSession> {
        let idx = self
            .state
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        let session = self.state.sessions.remove(idx);
        self.events.push(Event::SessionDeleted {
            session_id: session.id.clone(),
            at: Utc::now(),
        });
        self.persist();
        Ok(session)
    }

    // ── Profile and garden ───────────────────────────────────────────

    /// Returns the remaining balance.
    pub fn spend_compost(&mut self, amount: u64) -> Result<u64> {
        let now = Utc::now();
        let balance = self.state.profile.spend(amount)?;
        tracing::info!(amount, balance, "compost spent");
        self.events.push(Event::CompostSpent {
            amount,
            balance,
            at: now,
        });
        self.commit(now);
        Ok(balance)
    }

    /// Trade `rare_seed_cost` compost for a rare seed. Returns the seed count.
    pub fn buy_rare_seed(&mut self) -> Result<u32> {
        let cost = self.config.rewards.rare_seed_cost;
        self.spend_compost(cost)?;
        let now = Utc::now();
        let profile = &mut self.state.profile;
        profile.rare_seeds = profile.rare_seeds.saturating_add(1);
        let rare_seeds = profile.rare_seeds;
        self.events.push(Event::RareSeedAcquired { rare_seeds, at: now });
        self.persist();
        Ok(rare_seeds)
    }

    pub fn set_weather(&mut self, weather: GardenWeather) {
        if self.state.weather == weather {
            return;
        }
        self.state.weather = weather;
        self.events.push(Event::WeatherChanged {
            weather,
            at: Utc::now(),
        });
        self.persist();
    }

    // ── Social ───────────────────────────────────────────────────────

    pub fn create_post(&mut self, kind: PostKind, content: &str) -> Result<Post> {
        self.publish(kind, content, None)
    }

    /// Post an unlocked achievement to the feed.
    pub fn share_achievement(&mut self, achievement_id: &str) -> Result<Post> {
        let achievement = self
            .state
            .achievements
            .iter()
            .find(|a| a.id == achievement_id)
            .ok_or_else(|| {
                ValidationError::invalid("achievement_id", format!("unknown achievement '{achievement_id}'"))
            })?;
        if !achievement.is_unlocked() {
            return Err(ValidationError::invalid(
                "achievement_id",
                format!("'{}' is not unlocked yet", achievement.name),
            )
            .into());
        }
        let content = format!("Unlocked {}: {}", achievement.name, achievement.description);
        self.publish(PostKind::Achievement, &content, Some(achievement_id.to_string()))
    }

    fn publish(&mut self, kind: PostKind, content: &str, achievement_id: Option<String>) -> Result<Post> {
        let now = Utc::now();
        let post = self
            .state
            .feed
            .create_post(new_id(), &self.identity, kind, content, achievement_id, now)?
            .clone();
        self.events.push(Event::PostCreated {
            post_id: post.id.clone(),
            at: now,
        });
        self.commit(now);
        Ok(post)
    }

    /// Flip the current user's like. Returns whether the post is now liked.
    pub fn toggle_like(&mut self, post_id: &str) -> Result<bool> {
        let now = Utc::now();
        let liked = self.state.feed.toggle_like(post_id, &self.identity.user_id)?;
        let likes = self.state.feed.get(post_id).map(Post::likes).unwrap_or(0);
        self.events.push(Event::PostLikeToggled {
            post_id: post_id.to_string(),
            liked,
            likes,
            at: now,
        });
        self.commit(now);
        Ok(liked)
    }

    pub fn add_comment(&mut self, post_id: &str, content: &str) -> Result<Comment> {
        let now = Utc::now();
        let comment = self
            .state
            .feed
            .add_comment(post_id, new_id(), &self.identity, content, now)?;
        self.events.push(Event::CommentAdded {
            post_id: post_id.to_string(),
            comment_id: comment.id.clone(),
            at: now,
        });
        self.commit(now);
        Ok(comment)
    }

    pub fn delete_post(&mut self, post_id: &str) -> Result<Post> {
        let post = self.state.feed.delete_post(post_id, &self.identity.user_id)?;
        self.events.push(Event::PostDeleted {
            post_id: post.id.clone(),
            at: Utc::now(),
        });
        self.persist();
        Ok(post)
    }

    // ── Achievements and attestation ─────────────────────────────────

    fn evaluate_achievements(&mut self, now: DateTime<Utc>) {
        // Compost rewards can satisfy further thresholds, so repeat until
        // a pass unlocks nothing.
        loop {
            let metrics = MetricSnapshot::from_profile(
                &self.state.profile,
                self.state.feed.interactions_by(&self.identity.user_id),
            );
            let unlocked = achievements::evaluate(&mut self.state.achievements, &metrics, now);
            if unlocked.is_empty() {
                break;
            }
            for idx in unlocked {
                let achievement = &self.state.achievements[idx];
                let (id, name, reward) = (achievement.id.clone(), achievement.name.clone(), achievement.reward);
                self.apply_reward(reward);
                tracing::info!(achievement = %id, "achievement unlocked");
                self.events.push(Event::AchievementUnlocked {
                    achievement_id: id.clone(),
                    name,
                    at: now,
                });
                let payload = serde_json::json!({ "reward": reward });
                let proof = self.attest(AttestationKind::AchievementUnlock, &id, payload, now);
                self.state.achievements[idx].verification = proof;
            }
        }
    }

    fn apply_reward(&mut self, reward: Reward) {
        match reward {
            Reward::Compost { amount } => self
                .state
                .profile
                .credit(amount, self.config.rewards.compost_per_level),
            Reward::RareSeed => {
                self.state.profile.rare_seeds = self.state.profile.rare_seeds.saturating_add(1)
            }
            Reward::Badge => {}
        }
    }

    fn evaluate_challenges(&mut self, now: DateTime<Utc>) {
        let week = challenges::week_start(now);
        if self.state.challenges.roll_to(week) {
            tracing::debug!(%week, "new challenge week");
        }
        let metrics = challenges::week_metrics(&self.state, week);
        for idx in self.state.challenges.evaluate(&metrics, now) {
            let challenge = &self.state.challenges.challenges[idx];
            let (id, title, reward) = (challenge.id.clone(), challenge.title.clone(), challenge.reward);
            self.apply_reward(reward);
            tracing::info!(challenge = %id, %week, "weekly challenge completed");
            self.events.push(Event::ChallengeCompleted {
                challenge_id: id.clone(),
                title,
                week_start: week,
                at: now,
            });
            let payload = serde_json::json!({ "week_start": week, "reward": reward });
            let entity = format!("{id}@{week}");
            let proof = self.attest(AttestationKind::ChallengeCompletion, &entity, payload, now);
            self.state.challenges.challenges[idx].verification = proof;
        }
    }

    /// Best effort. Failures are logged and yield `None`.
    fn attest(
        &mut self,
        kind: AttestationKind,
        entity_id: &str,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Option<Proof> {
        if !self.config.attestation.enabled {
            return None;
        }
        let attestor = self.attestor.as_ref()?;
        let record = AttestationRecord::new(kind, entity_id, self.identity.user_id.clone(), payload, now);
        match attestor.attest(&record) {
            Ok(proof) => {
                tracing::debug!(provider = attestor.name(), entity_id, "attested");
                self.events.push(Event::Attested {
                    kind,
                    entity_id: entity_id.to_string(),
                    digest: proof.digest.clone(),
                    at: now,
                });
                Some(proof)
            }
            Err(e) => {
                tracing::warn!(provider = attestor.name(), entity_id, error = %e, "attestation failed");
                None
            }
        }
    }
}
