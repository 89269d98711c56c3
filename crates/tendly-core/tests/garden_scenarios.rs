//! End-to-end garden scenarios driven through `GardenEngine`.
//!
//! Each test builds an engine over an in-memory store and walks one user
//! story: creating, completing, focusing, archiving and undoing.

use tendly_core::{
    Config, CoreError, GardenEngine, Identity, MemoryStore, NewTask, PlantType, Priority,
    TaskStatus, TickOutcome, TimerMode,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn engine_with(config: Config) -> GardenEngine {
    let mut engine =
        GardenEngine::new(Box::new(MemoryStore::new()), None, Identity::local(), config).with_seed(42);
    engine.load();
    engine
}

fn engine() -> GardenEngine {
    engine_with(Config::default())
}

/// Start a focus interval, record `distractions`, and tick it out.
fn run_focus(engine: &mut GardenEngine, distractions: u32) -> TickOutcome {
    engine.start_focus(Some(TimerMode::Focus), None).unwrap();
    for _ in 0..distractions {
        engine.record_distraction().unwrap();
    }
    run_to_end(engine)
}

fn run_to_end(engine: &mut GardenEngine) -> TickOutcome {
    loop {
        match engine.tick() {
            TickOutcome::Counting { .. } => continue,
            other => return other,
        }
    }
}

// ============================================================================
// Task lifecycle
// ============================================================================

#[test]
fn scenario_a_create_low_priority_task() {
    let mut e = engine();
    let task = e.create_task(NewTask::new("Read", Priority::Low)).unwrap();
    assert_eq!(task.compost_reward, 5);
    assert_eq!(task.plant_type, PlantType::Sprout);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_at.is_none());
}

#[test]
fn reward_table_is_stable_across_calls() {
    let mut e = engine();
    for (priority, plant, reward) in [
        (Priority::Low, PlantType::Sprout, 5),
        (Priority::Medium, PlantType::Flower, 10),
        (Priority::High, PlantType::Tree, 15),
    ] {
        for _ in 0..3 {
            let task = e.create_task(NewTask::new("same", priority)).unwrap();
            assert_eq!(task.plant_type, plant);
            assert_eq!(task.compost_reward, reward);
        }
    }
}

#[test]
fn scenario_b_complete_task_plants_one_seedling() {
    let mut e = engine();
    let task = e.create_task(NewTask::new("Read", Priority::Low)).unwrap();
    let before = e.profile().compost;

    let task = e.complete_task(&task.id).unwrap();

    assert_eq!(e.profile().compost, before + 5);
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.completed_at.is_some());
    assert_eq!(e.plants().len(), 1);
    let plant = &e.plants()[0];
    assert_eq!(plant.growth, 25);
    assert_eq!(plant.task_id, task.id);
    assert_eq!(plant.plant_type, PlantType::Sprout);
}

#[test]
fn priority_change_recomputes_reward_but_not_status() {
    let mut e = engine();
    let task = e.create_task(NewTask::new("Read", Priority::Low)).unwrap();
    e.complete_task(&task.id).unwrap();

    let patch = tendly_core::TaskPatch {
        priority: Some(Priority::High),
        ..Default::default()
    };
    let task = e.update_task(&task.id, patch).unwrap();
    assert_eq!(task.compost_reward, 15);
    assert_eq!(task.plant_type, PlantType::Tree);
    assert_eq!(task.status, TaskStatus::Completed);

    let blank = tendly_core::TaskPatch {
        title: Some("  ".into()),
        ..Default::default()
    };
    assert!(matches!(e.update_task(&task.id, blank), Err(CoreError::Validation(_))));
    assert_eq!(e.task(&task.id).unwrap().title, "Read");
}

#[test]
fn complete_then_undo_restores_compost_and_plants() {
    let mut e = engine();
    let keep = e.create_task(NewTask::new("Keep", Priority::Medium)).unwrap();
    e.complete_task(&keep.id).unwrap();
    let task = e.create_task(NewTask::new("Undo me", Priority::High)).unwrap();

    let compost_before = e.profile().compost;
    let plants_before = e.plants().to_vec();

    e.complete_task(&task.id).unwrap();
    assert_eq!(e.plants().len(), plants_before.len() + 1);
    let reopened = e.toggle_task_completion(&task.id).unwrap();

    assert_eq!(reopened.status, TaskStatus::Pending);
    assert!(reopened.completed_at.is_none());
    assert_eq!(e.profile().compost, compost_before);
    assert_eq!(e.plants(), plants_before.as_slice());
}

#[test]
fn toggle_completes_pending_task() {
    let mut e = engine();
    let task = e.create_task(NewTask::new("Flip", Priority::Low)).unwrap();
    let task = e.toggle_task_completion(&task.id).unwrap();
    assert!(task.is_completed());
    assert_eq!(e.plants().len(), 1);
}

#[test]
fn delete_removes_only_matching_plants() {
    let mut e = engine();
    let ids: Vec<String> = (0..3)
        .map(|i| {
            let t = e.create_task(NewTask::new(format!("t{i}"), Priority::Medium)).unwrap();
            e.complete_task(&t.id).unwrap();
            t.id
        })
        .collect();
    let untouched: Vec<_> = e.plants().iter().filter(|p| p.task_id != ids[1]).cloned().collect();
    let compost = e.profile().compost;

    e.delete_task(&ids[1]).unwrap();

    assert_eq!(e.plants(), untouched.as_slice());
    assert!(e.task(&ids[1]).is_none());
    assert_eq!(e.profile().compost, compost);
}

#[test]
fn scenario_e_archive_hides_from_active_views() {
    let mut e = engine();
    let task = e.create_task(NewTask::new("Archive me", Priority::Low)).unwrap();
    e.complete_task(&task.id).unwrap();
    e.archive_task(&task.id).unwrap();

    let stats = e.stats();
    assert_eq!(stats.pending_tasks, 0);
    assert_eq!(stats.completed_tasks, 0);
    assert_eq!(stats.archived_tasks, 1);

    let stored = e.task(&task.id).unwrap();
    assert_eq!(stored.status, TaskStatus::Archived);
    assert!(stored.archived_at.is_some());
    assert_eq!(e.tasks().len(), 1);
}

// ============================================================================
// Focus sessions
// ============================================================================

fn one_minute_focus() -> Config {
    let mut config = Config::default();
    config.timer.focus_minutes = 1;
    config.timer.short_break_minutes = 1;
    config.timer.long_break_minutes = 1;
    config
}

#[test]
fn scenario_c_full_focus_session_with_distractions() {
    let mut config = Config::default();
    config.timer.focus_minutes = 3;
    let mut e = engine_with(config);

    let grown = e.create_task(NewTask::new("Grown", Priority::Low)).unwrap();
    let young = e.create_task(NewTask::new("Young", Priority::Low)).unwrap();
    e.complete_task(&grown.id).unwrap();
    e.complete_task(&young.id).unwrap();
    // Push one plant close to the cap.
    for _ in 0..7 {
        let TickOutcome::Completed { .. } = run_focus(&mut e, 0) else {
            panic!("focus did not finish");
        };
        let _ = run_to_end_break(&mut e);
    }
    let growth_before: Vec<u8> = e.plants().iter().map(|p| p.growth).collect();
    let compost_before = e.profile().compost;

    let TickOutcome::Completed { session: Some(session), .. } = run_focus(&mut e, 2) else {
        panic!("expected a recorded session");
    };

    assert_eq!(session.focus_score, 80);
    assert_eq!(session.distractions_count, 2);
    assert_eq!(session.duration_secs, 180);
    assert_eq!(session.compost_earned, 3 * 2);
    assert_eq!(e.profile().compost, compost_before + 6);
    for (plant, before) in e.plants().iter().zip(growth_before) {
        assert_eq!(plant.growth, (before + 10).min(100));
    }
}

fn run_to_end_break(e: &mut GardenEngine) -> TickOutcome {
    e.start_focus(None, None).unwrap();
    run_to_end(e)
}

#[test]
fn scenario_d_fourth_focus_routes_to_long_break() {
    let mut e = engine_with(one_minute_focus());
    let mut routes = Vec::new();
    for _ in 0..4 {
        let TickOutcome::Completed { next_mode, .. } = run_focus(&mut e, 0) else {
            panic!("focus did not finish");
        };
        routes.push(next_mode);
        // Run the break so the next start is a focus interval again.
        let TickOutcome::Completed { next_mode: after_break, .. } = run_to_end_break(&mut e) else {
            panic!("break did not finish");
        };
        assert_eq!(after_break, TimerMode::Focus);
    }
    assert_eq!(
        routes,
        vec![
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::LongBreak
        ]
    );
}

#[test]
fn reset_discards_partial_session_but_keeps_earlier_rewards() {
    let mut e = engine_with(one_minute_focus());
    run_focus(&mut e, 0);
    let compost = e.profile().compost;
    e.start_focus(Some(TimerMode::Focus), None).unwrap();
    for _ in 0..30 {
        e.tick();
    }
    e.reset_focus();

    assert_eq!(e.sessions().len(), 1);
    assert_eq!(e.profile().compost, compost);
    assert_eq!(e.tick(), TickOutcome::Inactive);
}

#[test]
fn pause_freezes_the_countdown() {
    let mut e = engine_with(one_minute_focus());
    e.start_focus(None, None).unwrap();
    e.tick();
    assert!(e.pause_focus());
    for _ in 0..10 {
        assert_eq!(e.tick(), TickOutcome::Inactive);
    }
    assert_eq!(e.timer().remaining_secs(), 59);
    assert!(e.resume_focus());
    assert_eq!(e.tick(), TickOutcome::Counting { remaining_secs: 58 });
}

#[test]
fn stats_report_todays_sessions() {
    let mut e = engine_with(one_minute_focus());
    assert_eq!(e.stats().average_focus_score, 0);
    run_focus(&mut e, 0);
    run_to_end_break(&mut e);
    run_focus(&mut e, 3);

    let stats = e.stats();
    assert_eq!(stats.today_sessions, 2);
    assert_eq!(stats.total_focus_today_secs, 120);
    // (100 + 70) / 2
    assert_eq!(stats.average_focus_score, 85);
    assert_eq!(stats.current_streak, 1);
}
