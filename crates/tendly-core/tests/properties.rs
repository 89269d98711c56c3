//! Property checks for the reward and growth rules.

use proptest::prelude::*;
use tendly_core::timer::{compost_for, focus_score};
use tendly_core::{
    Config, GardenEngine, Identity, MemoryStore, NewTask, Priority, TickOutcome, TimerMode,
};

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn quick_engine(focus_growth: u32) -> GardenEngine {
    let mut config = Config::default();
    config.timer.focus_minutes = 1;
    config.garden.focus_growth = focus_growth;
    let mut engine = GardenEngine::new(Box::new(MemoryStore::new()), None, Identity::local(), config);
    engine.load();
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn growth_stays_within_bounds(sessions in 0usize..15, growth in any::<u32>(), tasks in 1usize..4) {
        let mut e = quick_engine(growth);
        for i in 0..tasks {
            let t = e.create_task(NewTask::new(format!("t{i}"), Priority::Low)).unwrap();
            e.complete_task(&t.id).unwrap();
        }
        for _ in 0..sessions {
            e.start_focus(Some(TimerMode::Focus), None).unwrap();
            while let TickOutcome::Counting { .. } = e.tick() {}
        }
        for plant in e.plants() {
            prop_assert!(plant.growth <= 100);
            let expected = (25 + growth as u64 * sessions as u64).min(100) as u8;
            prop_assert_eq!(plant.growth, expected);
        }
    }

    #[test]
    fn undo_is_inverse_of_complete(priorities in proptest::collection::vec(priority(), 1..6)) {
        let mut e = quick_engine(10);
        let ids: Vec<String> = priorities
            .iter()
            .map(|p| e.create_task(NewTask::new("task", *p)).unwrap().id)
            .collect();
        for id in ids.iter().skip(1) {
            e.complete_task(id).unwrap();
        }
        let target = &ids[0];

        let compost = e.profile().compost;
        let plants = e.plants().to_vec();
        e.complete_task(target).unwrap();
        e.toggle_task_completion(target).unwrap();
        prop_assert_eq!(e.profile().compost, compost);
        prop_assert_eq!(e.plants(), plants.as_slice());
        prop_assert!(!e.task(target).unwrap().is_completed());
    }

    #[test]
    fn focus_score_is_bounded(distractions in any::<u32>()) {
        let score = focus_score(distractions);
        prop_assert!(score <= 100);
        prop_assert_eq!(u32::from(score), 100u32.saturating_sub(distractions.saturating_mul(10)));
    }

    #[test]
    fn compost_counts_whole_minutes(secs in 0u64..100_000) {
        prop_assert_eq!(compost_for(secs, 2), (secs / 60) * 2);
    }
}
