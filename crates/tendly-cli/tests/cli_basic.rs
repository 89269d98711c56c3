//! Basic CLI E2E tests.
//!
//! Each test runs the built `tendly` binary against its own temporary data
//! directory and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

// ============================================================================
// Test Helpers
// ============================================================================

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tendly"))
        .args(args)
        .env("TENDLY_DATA_DIR", dir)
        .env("TENDLY_LOG", "off")
        .env_remove("TENDLY_USER")
        .env_remove("TENDLY_DISPLAY_NAME")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn create_task(dir: &Path, title: &str, priority: &str) -> String {
    let task = run_json(dir, &["task", "create", title, "--priority", priority]);
    task["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Tasks
// ============================================================================

#[test]
fn test_task_create_derives_rewards() {
    let dir = tempfile::tempdir().unwrap();
    let task = run_json(dir.path(), &["task", "create", "Read", "--priority", "low"]);
    assert_eq!(task["compost_reward"], 5);
    assert_eq!(task["plant_type"], "sprout");
    assert_eq!(task["status"], "pending");
}

#[test]
fn test_task_create_rejects_blank_title() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "create", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    let tasks = run_json(dir.path(), &["task", "list"]);
    assert_eq!(tasks.as_array().unwrap().len(), 0);
}

#[test]
fn test_task_complete_plants_and_credits() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_task(dir.path(), "Water plants", "high");

    let task = run_json(dir.path(), &["task", "complete", &id]);
    assert_eq!(task["status"], "completed");
    assert!(task["verification"].is_object());

    let plants = run_json(dir.path(), &["garden", "plants"]);
    let plants = plants.as_array().unwrap();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0]["growth"], 25);
    assert_eq!(plants[0]["type"], "tree");
    assert_eq!(plants[0]["stage"], "seedling");

    let profile = run_json(dir.path(), &["garden", "profile"]);
    assert_eq!(profile["profile"]["compost"], 15);
}

#[test]
fn test_task_toggle_undoes_completion() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_task(dir.path(), "Undo", "medium");
    run_json(dir.path(), &["task", "complete", &id]);
    let task = run_json(dir.path(), &["task", "toggle", &id]);
    assert_eq!(task["status"], "pending");

    let plants = run_json(dir.path(), &["garden", "plants"]);
    assert!(plants.as_array().unwrap().is_empty());
    let profile = run_json(dir.path(), &["garden", "profile"]);
    assert_eq!(profile["profile"]["compost"], 0);
}

#[test]
fn test_task_archive_hides_from_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_task(dir.path(), "Old", "low");
    run_json(dir.path(), &["task", "archive", &id]);

    let active = run_json(dir.path(), &["task", "list"]);
    assert!(active.as_array().unwrap().is_empty());
    let all = run_json(dir.path(), &["task", "list", "--all"]);
    assert_eq!(all.as_array().unwrap().len(), 1);
    let archived = run_json(dir.path(), &["task", "list", "--status", "archived"]);
    assert_eq!(archived[0]["id"], id.as_str());
}

#[test]
fn test_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "complete", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

// ============================================================================
// Focus
// ============================================================================

#[test]
fn test_focus_session_via_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.focus_minutes", "1"]);
    assert_eq!(code, 0);
    let id = create_task(dir.path(), "Seed", "low");
    run_json(dir.path(), &["task", "complete", &id]);

    let snapshot = run_json(dir.path(), &["focus", "start", "--mode", "focus"]);
    assert_eq!(snapshot["state"], "running");
    assert_eq!(snapshot["remaining_secs"], 60);
    let count = run_json(dir.path(), &["focus", "distract"]);
    assert_eq!(count["distractions"], 1);

    let outcome = run_json(dir.path(), &["focus", "tick", "--count", "120"]);
    assert_eq!(outcome["outcome"], "completed");
    assert_eq!(outcome["next_mode"], "short_break");
    assert_eq!(outcome["session"]["focus_score"], 90);
    assert_eq!(outcome["session"]["compost_earned"], 2);

    let plants = run_json(dir.path(), &["garden", "plants"]);
    assert_eq!(plants[0]["growth"], 35);

    let stats = run_json(dir.path(), &["stats", "today"]);
    assert_eq!(stats["today_sessions"], 1);
    assert_eq!(stats["average_focus_score"], 90);
}

#[test]
fn test_focus_pause_keeps_remaining() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["focus", "start"]);
    run_json(dir.path(), &["focus", "tick", "--count", "5"]);
    let paused = run_json(dir.path(), &["focus", "pause"]);
    assert_eq!(paused["state"], "paused");
    assert_eq!(paused["remaining_secs"], 1495);

    let idle = run_json(dir.path(), &["focus", "tick"]);
    assert_eq!(idle["outcome"], "inactive");

    let reset = run_json(dir.path(), &["focus", "reset"]);
    assert_eq!(reset["state"], "idle");
    assert_eq!(reset["remaining_secs"], 1500);
}

// ============================================================================
// Garden, social, config
// ============================================================================

#[test]
fn test_buy_seed_without_compost_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["garden", "buy-seed"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Not enough compost"));
}

#[test]
fn test_weather_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let set = run_json(dir.path(), &["garden", "weather", "rainy"]);
    assert_eq!(set["weather"], "rainy");
    let get = run_json(dir.path(), &["garden", "weather"]);
    assert_eq!(get["weather"], "rainy");
}

#[test]
fn test_social_like_is_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let post = run_json(dir.path(), &["social", "post", "First harvest!"]);
    let id = post["id"].as_str().unwrap();

    let liked = run_json(dir.path(), &["social", "like", id]);
    assert_eq!(liked["liked"], true);
    assert_eq!(liked["likes"], 1);
    let unliked = run_json(dir.path(), &["social", "like", id]);
    assert_eq!(unliked["liked"], false);
    assert_eq!(unliked["likes"], 0);
}

#[test]
fn test_share_after_first_task() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["social", "share", "first_sprout"]);
    assert_eq!(code, 1);

    let id = create_task(dir.path(), "First", "low");
    run_json(dir.path(), &["task", "complete", &id]);
    let post = run_json(dir.path(), &["social", "share", "first_sprout"]);
    assert_eq!(post["kind"], "achievement");

    let achievements = run_json(dir.path(), &["garden", "achievements"]);
    let first = achievements
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == "first_sprout")
        .unwrap();
    assert_eq!(first["unlocked"], true);
    assert_eq!(first["verified"], true);
}

#[test]
fn test_weekly_challenges_count_this_week() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_task(dir.path(), "Chore", "low");
    run_json(dir.path(), &["task", "complete", &id]);

    let rows = run_json(dir.path(), &["social", "challenges"]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let bee = rows.iter().find(|r| r["id"] == "busy_bee").unwrap();
    assert_eq!(bee["current"], 1);
    assert_eq!(bee["target"], 15);
    assert_eq!(bee["progress_pct"], 6);
}

#[test]
fn test_plants_filter_by_task() {
    let dir = tempfile::tempdir().unwrap();
    let first = create_task(dir.path(), "One", "low");
    let second = create_task(dir.path(), "Two", "high");
    run_json(dir.path(), &["task", "complete", &first]);
    run_json(dir.path(), &["task", "complete", &second]);

    let all = run_json(dir.path(), &["garden", "plants"]);
    assert_eq!(all.as_array().unwrap().len(), 2);
    let only = run_json(dir.path(), &["garden", "plants", "--task", &second]);
    let only = only.as_array().unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0]["task_id"], second.as_str());
}

#[test]
fn test_config_set_rejects_runaway_growth() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "garden.focus_growth", "4294967295"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("garden.focus_growth"));
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "garden.focus_growth"]);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.focus_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.focus_minutes", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.focus_minutes"]);
    assert_eq!(stdout.trim(), "50");
    let status = run_json(dir.path(), &["focus", "status"]);
    assert_eq!(status["remaining_secs"], 50 * 60);

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions_print_script() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("tendly"));
}
