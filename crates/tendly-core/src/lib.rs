//! # Tendly Core Library
//!
//! Business logic for Tendly, a to-do list that grows a garden. Completing
//! a task plants a seedling and earns compost; finishing a focus session
//! grows every plant. The CLI binary drives the same engine a GUI would.
//!
//! ## Architecture
//!
//! - **Garden**: tasks, plants, the player profile and their reward rules
//! - **Timer**: a tick-driven focus/break state machine plus an async
//!   one-second driver
//! - **Storage**: versioned JSON documents behind a key/value
//!   [`PersistenceProvider`], with SQLite and in-memory backends, and
//!   TOML configuration
//! - **Attestation**: optional best-effort proofs of finished work
//! - **Challenges**: weekly goals scored from that week's activity only
//!
//! ## Key Components
//!
//! - [`GardenEngine`]: owns all state and exposes every operation
//! - [`FocusTimer`]: countdown state machine
//! - [`GardenStats`]: derived figures for a given day
//! - [`Config`]: application configuration

pub mod achievements;
pub mod attestation;
pub mod challenges;
pub mod engine;
pub mod error;
pub mod events;
pub mod garden;
pub mod identity;
pub mod social;
pub mod stats;
pub mod storage;
pub mod timer;

pub use achievements::{Achievement, Metric, MetricSnapshot, Requirement, Reward};
pub use attestation::{
    AttestationKind, AttestationProvider, AttestationRecord, LocalAttestor, NoopAttestor, Proof,
};
pub use challenges::{ChallengeBoard, ChallengeStatus, WeeklyChallenge};
pub use engine::{GardenEngine, LoadReport, PersistOutcome, TickOutcome};
pub use error::{
    AttestationError, ConfigError, CoreError, EntityKind, PersistenceError, Result, ValidationError,
};
pub use events::Event;
pub use garden::{
    GardenState, GardenWeather, GrowthStage, NewTask, Plant, PlantType, Position, Priority,
    Profile, Task, TaskCategory, TaskPatch, TaskStatus,
};
pub use identity::Identity;
pub use social::{Comment, Feed, Post, PostKind};
pub use stats::GardenStats;
pub use storage::{Config, MemoryStore, PersistenceProvider, SqliteStore};
pub use timer::{FocusSession, FocusTimer, SessionMood, SessionPatch, TimerMode, TimerState};
