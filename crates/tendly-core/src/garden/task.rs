//! Task records and the priority reward table.
//!
//! A task's plant species and compost reward are never stored independently
//! of its priority: both are re-derived whenever the priority is set.
//!
//! ```text
//!   PENDING ──complete──> COMPLETED ──archive──> ARCHIVED
//!      ^                     |
//!      +────────toggle───────+
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::attestation::Proof;
use crate::error::ValidationError;

/// Task priority. Drives the plant species and compost reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Species planted when a task of this priority is completed.
    pub fn plant_type(self) -> PlantType {
        match self {
            Priority::High => PlantType::Tree,
            Priority::Medium => PlantType::Flower,
            Priority::Low => PlantType::Sprout,
        }
    }

    /// Compost credited when a task of this priority is completed.
    pub fn compost_reward(self) -> u64 {
        match self {
            Priority::High => 15,
            Priority::Medium => 10,
            Priority::Low => 5,
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::invalid(
                "priority",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

/// Plant species grown from completed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Sprout,
    Flower,
    Tree,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    #[default]
    Personal,
    Health,
    Learning,
}

impl FromStr for TaskCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TaskCategory::Work),
            "personal" => Ok(TaskCategory::Personal),
            "health" => Ok(TaskCategory::Health),
            "learning" => Ok(TaskCategory::Learning),
            other => Err(ValidationError::invalid(
                "category",
                format!("'{other}' is not one of work, personal, health, learning"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Archived,
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub plant_type: PlantType,
    pub compost_reward: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub estimated_focus_minutes: Option<u32>,
    /// Sum of finalized focus sessions that referenced this task.
    #[serde(default)]
    pub actual_focus_secs: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Set when the completion was attested.
    #[serde(default)]
    pub verification: Option<Proof>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub estimated_focus_minutes: Option<u32>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; the doubly optional
/// fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub estimated_focus_minutes: Option<Option<u32>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty("title"));
    }
    Ok(trimmed.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl Task {
    /// Build a pending task from user input.
    pub fn new(id: String, input: NewTask, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let title = normalize_title(&input.title)?;
        Ok(Self {
            id,
            title,
            description: input.description.trim().to_string(),
            priority: input.priority,
            category: input.category,
            status: TaskStatus::Pending,
            plant_type: input.priority.plant_type(),
            compost_reward: input.priority.compost_reward(),
            tags: normalize_tags(input.tags),
            estimated_focus_minutes: input.estimated_focus_minutes,
            actual_focus_secs: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            archived_at: None,
            due_date: input.due_date,
            verification: None,
        })
    }

    /// Apply a partial update. Validates everything before touching `self`.
    /// Never changes `status`.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.set_priority(priority);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(estimate) = patch.estimated_focus_minutes {
            self.estimated_focus_minutes = estimate;
        }
        self.updated_at = now;
        Ok(())
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.plant_type = priority.plant_type();
        self.compost_reward = priority.compost_reward();
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_archived(&self) -> bool {
        self.status == TaskStatus::Archived
    }

    pub(crate) fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub(crate) fn mark_pending(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
        self.verification = None;
        self.updated_at = now;
    }

    /// Archived tasks keep `completed_at` as history.
    pub(crate) fn mark_archived(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Archived;
        self.archived_at = Some(now);
        self.updated_at = now;
    }
}
