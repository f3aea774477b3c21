use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Total order used by the priority sort: high first, low last.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Home,
    Personal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(
        id: u64,
        text: String,
        priority: Priority,
        category: Category,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at: now,
            due_date,
            priority,
            category,
            subtasks: vec![],
        }
    }

    /// Deadline highlight: a pending task whose due date has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.map(|due| due < now).unwrap_or(false)
    }

    /// Next subtask id unique within this task. Ids are never reused for
    /// live subtasks, but deletion does not renumber the survivors.
    pub fn next_subtask_id(&self) -> u64 {
        self.subtasks.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }
}
