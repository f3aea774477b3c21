//! Pure projections over a task collection snapshot: filtering, sorting,
//! and aggregate statistics. Nothing here mutates the store.
//!
//! Callers compose filter before sort; the projection helpers take and
//! return borrowed tasks so the store stays the single owner.

use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FromStr for FilterMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            other => Err(anyhow!("unknown filter mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "createdat" | "created_at" => Ok(SortKey::CreatedAt),
            "due" | "duedate" | "due_date" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            other => Err(anyhow!("unknown sort key: {other}")),
        }
    }
}

/// Completion-state filter AND case-insensitive substring search. An
/// empty search string excludes nothing.
pub fn filter_tasks<'a>(tasks: &'a [Task], mode: FilterMode, search: &str) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|task| match mode {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        })
        .filter(|task| needle.is_empty() || task.text.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort of an already-filtered projection. Equal keys keep their
/// original relative order.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    trace!(?key, count = tasks.len(), "sorting projection");
    match key {
        // newest first
        SortKey::CreatedAt => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        // soonest first; undated tasks after every dated one
        SortKey::DueDate => tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
        SortKey::Priority => tasks.sort_by_key(|t| t.priority.rank()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub by_priority: PriorityCounts,
}

pub fn stats(tasks: &[Task]) -> Stats {
    let mut out = Stats {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        if task.completed {
            out.completed += 1;
        }
        match task.priority {
            Priority::High => out.by_priority.high += 1,
            Priority::Medium => out.by_priority.medium += 1,
            Priority::Low => out.by_priority.low += 1,
        }
    }
    out.active = out.total - out.completed;
    out
}

/// Display-only completion percentage. With no subtasks the task's own
/// flag decides all-or-nothing; the result never feeds back into
/// `Task::completed`.
pub fn subtask_progress(task: &Task) -> u8 {
    if task.subtasks.is_empty() {
        return if task.completed { 100 } else { 0 };
    }
    let done = task.subtasks.iter().filter(|s| s.completed).count();
    ((done as f64 / task.subtasks.len() as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::task::{Category, Subtask};

    fn task(id: u64, text: &str, completed: bool, priority: Priority) -> Task {
        let created = Utc.timestamp_opt(1_700_000_000 + id as i64, 0).single().expect("valid timestamp");
        let mut t = Task::new(
            id,
            text.to_string(),
            priority,
            Category::default(),
            None,
            created,
        );
        t.completed = completed;
        t
    }

    #[test]
    fn active_and_completed_partition_the_collection() {
        let tasks = vec![
            task(1, "one", false, Priority::Medium),
            task(2, "two", true, Priority::Medium),
            task(3, "three", false, Priority::Medium),
        ];

        let active = filter_tasks(&tasks, FilterMode::Active, "");
        assert!(active.iter().all(|t| !t.completed));
        assert_eq!(active.len(), 2);

        let completed = filter_tasks(&tasks, FilterMode::Completed, "");
        assert!(completed.iter().all(|t| t.completed));
        assert_eq!(completed.len(), 1);

        assert_eq!(filter_tasks(&tasks, FilterMode::All, "").len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let tasks = vec![
            task(1, "Foobar", false, Priority::Medium),
            task(2, "bazqux", false, Priority::Medium),
        ];

        let hits = filter_tasks(&tasks, FilterMode::All, "foo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Foobar");

        // empty search excludes nothing
        assert_eq!(filter_tasks(&tasks, FilterMode::All, "").len(), 2);
    }

    #[test]
    fn search_composes_with_mode_by_and() {
        let tasks = vec![
            task(1, "pay rent", true, Priority::Medium),
            task(2, "pay electricity", false, Priority::Medium),
        ];

        let hits = filter_tasks(&tasks, FilterMode::Active, "pay");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn priority_sort_is_stable_within_equal_ranks() {
        let tasks = vec![
            task(1, "a", false, Priority::Low),
            task(2, "b", false, Priority::High),
            task(3, "c", false, Priority::Medium),
            task(4, "d", false, Priority::High),
        ];
        let mut view: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut view, SortKey::Priority);

        let ids: Vec<u64> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let now = Utc::now();
        let mut soon = task(1, "soon", false, Priority::Medium);
        soon.due_date = Some(now + Duration::days(1));
        let undated = task(2, "undated", false, Priority::Medium);
        let mut later = task(3, "later", false, Priority::Medium);
        later.due_date = Some(now + Duration::days(7));

        let tasks = vec![undated, later, soon];
        let mut view: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut view, SortKey::DueDate);

        let ids: Vec<u64> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn created_at_sort_is_newest_first() {
        let tasks = vec![
            task(1, "oldest", false, Priority::Medium),
            task(2, "middle", false, Priority::Medium),
            task(3, "newest", false, Priority::Medium),
        ];
        let mut view: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut view, SortKey::CreatedAt);

        let ids: Vec<u64> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn stats_counts_by_state_and_priority() {
        let tasks = vec![
            task(1, "a", true, Priority::High),
            task(2, "b", true, Priority::High),
            task(3, "c", false, Priority::Low),
            task(4, "d", true, Priority::Medium),
            task(5, "e", false, Priority::Low),
        ];

        let s = stats(&tasks);
        assert_eq!(s.total, 5);
        assert_eq!(s.active, 2);
        assert_eq!(s.completed, 3);
        assert_eq!(
            s.by_priority,
            PriorityCounts {
                high: 2,
                medium: 1,
                low: 2
            }
        );
    }

    #[test]
    fn progress_rounds_subtask_ratio() {
        let mut t = task(1, "trip", false, Priority::Medium);
        t.subtasks = vec![
            Subtask {
                id: 1,
                text: "socks".to_string(),
                completed: true,
            },
            Subtask {
                id: 2,
                text: "charger".to_string(),
                completed: false,
            },
            Subtask {
                id: 3,
                text: "passport".to_string(),
                completed: false,
            },
        ];
        assert_eq!(subtask_progress(&t), 33);

        t.subtasks[1].completed = true;
        assert_eq!(subtask_progress(&t), 67);
    }

    #[test]
    fn progress_without_subtasks_follows_the_task_flag() {
        let mut t = task(1, "single", false, Priority::Medium);
        assert_eq!(subtask_progress(&t), 0);
        t.completed = true;
        assert_eq!(subtask_progress(&t), 100);
    }

    #[test]
    fn mode_and_key_parse_from_cli_strings() {
        assert_eq!("active".parse::<FilterMode>().expect("parse mode"), FilterMode::Active);
        assert_eq!("ALL".parse::<FilterMode>().expect("parse mode"), FilterMode::All);
        assert!("done".parse::<FilterMode>().is_err());

        assert_eq!("due".parse::<SortKey>().expect("parse key"), SortKey::DueDate);
        assert_eq!("priority".parse::<SortKey>().expect("parse key"), SortKey::Priority);
        assert!("size".parse::<SortKey>().is_err());
    }
}
