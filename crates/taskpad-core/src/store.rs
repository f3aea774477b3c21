use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::storage::Storage;
use crate::task::{Category, Priority, Subtask, Task};

/// What a mutation did to the collection, surfaced so the presentation
/// layer can report success or a validation message.
///
/// `NotFound` is reported distinctly here; whether to surface it or treat
/// it as a silent no-op is the caller's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    Applied,
    EmptyText,
    NotFound,
}

impl OpStatus {
    pub fn applied(self) -> bool {
        self == OpStatus::Applied
    }
}

/// Owns the authoritative task collection. All mutation funnels through
/// these methods; every applied mutation re-serializes the whole
/// collection to storage before returning (write-through).
///
/// A failed write returns `Err` after the in-memory change has taken
/// effect: memory stays the source of truth for the session and later
/// operations are not blocked.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
}

impl TaskStore {
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: Storage) -> Self {
        let tasks = storage.load_tasks();
        info!(count = tasks.len(), "restored task collection");
        Self { tasks, storage }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Creation-time id in epoch milliseconds, bumped past any task
    /// created in the same millisecond.
    fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let mut id = now.timestamp_millis().max(0) as u64;
        while self.tasks.iter().any(|t| t.id == id) {
            id += 1;
        }
        id
    }

    #[tracing::instrument(skip(self, text))]
    pub fn add_task(
        &mut self,
        text: &str,
        priority: Priority,
        category: Category,
        due_date: Option<DateTime<Utc>>,
    ) -> anyhow::Result<OpStatus> {
        if text.trim().is_empty() {
            warn!("rejected task with blank text");
            return Ok(OpStatus::EmptyText);
        }

        let now = Utc::now();
        let id = self.next_id(now);
        self.tasks
            .push(Task::new(id, text.to_string(), priority, category, due_date, now));

        debug!(id, count = self.tasks.len(), "task added");
        self.persist()
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_task(&mut self, id: u64) -> anyhow::Result<OpStatus> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(OpStatus::NotFound);
        };
        task.completed = !task.completed;
        let completed = task.completed;

        debug!(id, completed, "task toggled");
        self.persist()
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, id: u64) -> anyhow::Result<OpStatus> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(OpStatus::NotFound);
        }

        debug!(id, count = self.tasks.len(), "task deleted");
        self.persist()
    }

    #[tracing::instrument(skip(self, new_text))]
    pub fn edit_task_text(&mut self, id: u64, new_text: &str) -> anyhow::Result<OpStatus> {
        if new_text.trim().is_empty() {
            warn!(id, "rejected edit with blank text");
            return Ok(OpStatus::EmptyText);
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(OpStatus::NotFound);
        };
        task.text = new_text.to_string();

        debug!(id, "task text edited");
        self.persist()
    }

    /// Empties the collection unconditionally. Irreversible.
    #[tracing::instrument(skip(self))]
    pub fn clear_all(&mut self) -> anyhow::Result<()> {
        let before = self.tasks.len();
        self.tasks.clear();
        info!(before, "cleared all tasks");
        self.persist().map(|_| ())
    }

    #[tracing::instrument(skip(self, text))]
    pub fn add_subtask(&mut self, task_id: u64, text: &str) -> anyhow::Result<OpStatus> {
        if text.trim().is_empty() {
            warn!(task_id, "rejected subtask with blank text");
            return Ok(OpStatus::EmptyText);
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(OpStatus::NotFound);
        };

        let id = task.next_subtask_id();
        task.subtasks.push(Subtask {
            id,
            text: text.to_string(),
            completed: false,
        });

        debug!(task_id, subtask_id = id, "subtask added");
        self.persist()
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_subtask(&mut self, task_id: u64, subtask_id: u64) -> anyhow::Result<OpStatus> {
        let Some(subtask) = self.find_subtask(task_id, subtask_id) else {
            return Ok(OpStatus::NotFound);
        };
        subtask.completed = !subtask.completed;

        debug!(task_id, subtask_id, "subtask toggled");
        self.persist()
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_subtask(&mut self, task_id: u64, subtask_id: u64) -> anyhow::Result<OpStatus> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(OpStatus::NotFound);
        };
        let before = task.subtasks.len();
        task.subtasks.retain(|s| s.id != subtask_id);
        if task.subtasks.len() == before {
            return Ok(OpStatus::NotFound);
        }

        debug!(task_id, subtask_id, "subtask deleted");
        self.persist()
    }

    #[tracing::instrument(skip(self, new_text))]
    pub fn edit_subtask_text(
        &mut self,
        task_id: u64,
        subtask_id: u64,
        new_text: &str,
    ) -> anyhow::Result<OpStatus> {
        if new_text.trim().is_empty() {
            warn!(task_id, subtask_id, "rejected subtask edit with blank text");
            return Ok(OpStatus::EmptyText);
        }
        let Some(subtask) = self.find_subtask(task_id, subtask_id) else {
            return Ok(OpStatus::NotFound);
        };
        subtask.text = new_text.to_string();

        debug!(task_id, subtask_id, "subtask text edited");
        self.persist()
    }

    fn find_subtask(&mut self, task_id: u64, subtask_id: u64) -> Option<&mut Subtask> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)?
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
    }

    fn persist(&self) -> anyhow::Result<OpStatus> {
        self.storage.save_tasks(&self.tasks)?;
        Ok(OpStatus::Applied)
    }
}
