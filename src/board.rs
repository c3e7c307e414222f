use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::task::{Quadrant, Task, TaskDraft};

/// The four quadrant lists. Serializes as `{"do": [..], "schedule": [..], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Board {
    #[serde(rename = "do", default)]
    now: Vec<Task>,
    #[serde(default)]
    schedule: Vec<Task>,
    #[serde(default)]
    delegate: Vec<Task>,
    #[serde(default)]
    drop: Vec<Task>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self, quadrant: Quadrant) -> &[Task] {
        match quadrant {
            Quadrant::Do => &self.now,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Drop => &self.drop,
        }
    }

    fn tasks_mut(&mut self, quadrant: Quadrant) -> &mut Vec<Task> {
        match quadrant {
            Quadrant::Do => &mut self.now,
            Quadrant::Schedule => &mut self.schedule,
            Quadrant::Delegate => &mut self.delegate,
            Quadrant::Drop => &mut self.drop,
        }
    }

    pub fn count(&self, quadrant: Quadrant) -> usize {
        self.tasks(quadrant).len()
    }

    pub fn total(&self) -> usize {
        Quadrant::ALL.iter().map(|&q| self.count(q)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Locate a task by id.
    pub fn find(&self, id: &str) -> Option<(Quadrant, usize, &Task)> {
        Quadrant::ALL.into_iter().find_map(|q| {
            self.tasks(q)
                .iter()
                .position(|t| t.id == id)
                .map(|idx| (q, idx, &self.tasks(q)[idx]))
        })
    }

    fn locate(&self, id: &str) -> Option<(Quadrant, usize)> {
        self.find(id).map(|(q, idx, _)| (q, idx))
    }

    /// Append a new task to `quadrant`. Returns its id, or `None` for a blank title.
    pub fn add(&mut self, draft: TaskDraft, quadrant: Quadrant) -> Option<String> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return None;
        }
        let task = Task::new(title, draft.notes.trim().to_string(), draft.due);
        let id = task.id.clone();
        debug!(%id, %quadrant, "adding task");
        self.tasks_mut(quadrant).push(task);
        Some(id)
    }

    /// Edit a task in place, moving it to `quadrant` if that differs.
    /// A blank title leaves the board untouched.
    pub fn update(&mut self, id: &str, draft: TaskDraft, quadrant: Quadrant) -> bool {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return false;
        }
        let Some((current, idx)) = self.locate(id) else {
            return false;
        };

        let task = &mut self.tasks_mut(current)[idx];
        let notes = draft.notes.trim().to_string();
        let mut changed = task.title != title || task.notes != notes || task.due != draft.due;
        task.title = title;
        task.notes = notes;
        task.due = draft.due;

        if current != quadrant {
            changed |= self.move_to(id, quadrant);
        }
        if changed {
            debug!(%id, "updated task");
        }
        changed
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let (quadrant, idx) = self.locate(id)?;
        debug!(%id, %quadrant, "deleting task");
        Some(self.tasks_mut(quadrant).remove(idx))
    }

    pub fn toggle_done(&mut self, id: &str) -> bool {
        let Some((quadrant, idx)) = self.locate(id) else {
            return false;
        };
        let task = &mut self.tasks_mut(quadrant)[idx];
        task.done = !task.done;
        true
    }

    /// Drop a task onto another quadrant. The task lands at the end of the
    /// target list; dropping onto its own quadrant changes nothing.
    pub fn move_to(&mut self, id: &str, quadrant: Quadrant) -> bool {
        let Some((current, idx)) = self.locate(id) else {
            return false;
        };
        if current == quadrant {
            return false;
        }
        let task = self.tasks_mut(current).remove(idx);
        debug!(%id, from = %current, to = %quadrant, "moving task");
        self.tasks_mut(quadrant).push(task);
        true
    }

    /// Swap two tasks within a quadrant. Used for reordering.
    pub fn swap(&mut self, quadrant: Quadrant, a: usize, b: usize) -> bool {
        let tasks = self.tasks_mut(quadrant);
        if a == b || a >= tasks.len() || b >= tasks.len() {
            return false;
        }
        tasks.swap(a, b);
        true
    }

    pub fn clear(&mut self) {
        for q in Quadrant::ALL {
            self.tasks_mut(q).clear();
        }
    }

    pub fn replace(&mut self, other: Self) {
        *self = other;
    }
}
