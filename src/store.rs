//! The task store: single source of truth for the task list and its history.
//!
//! Every operation runs to completion before returning and is visible in the
//! next [`TaskStore::tasks`] read. A change that leaves the list as it was
//! (unknown id, nothing matched, a move onto itself) records nothing,
//! persists nothing and notifies nobody.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::history::{History, DEFAULT_LIMIT};
use crate::models::{Comment, Priority, Subtask, Task, TaskPatch, DEFAULT_CATEGORY};
use crate::storage::{load_tasks, save_tasks, KeyValueStore, MemoryStore};

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&[Task])>;

pub struct TaskStore {
    tasks: Vec<Task>,
    history: History<Vec<Task>>,
    storage: Box<dyn KeyValueStore>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks.len())
            .field("history_position", &self.history.position())
            .field("history_len", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TaskStore {
    /// Loads the persisted list from `storage` and records it as the first
    /// history snapshot, so the first change can be undone back to it.
    pub fn open(storage: Box<dyn KeyValueStore>, history_limit: Option<usize>) -> Self {
        let tasks = load_tasks(storage.as_ref());
        tracing::debug!(count = tasks.len(), "task store opened");
        let mut history = History::new(history_limit);
        history.push(tasks.clone());
        TaskStore {
            tasks,
            history,
            storage,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// A store over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()), Some(DEFAULT_LIMIT))
    }

    /// The live list, in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Finds the single task whose id starts with `prefix`.
    ///
    /// Returns `None` when nothing or more than one task matches.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&Task> {
        if prefix.is_empty() {
            return None;
        }
        if let Some(t) = self.get(prefix) {
            return Some(t);
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Some(t),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_position(&self) -> Option<usize> {
        self.history.position()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Registers `observer`, called with the new list after every change.
    pub fn subscribe(&mut self, observer: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Creates a task with the default category, no due date and medium priority.
    pub fn add_text(&mut self, text: impl Into<String>) -> String {
        self.add(text, DEFAULT_CATEGORY, None, Priority::default())
    }

    /// Creates a task at the top of the list and returns its id.
    ///
    /// Callers reject empty text before getting here.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        category: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
    ) -> String {
        let task = Task::new(text, category, due_date, priority);
        let id = task.id.clone();
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());
        self.commit(next);
        tracing::debug!(%id, "task added");
        id
    }

    /// Flips the completed flag. Returns false if `id` is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        let changed = self.edit_one(id, |t| t.completed = !t.completed);
        if changed {
            tracing::debug!(%id, "task toggled");
        }
        changed
    }

    /// Deletes a task. Returns false if `id` is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let next: Vec<Task> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        let changed = self.commit(next);
        if changed {
            tracing::debug!(%id, "task removed");
        }
        changed
    }

    /// Merges `patch` into a task. Returns false if `id` is unknown or nothing changed.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> bool {
        self.edit_one(id, |t| patch.apply(t))
    }

    /// Moves the task at `from` so it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }
        let mut next = self.tasks.clone();
        let moved = next.remove(from);
        next.insert(to, moved);
        if self.commit(next) {
            tracing::debug!(from, to, "task moved");
        }
        Ok(())
    }

    /// Deletes every task in `ids` as one undoable step. Returns how many were removed.
    pub fn bulk_remove<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let ids: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| !ids.contains(t.id.as_str()))
            .cloned()
            .collect();
        let removed = self.tasks.len() - next.len();
        self.commit(next);
        removed
    }

    /// Merges `patch` into every task in `ids` as one undoable step.
    /// Returns how many tasks matched.
    pub fn bulk_update<S: AsRef<str>>(&mut self, ids: &[S], patch: &TaskPatch) -> usize {
        let ids: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
        let mut matched = 0;
        let next: Vec<Task> = self
            .tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if ids.contains(t.id.as_str()) {
                    matched += 1;
                    patch.apply(&mut t);
                }
                t
            })
            .collect();
        self.commit(next);
        matched
    }

    /// Restores the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.tasks = snapshot.clone();
        tracing::debug!(position = ?self.history.position(), "undo");
        self.after_change();
        true
    }

    /// Re-applies the next snapshot. Returns false at the newest one.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.tasks = snapshot.clone();
        tracing::debug!(position = ?self.history.position(), "redo");
        self.after_change();
        true
    }

    /// Appends a subtask. Returns its id, or `None` if the task is unknown.
    pub fn add_subtask(&mut self, task_id: &str, text: impl Into<String>) -> Option<String> {
        let subtask = Subtask::new(text);
        let sub_id = subtask.id.clone();
        let mut subtasks = self.get(task_id)?.subtasks.clone();
        subtasks.push(subtask);
        self.update(task_id, &TaskPatch::new().subtasks(subtasks));
        Some(sub_id)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        self.edit_subtasks(task_id, |subs| {
            subs.iter_mut()
                .filter(|s| s.id == subtask_id)
                .for_each(|s| s.completed = !s.completed);
        })
    }

    pub fn edit_subtask(&mut self, task_id: &str, subtask_id: &str, text: &str) -> bool {
        self.edit_subtasks(task_id, |subs| {
            subs.iter_mut()
                .filter(|s| s.id == subtask_id)
                .for_each(|s| s.text = text.to_string());
        })
    }

    pub fn remove_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        self.edit_subtasks(task_id, |subs| subs.retain(|s| s.id != subtask_id))
    }

    /// Appends a comment. Returns its id, or `None` if the task is unknown.
    pub fn add_comment(&mut self, task_id: &str, text: impl Into<String>) -> Option<String> {
        let comment = Comment::new(text);
        let comment_id = comment.id.clone();
        let mut comments = self.get(task_id)?.comments.clone();
        comments.push(comment);
        self.update(task_id, &TaskPatch::new().comments(comments));
        Some(comment_id)
    }

    pub fn remove_comment(&mut self, task_id: &str, comment_id: &str) -> bool {
        let Some(task) = self.get(task_id) else {
            return false;
        };
        let comments: Vec<Comment> = task
            .comments
            .iter()
            .filter(|c| c.id != comment_id)
            .cloned()
            .collect();
        self.update(task_id, &TaskPatch::new().comments(comments))
    }

    fn edit_subtasks(&mut self, task_id: &str, f: impl FnOnce(&mut Vec<Subtask>)) -> bool {
        let Some(task) = self.get(task_id) else {
            return false;
        };
        let mut subtasks = task.subtasks.clone();
        f(&mut subtasks);
        self.update(task_id, &TaskPatch::new().subtasks(subtasks))
    }

    fn edit_one(&mut self, id: &str, f: impl FnOnce(&mut Task)) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let mut next = self.tasks.clone();
        f(&mut next[idx]);
        self.commit(next)
    }

    /// Installs `next` as the live list and records it, unless it equals the current one.
    fn commit(&mut self, next: Vec<Task>) -> bool {
        if next == self.tasks {
            return false;
        }
        self.tasks = next;
        self.history.push(self.tasks.clone());
        self.after_change();
        true
    }

    fn after_change(&mut self) {
        self.persist();
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.tasks);
        }
    }

    /// Best effort: a failed write is logged and the in-memory list stays authoritative.
    fn persist(&self) {
        if let Err(e) = save_tasks(self.storage.as_ref(), &self.tasks) {
            tracing::warn!(error = %e, "failed to persist tasks");
        }
    }
}
