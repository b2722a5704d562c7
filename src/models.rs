use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category given to tasks created without one.
pub const DEFAULT_CATEGORY: &str = "default";

/// Categories offered by the front ends. Any other string is accepted too.
pub const CATEGORIES: [&str; 5] = ["default", "personal", "work", "shopping", "health"];

/// Generates a fresh opaque identifier for tasks, subtasks and comments.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// How important a task is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Short marker shown next to a task.
    pub fn icon(self) -> &'static str {
        match self {
            Priority::High => "!!!",
            Priority::Medium => "!!",
            Priority::Low => "!",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'. Use low, medium or high.", other)),
        }
    }
}

/// A checklist item inside a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Subtask {
            id: new_id(),
            text: text.into(),
            completed: false,
        }
    }
}

/// A note appended to a task. Comments are never edited, only added or deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment {
            id: new_id(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Represents a single task in the to-do list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, stable for the lifetime of the record.
    pub id: String,
    /// The title shown in lists.
    pub text: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Free-form category, see [`CATEGORIES`] for the usual ones.
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Creation timestamp. Never changed after creation.
    pub created_at: DateTime<Utc>,
    /// Long-form notes.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    /// Builds a new, not yet completed task with a fresh id stamped with the current time.
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
    ) -> Self {
        Task {
            id: new_id(),
            text: text.into(),
            completed: false,
            category: category.into(),
            priority,
            due_date,
            created_at: Utc::now(),
            description: String::new(),
            subtasks: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Number of completed subtasks.
    pub fn subtasks_done(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// True when the task has a due date in the past and is still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|d| d < now)
    }
}

/// A set of field changes merged into a task by [`TaskStore::update`](crate::store::TaskStore::update).
///
/// Unset fields are left alone. `id` and `created_at` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
    pub subtasks: Option<Vec<Subtask>>,
    pub comments: Option<Vec<Comment>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }

    pub fn comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = Some(comments);
        self
    }

    /// True if the patch sets no field at all.
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Shallow-merges the set fields into `task`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(t) = &self.text {
            task.text = t.clone();
        }
        if let Some(c) = self.completed {
            task.completed = c;
        }
        if let Some(c) = &self.category {
            task.category = c.clone();
        }
        if let Some(p) = self.priority {
            task.priority = p;
        }
        if let Some(d) = self.due_date {
            task.due_date = d;
        }
        if let Some(d) = &self.description {
            task.description = d.clone();
        }
        if let Some(s) = &self.subtasks {
            task.subtasks = s.clone();
        }
        if let Some(c) = &self.comments {
            task.comments = c.clone();
        }
    }
}
