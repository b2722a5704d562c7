//! View-side filtering and progress over a task list.
//!
//! The store never filters; views narrow what they show with these helpers
//! and keep full-list indices so that moves map back onto the store.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::models::Task;

/// Which tasks a view shows by completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// All -> Active -> Completed -> All.
    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    fn accepts(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        })
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

/// True if `task` passes `filter` and its title or category contains `query`
/// (case-insensitive). An empty query matches everything.
pub fn matches(task: &Task, filter: Filter, query: &str) -> bool {
    if !filter.accepts(task) {
        return false;
    }
    let query = query.trim().to_lowercase();
    query.is_empty()
        || task.text.to_lowercase().contains(&query)
        || task.category.to_lowercase().contains(&query)
}

/// The matching tasks, each paired with its index in `tasks`.
pub fn filtered<'a>(tasks: &'a [Task], filter: Filter, query: &str) -> Vec<(usize, &'a Task)> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| matches(t, filter, query))
        .collect()
}

/// Number of tasks not yet completed.
pub fn remaining(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.completed).count()
}

/// Completed share of the list, from 0.0 to 1.0. An empty list is 0.0.
pub fn progress(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    (tasks.len() - remaining(tasks)) as f64 / tasks.len() as f64
}

/// True when there is at least one task and every task is completed.
pub fn all_done(tasks: &[Task]) -> bool {
    !tasks.is_empty() && remaining(tasks) == 0
}
