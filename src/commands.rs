use std::io::{self, Write};

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::filter::{filtered, progress, remaining, Filter};
use crate::models::{Priority, Task, TaskPatch, DEFAULT_CATEGORY};
use crate::storage::{reset_all, KeyValueStore};
use crate::store::TaskStore;
use crate::theme::ThemeStore;

/// Field changes requested by `edit` and `bulk-edit`.
#[derive(Debug, Clone, Default)]
pub struct EditFields {
    pub text: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub description: Option<String>,
}

/// Parses a due date: `today`, `tomorrow`, `in 3d`, `in 2w` or `YYYY-MM-DD`.
///
/// Dates resolve to local midnight.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>, String> {
    let s = input.trim().to_lowercase();
    let today = Local::now().date_naive();
    let date = match s.as_str() {
        "today" => today,
        "tomorrow" => today + Duration::days(1),
        _ => {
            if let Some(rest) = s.strip_prefix("in ") {
                let rest = rest.trim();
                let days = if let Some(n) = rest.strip_suffix('d') {
                    n.trim().parse::<i64>().ok()
                } else if let Some(n) = rest.strip_suffix('w') {
                    n.trim().parse::<i64>().ok().map(|w| w * 7)
                } else {
                    None
                };
                match days {
                    Some(d) => today + Duration::days(d),
                    None => return Err(format!("Invalid due date '{}'. Use e.g. 'in 3d' or 'in 2w'.", input)),
                }
            } else {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| format!("Invalid due date '{}': {}. Use YYYY-MM-DD.", input, e))?
            }
        }
    };
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| format!("Invalid due date '{}'", input))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .ok_or_else(|| format!("Due date '{}' does not exist in the local time zone", input))
}

/// Resolves a full id or unique id prefix to a task id.
pub fn resolve_id(store: &TaskStore, prefix: &str, silent: bool) -> Option<String> {
    match store.find_by_prefix(prefix.trim()) {
        Some(t) => Some(t.id.clone()),
        None => {
            if !silent { eprintln!("No single task matches '{}'.", prefix); }
            None
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Adds a new task at the top of the list and returns its id.
///
/// Empty or whitespace-only text is rejected.
pub fn cmd_add(
    store: &mut TaskStore,
    text: &str,
    category: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    silent: bool,
) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        if !silent { eprintln!("Task text cannot be empty."); }
        return None;
    }
    let due_date = match due.as_deref().map(parse_due).transpose() {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return None;
        }
    };
    let category = category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let id = store.add(text, category, due_date, priority.unwrap_or_default());
    if !silent { println!("Task added (id = {})", short_id(&id)); }
    Some(id)
}

/// Lists tasks in a formatted table, in store order.
pub fn cmd_list(store: &TaskStore, filter: Filter, search: Option<&str>) {
    let tasks = store.tasks();
    let rows = filtered(tasks, filter, search.unwrap_or(""));
    if rows.is_empty() {
        if search.is_some_and(|s| !s.trim().is_empty()) {
            println!("No matching tasks found.");
        } else {
            println!("No tasks yet.");
        }
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Subtasks").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let now = Utc::now();
    for (idx, t) in rows {
        let priority_color = match t.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        let due = t
            .due_date
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let subtasks = if t.subtasks.is_empty() {
            String::new()
        } else {
            format!("{}/{}", t.subtasks_done(), t.subtasks.len())
        };
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(short_id(&t.id)),
            Cell::new(&t.text),
            Cell::new(&t.category),
            Cell::new(format!("{} {}", t.priority.icon(), t.priority)).fg(priority_color),
            Cell::new(due).fg(if t.is_overdue(now) { Color::Red } else { Color::Reset }),
            Cell::new(subtasks),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
    println!(
        "{} tasks remaining, {:.0}% done",
        remaining(tasks),
        progress(tasks) * 100.0
    );
}

/// Prints every field of one task, with its subtasks and comments.
pub fn cmd_show(store: &TaskStore, id: &str) {
    let Some(id) = resolve_id(store, id, false) else { return };
    let Some(t) = store.get(&id) else { return };
    println!("{}", render_details(t));
}

/// Multi-line description of a task, shared by `show` and the TUI details pane.
pub fn render_details(t: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} [{}]\n", t.text, if t.completed { "done" } else { "pending" }));
    out.push_str(&format!("id:        {}\n", t.id));
    out.push_str(&format!("category:  {}\n", t.category));
    out.push_str(&format!("priority:  {}\n", t.priority));
    if let Some(d) = t.due_date {
        out.push_str(&format!("due:       {}\n", d.with_timezone(&Local).format("%Y-%m-%d")));
    }
    out.push_str(&format!("created:   {}\n", t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")));
    if !t.description.is_empty() {
        out.push_str(&format!("\n{}\n", t.description));
    }
    if !t.subtasks.is_empty() {
        out.push_str("\nSubtasks:\n");
        for s in &t.subtasks {
            out.push_str(&format!("  [{}] {} ({})\n", if s.completed { "x" } else { " " }, s.text, short_id(&s.id)));
        }
    }
    if !t.comments.is_empty() {
        out.push_str("\nComments:\n");
        for c in &t.comments {
            out.push_str(&format!(
                "  {} - {} ({})\n",
                c.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                c.text,
                short_id(&c.id)
            ));
        }
    }
    out
}

/// Flips a task between pending and done.
pub fn cmd_toggle(store: &mut TaskStore, id: &str, silent: bool) {
    let Some(id) = resolve_id(store, id, silent) else { return };
    if store.toggle(&id) {
        let done = store.get(&id).is_some_and(|t| t.completed);
        if !silent { println!("Task {} marked as {}.", short_id(&id), if done { "done" } else { "pending" }); }
    }
}

/// Removes one task, or several as a single step.
pub fn cmd_remove(store: &mut TaskStore, ids: &[String], silent: bool) {
    let resolved: Vec<String> = ids.iter().filter_map(|i| resolve_id(store, i, silent)).collect();
    if resolved.is_empty() {
        return;
    }
    let removed = store.bulk_remove(&resolved);
    if !silent { println!("{} task(s) removed.", removed); }
}

fn build_patch(fields: &EditFields, silent: bool) -> Option<TaskPatch> {
    let mut patch = TaskPatch::new();
    if let Some(text) = &fields.text {
        let text = text.trim();
        if text.is_empty() {
            if !silent { eprintln!("Task text cannot be empty."); }
            return None;
        }
        patch = patch.text(text);
    }
    if let Some(c) = &fields.category {
        patch = patch.category(c.trim().to_lowercase());
    }
    if let Some(p) = fields.priority {
        patch = patch.priority(p);
    }
    if fields.clear_due {
        patch = patch.clear_due_date();
    } else if let Some(d) = &fields.due {
        match parse_due(d) {
            Ok(date) => patch = patch.due_date(date),
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return None;
            }
        }
    }
    if let Some(d) = &fields.description {
        patch = patch.description(d.clone());
    }
    if patch.is_empty() {
        if !silent { eprintln!("Nothing to change."); }
        return None;
    }
    Some(patch)
}

/// Edits an existing task's details.
pub fn cmd_edit(store: &mut TaskStore, id: &str, fields: &EditFields, silent: bool) {
    let Some(id) = resolve_id(store, id, silent) else { return };
    let Some(patch) = build_patch(fields, silent) else { return };
    if store.update(&id, &patch) {
        if !silent { println!("Task {} updated.", short_id(&id)); }
    } else if !silent {
        println!("Task {} already up to date.", short_id(&id));
    }
}

/// Applies the same edit to several tasks as one step.
pub fn cmd_bulk_edit(store: &mut TaskStore, ids: &[String], fields: &EditFields, silent: bool) {
    let resolved: Vec<String> = ids.iter().filter_map(|i| resolve_id(store, i, silent)).collect();
    if resolved.is_empty() {
        return;
    }
    let Some(patch) = build_patch(fields, silent) else { return };
    let n = store.bulk_update(&resolved, &patch);
    if !silent { println!("{} task(s) updated.", n); }
}

/// Moves the task at list position `from` to position `to` (1-based, as `list` shows them).
pub fn cmd_move(store: &mut TaskStore, from: usize, to: usize, silent: bool) {
    if from == 0 || to == 0 {
        if !silent { eprintln!("Positions start at 1."); }
        return;
    }
    match store.reorder(from - 1, to - 1) {
        Ok(()) => {
            if !silent { println!("Moved task from #{} to #{}.", from, to); }
        }
        Err(e) => {
            if !silent { eprintln!("Cannot move: {}", e); }
        }
    }
}

/// Resolves a full id or unique prefix among a task's subtask or comment ids.
fn resolve_child<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str, kind: &str, silent: bool) -> Option<String> {
    let prefix = prefix.trim();
    let found = if prefix.is_empty() {
        None
    } else {
        let ids: Vec<&str> = ids.collect();
        match ids.iter().find(|id| **id == prefix) {
            Some(id) => Some(id.to_string()),
            None => {
                let mut matches = ids.iter().filter(|id| id.starts_with(prefix));
                match (matches.next(), matches.next()) {
                    (Some(id), None) => Some(id.to_string()),
                    _ => None,
                }
            }
        }
    };
    if found.is_none() && !silent {
        eprintln!("No single {} matches '{}'.", kind, prefix);
    }
    found
}

fn resolve_subtask(store: &TaskStore, task_id: &str, prefix: &str, silent: bool) -> Option<String> {
    let task = store.get(task_id)?;
    resolve_child(task.subtasks.iter().map(|s| s.id.as_str()), prefix, "subtask", silent)
}

fn resolve_comment(store: &TaskStore, task_id: &str, prefix: &str, silent: bool) -> Option<String> {
    let task = store.get(task_id)?;
    resolve_child(task.comments.iter().map(|c| c.id.as_str()), prefix, "comment", silent)
}

pub fn cmd_subtask_add(store: &mut TaskStore, task: &str, text: &str, silent: bool) -> Option<String> {
    let task_id = resolve_id(store, task, silent)?;
    let text = text.trim();
    if text.is_empty() {
        if !silent { eprintln!("Subtask text cannot be empty."); }
        return None;
    }
    let sub_id = store.add_subtask(&task_id, text)?;
    if !silent { println!("Subtask added (id = {})", short_id(&sub_id)); }
    Some(sub_id)
}

pub fn cmd_subtask_toggle(store: &mut TaskStore, task: &str, subtask: &str, silent: bool) {
    let Some(task_id) = resolve_id(store, task, silent) else { return };
    let Some(sub_id) = resolve_subtask(store, &task_id, subtask, silent) else { return };
    if store.toggle_subtask(&task_id, &sub_id) && !silent {
        println!("Subtask {} toggled.", short_id(&sub_id));
    }
}

pub fn cmd_subtask_edit(store: &mut TaskStore, task: &str, subtask: &str, text: &str, silent: bool) {
    let Some(task_id) = resolve_id(store, task, silent) else { return };
    let text = text.trim();
    if text.is_empty() {
        if !silent { eprintln!("Subtask text cannot be empty."); }
        return;
    }
    let Some(sub_id) = resolve_subtask(store, &task_id, subtask, silent) else { return };
    if store.edit_subtask(&task_id, &sub_id, text) && !silent {
        println!("Subtask {} updated.", short_id(&sub_id));
    }
}

pub fn cmd_subtask_remove(store: &mut TaskStore, task: &str, subtask: &str, silent: bool) {
    let Some(task_id) = resolve_id(store, task, silent) else { return };
    let Some(sub_id) = resolve_subtask(store, &task_id, subtask, silent) else { return };
    if store.remove_subtask(&task_id, &sub_id) && !silent {
        println!("Subtask {} removed.", short_id(&sub_id));
    }
}

pub fn cmd_comment_add(store: &mut TaskStore, task: &str, text: &str, silent: bool) -> Option<String> {
    let task_id = resolve_id(store, task, silent)?;
    let text = text.trim();
    if text.is_empty() {
        if !silent { eprintln!("Comment cannot be empty."); }
        return None;
    }
    let comment_id = store.add_comment(&task_id, text)?;
    if !silent { println!("Comment added (id = {})", short_id(&comment_id)); }
    Some(comment_id)
}

pub fn cmd_comment_remove(store: &mut TaskStore, task: &str, comment: &str, silent: bool) {
    let Some(task_id) = resolve_id(store, task, silent) else { return };
    let Some(comment_id) = resolve_comment(store, &task_id, comment, silent) else { return };
    if store.remove_comment(&task_id, &comment_id) && !silent {
        println!("Comment {} removed.", short_id(&comment_id));
    }
}

/// Shows the current theme, or flips it.
pub fn cmd_theme(themes: &mut ThemeStore, toggle: bool) {
    if toggle {
        let theme = themes.toggle();
        println!("Theme set to {}.", theme);
    } else {
        println!("{}", themes.theme());
    }
}

/// Deletes all persisted tasks and the theme.
pub fn cmd_reset(storage: &dyn KeyValueStore, force: bool) {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        let _ = io::stdout().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = reset_all(storage) {
        eprintln!("Failed to reset storage: {}", e);
    } else {
        println!("Storage reset successfully.");
    }
}
