use ratatui::widgets::TableState;

use crate::commands::parse_due;
use crate::filter::{filtered, Filter};
use crate::models::{Priority, Task, TaskPatch, DEFAULT_CATEGORY};
use crate::shortcuts::ShortcutsDialog;
use crate::store::TaskStore;
use crate::theme::ThemeStore;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Searching,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum InputField {
    None,
    Text,
    Category,
    Priority,
    Due,
    Description,
    Subtask,
    Comment,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub step: usize, // 0: Text, 1: Category, 2: Priority, 3: Due
}

pub struct App {
    pub store: TaskStore,
    pub themes: ThemeStore,
    pub shortcuts: ShortcutsDialog,
    pub state: TableState,
    pub filter: Filter,
    pub search: String,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<String>,
    pub add_state: AddState,
    pub show_details: bool,
    /// One-line feedback shown in the help bar until the next action.
    pub status: Option<String>,
}

impl App {
    /// Creates a new App over already opened stores.
    pub fn new(store: TaskStore, themes: ThemeStore) -> App {
        let mut state = TableState::default();
        if !store.tasks().is_empty() {
            state.select(Some(0));
        }
        App {
            store,
            themes,
            shortcuts: ShortcutsDialog::default(),
            state,
            filter: Filter::All,
            search: String::new(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            show_details: false,
            status: None,
        }
    }

    /// The tasks currently shown, each with its index in the full list.
    pub fn visible(&self) -> Vec<(usize, &Task)> {
        filtered(self.store.tasks(), self.filter, &self.search)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let i = self.state.selected()?;
        self.visible().get(i).map(|(_, t)| *t)
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Keeps the selection inside the visible list after it changed.
    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next task, wrapping around.
    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task, wrapping around.
    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.toggle(&id);
            self.clamp_selection();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.remove(&id);
            self.status = Some("Task deleted (u to undo)".into());
            self.clamp_selection();
        }
    }

    /// Removes every completed task as one undoable step.
    pub fn clear_completed(&mut self) {
        let done: Vec<String> = self
            .store
            .tasks()
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id.clone())
            .collect();
        let n = self.store.bulk_remove(&done);
        self.status = Some(format!("{} completed task(s) removed", n));
        self.clamp_selection();
    }

    /// Swaps the selected task with its visible neighbour.
    pub fn move_selected(&mut self, down: bool) {
        let Some(i) = self.state.selected() else { return };
        let visible: Vec<usize> = self.visible().iter().map(|(idx, _)| *idx).collect();
        let j = if down {
            if i + 1 >= visible.len() { return; }
            i + 1
        } else {
            if i == 0 { return; }
            i - 1
        };
        match self.store.reorder(visible[i], visible[j]) {
            Ok(()) => self.state.select(Some(j)),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn undo(&mut self) {
        self.status = Some(if self.store.undo() { "Undone" } else { "Nothing to undo" }.into());
        self.clamp_selection();
    }

    pub fn redo(&mut self) {
        self.status = Some(if self.store.redo() { "Redone" } else { "Nothing to redo" }.into());
        self.clamp_selection();
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.clamp_selection();
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.themes.toggle();
        self.status = Some(format!("{} mode", theme));
    }

    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    /// Updates the live search as characters are typed.
    pub fn search_changed(&mut self) {
        self.clamp_selection();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a specific field for the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(t) = self.selected_task() else { return };
        let id = t.id.clone();
        let prefill = match field {
            InputField::Text => t.text.clone(),
            InputField::Category => t.category.clone(),
            InputField::Priority => t.priority.to_string(),
            InputField::Due => t
                .due_date
                .map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            InputField::Description => t.description.clone(),
            InputField::Subtask | InputField::Comment | InputField::None => String::new(),
        };
        self.target_id = Some(id);
        self.input_mode = InputMode::Editing;
        self.input_field = field;
        self.input_buffer = prefill;
    }

    /// Leaves any input mode without applying it.
    pub fn cancel_input(&mut self) {
        if self.input_mode == InputMode::Searching {
            self.search.clear();
            self.clamp_selection();
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Searching => self.input_mode = InputMode::Normal,
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Text
                if !value.is_empty() {
                    self.add_state.text = value;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Category
                if !value.is_empty() {
                    self.add_state.category = Some(value.to_lowercase());
                }
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => { // Priority
                if value.is_empty() {
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                } else {
                    match value.parse::<Priority>() {
                        Ok(p) => {
                            self.add_state.priority = Some(p);
                            self.add_state.step += 1;
                            self.input_buffer.clear();
                        }
                        Err(e) => self.status = Some(e),
                    }
                }
            }
            3 => { // Due
                let due = if value.is_empty() {
                    None
                } else {
                    match parse_due(&value) {
                        Ok(d) => Some(d),
                        Err(e) => {
                            self.status = Some(e);
                            return;
                        }
                    }
                };
                // Finish Add
                let category = self
                    .add_state
                    .category
                    .take()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
                let text = std::mem::take(&mut self.add_state.text);
                self.store.add(text, category, due, self.add_state.priority.unwrap_or_default());
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.state.select(Some(0));
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id.clone() else {
            self.cancel_input();
            return;
        };
        let value = self.input_buffer.trim().to_string();
        match self.input_field {
            InputField::Text => {
                if value.is_empty() {
                    self.status = Some("Task text cannot be empty".into());
                    return;
                }
                self.store.update(&id, &TaskPatch::new().text(value));
            }
            InputField::Category => {
                let category = if value.is_empty() { DEFAULT_CATEGORY.to_string() } else { value.to_lowercase() };
                self.store.update(&id, &TaskPatch::new().category(category));
            }
            InputField::Priority => match value.parse::<Priority>() {
                Ok(p) => {
                    self.store.update(&id, &TaskPatch::new().priority(p));
                }
                Err(e) => {
                    self.status = Some(e);
                    return;
                }
            },
            InputField::Due => {
                let patch = if value.is_empty() {
                    TaskPatch::new().clear_due_date()
                } else {
                    match parse_due(&value) {
                        Ok(d) => TaskPatch::new().due_date(d),
                        Err(e) => {
                            self.status = Some(e);
                            return;
                        }
                    }
                };
                self.store.update(&id, &patch);
            }
            InputField::Description => {
                self.store.update(&id, &TaskPatch::new().description(self.input_buffer.clone()));
            }
            InputField::Subtask => {
                if !value.is_empty() {
                    self.store.add_subtask(&id, value);
                }
            }
            InputField::Comment => {
                if !value.is_empty() {
                    self.store.add_comment(&id, value);
                }
            }
            InputField::None => {}
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
        self.clamp_selection();
    }
}
