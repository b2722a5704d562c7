/// A key binding listed in the shortcuts dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Bindings shown by the TUI's shortcuts dialog, in display order.
pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut { keys: "/", description: "Focus search" },
    Shortcut { keys: "a", description: "Add new task" },
    Shortcut { keys: "Space", description: "Toggle done" },
    Shortcut { keys: "e", description: "Edit title" },
    Shortcut { keys: "c / p / t", description: "Edit category / priority / due date" },
    Shortcut { keys: "D", description: "Edit description" },
    Shortcut { keys: "s / m", description: "Add subtask / comment" },
    Shortcut { keys: "d", description: "Delete task" },
    Shortcut { keys: "X", description: "Delete all completed" },
    Shortcut { keys: "J / K", description: "Move task down / up" },
    Shortcut { keys: "u, Ctrl+Z", description: "Undo last action" },
    Shortcut { keys: "U, Ctrl+Y", description: "Redo last action" },
    Shortcut { keys: "f", description: "Cycle filter" },
    Shortcut { keys: "T", description: "Toggle dark mode" },
    Shortcut { keys: "Enter", description: "Show details" },
    Shortcut { keys: "?", description: "Show this dialog" },
    Shortcut { keys: "q", description: "Quit" },
];

/// Visibility of the shortcuts dialog. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShortcutsDialog {
    open: bool,
}

impl ShortcutsDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}
