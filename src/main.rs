//! # Todoust
//!
//! A terminal to-do manager with undo/redo. Todoust combines a fast CLI for quick entry with a
//! TUI (Terminal User Interface) for interactive management.
//!
//! ## Features
//!
//! *   **Rich tasks**: category, priority, due date, description, subtasks and comments.
//! *   **Undo/Redo**: every change in the TUI can be stepped back and forth.
//! *   **Manual ordering**: new tasks go on top; move them wherever you like.
//! *   **Themes**: light and dark palettes, remembered between sessions.
//! *   **Data Persistence**: Tasks are stored in standard XDG data directories (JSON format).
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! todoust
//! # or explicitly
//! todoust ui
//! ```
//!
//! Press `?` inside the TUI for the list of key bindings.
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! todoust add "Buy milk" --category shopping --priority high --due tomorrow
//! todoust list --filter active --search milk
//! todoust toggle <ID>
//! todoust move 3 1
//! todoust subtask add <ID> "Check fridge first"
//! todoust comment add <ID> "Oat milk this time"
//! ```
//!
//! IDs may be shortened to any unique prefix.
//!
//! ## Data Storage
//!
//! Documents are saved in your local data directory:
//! *   Linux: `~/.local/share/todoust/`
//! *   macOS: `~/Library/Application Support/todoust/`
//! *   Windows: `%APPDATA%\todoust\`
//!
//! Override it with `TODOUST_DATA`. `TODOUST_HISTORY` sets the undo depth and
//! `TODOUST_LOG` the log filter.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use todoust::commands::*;
use todoust::config::Config;
use todoust::filter::Filter;
use todoust::logging::{self, LogTarget};
use todoust::models::Priority;
use todoust::storage::FileStore;
use todoust::store::TaskStore;
use todoust::theme::ThemeStore;
use todoust::tui::run_tui;

#[derive(Parser)]
#[command(name = "todoust")]
#[command(about = "Terminal to-do manager with undo/redo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Default)]
struct EditArgs {
    /// New task text
    #[arg(long)]
    text: Option<String>,
    /// New category
    #[arg(short, long)]
    category: Option<String>,
    /// New priority
    #[arg(short, long, value_enum)]
    priority: Option<Priority>,
    /// New due date (YYYY-MM-DD, today, tomorrow, in 3d, in 2w)
    #[arg(short, long)]
    due: Option<String>,
    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    clear_due: bool,
    /// New description
    #[arg(long)]
    description: Option<String>,
}

impl From<EditArgs> for EditFields {
    fn from(a: EditArgs) -> Self {
        EditFields {
            text: a.text,
            category: a.category,
            priority: a.priority,
            due: a.due,
            clear_due: a.clear_due,
            description: a.description,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
        /// Category (default, personal, work, shopping, health or any other)
        #[arg(short, long)]
        category: Option<String>,
        /// Priority
        #[arg(short, long, value_enum)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD, today, tomorrow, in 3d, in 2w)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// List tasks in their current order
    List {
        /// Which tasks to show
        #[arg(short, long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
        /// Only tasks whose text or category contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show every detail of a task
    Show {
        id: String,
    },
    /// Mark a task done, or pending again
    Toggle {
        id: String,
    },
    /// Remove one or more tasks
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Edit a task
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Apply the same edit to several tasks
    BulkEdit {
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Move a task from one list position to another (positions as shown by `list`)
    Move {
        from: usize,
        to: usize,
    },
    /// Manage subtasks
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },
    /// Manage comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Show or toggle the theme
    Theme {
        /// Switch between light and dark
        #[arg(short, long)]
        toggle: bool,
    },
    /// Reset storage (delete all tasks and the theme)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum SubtaskCommands {
    /// Add a subtask
    Add { task: String, text: String },
    /// Toggle a subtask
    Toggle { task: String, subtask: String },
    /// Change a subtask's text
    Edit { task: String, subtask: String, text: String },
    /// Remove a subtask
    Remove { task: String, subtask: String },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Add a comment
    Add { task: String, text: String },
    /// Remove a comment
    Remove { task: String, comment: String },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    let storage = FileStore::new(&config.data_dir);

    let target = match cli.command {
        Some(Commands::Ui) | None => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(&config, target);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let open_store = || TaskStore::open(Box::new(storage.clone()), config.history_limit);

    match cli.command {
        Some(Commands::Add { text, category, priority, due }) => {
            cmd_add(&mut open_store(), &text, category, priority, due, false);
        }
        Some(Commands::List { filter, search }) => cmd_list(&open_store(), filter, search.as_deref()),
        Some(Commands::Show { id }) => cmd_show(&open_store(), &id),
        Some(Commands::Toggle { id }) => cmd_toggle(&mut open_store(), &id, false),
        Some(Commands::Remove { ids }) => cmd_remove(&mut open_store(), &ids, false),
        Some(Commands::Edit { id, fields }) => cmd_edit(&mut open_store(), &id, &fields.into(), false),
        Some(Commands::BulkEdit { ids, fields }) => cmd_bulk_edit(&mut open_store(), &ids, &fields.into(), false),
        Some(Commands::Move { from, to }) => cmd_move(&mut open_store(), from, to, false),
        Some(Commands::Subtask { command }) => {
            let mut store = open_store();
            match command {
                SubtaskCommands::Add { task, text } => {
                    cmd_subtask_add(&mut store, &task, &text, false);
                }
                SubtaskCommands::Toggle { task, subtask } => cmd_subtask_toggle(&mut store, &task, &subtask, false),
                SubtaskCommands::Edit { task, subtask, text } => cmd_subtask_edit(&mut store, &task, &subtask, &text, false),
                SubtaskCommands::Remove { task, subtask } => cmd_subtask_remove(&mut store, &task, &subtask, false),
            }
        }
        Some(Commands::Comment { command }) => {
            let mut store = open_store();
            match command {
                CommentCommands::Add { task, text } => {
                    cmd_comment_add(&mut store, &task, &text, false);
                }
                CommentCommands::Remove { task, comment } => cmd_comment_remove(&mut store, &task, &comment, false),
            }
        }
        Some(Commands::Theme { toggle }) => {
            let mut themes = ThemeStore::open(Box::new(storage.clone()));
            cmd_theme(&mut themes, toggle);
        }
        Some(Commands::Reset { force }) => cmd_reset(&storage, force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "todoust", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            let themes = ThemeStore::open(Box::new(storage.clone()));
            if let Err(e) = run_tui(open_store(), themes) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
