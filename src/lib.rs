//! Core of the todoust to-do manager.
//!
//! [`store::TaskStore`] owns the task list and its undo/redo history and
//! persists the list through a [`storage::KeyValueStore`] after every change.
//! [`theme::ThemeStore`] and [`shortcuts::ShortcutsDialog`] are independent
//! state holders read by the views in [`commands`] and [`tui`].

pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod logging;
pub mod models;
pub mod shortcuts;
pub mod storage;
pub mod store;
pub mod theme;
pub mod tui;
