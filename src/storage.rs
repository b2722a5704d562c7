use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::Task;

/// Key holding the persisted task list.
pub const TASKS_KEY: &str = "todo-storage";
/// Key of the older layout: a bare JSON array of tasks.
pub const LEGACY_TASKS_KEY: &str = "todos";
/// Key holding the persisted theme.
pub const THEME_KEY: &str = "theme-storage";

/// A durable string-to-string store, one document per key.
pub trait KeyValueStore {
    /// Returns the document stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores `value` under `key`, replacing any previous document.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Deletes the document under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let io_err = |source| StorageError::Io { path: path.clone(), source };
        let mut f = OpenOptions::new().read(true).open(&path).map_err(io_err)?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(io_err)?;
        Ok(Some(s))
    }

    /// Writes through a temp file and a rename so a crash never leaves half a document.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io { path: tmp.clone(), source };
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(io_err)?;
        f.write_all(value.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StorageError::Io { path, source })?;
        }
        Ok(())
    }
}

/// In-memory store. Clones share the same map, so a test can hand one clone to
/// a store and inspect or reopen through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While failing, every operation returns [`StorageError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is in failing mode".into()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Envelope every persisted document is wrapped in.
#[derive(Serialize, Deserialize)]
struct Persisted<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize)]
struct TasksRef<'a> {
    todos: &'a [Task],
}

#[derive(Deserialize)]
struct TasksOwned {
    todos: Vec<Task>,
}

/// Reads and decodes the `state` part of the document under `key`.
pub(crate) fn read_state<S: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<S>, StorageError> {
    match kv.get(key)? {
        Some(raw) => {
            let doc: Persisted<S> = serde_json::from_str(&raw)?;
            Ok(Some(doc.state))
        }
        None => Ok(None),
    }
}

/// Encodes `state` into the envelope and writes it under `key`.
pub(crate) fn write_state<S: Serialize>(
    kv: &dyn KeyValueStore,
    key: &str,
    state: &S,
) -> Result<(), StorageError> {
    let doc = Persisted { state, version: 0 };
    let s = serde_json::to_string_pretty(&doc)?;
    kv.set(key, &s)
}

/// Encodes a task list as a persisted document.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, StorageError> {
    let doc = Persisted { state: TasksRef { todos: tasks }, version: 0 };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Decodes a persisted document back into a task list, dates included.
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, StorageError> {
    let doc: Persisted<TasksOwned> = serde_json::from_str(raw)?;
    Ok(doc.state.todos)
}

/// Loads the persisted task list.
///
/// Returns an empty list if nothing is stored or the document cannot be read.
/// When only the legacy bare-array document exists, it is imported instead.
pub fn load_tasks(kv: &dyn KeyValueStore) -> Vec<Task> {
    match kv.get(TASKS_KEY) {
        Ok(Some(raw)) => match decode_tasks(&raw) {
            Ok(tasks) => return tasks,
            Err(e) => {
                tracing::warn!(key = TASKS_KEY, error = %e, "stored tasks are unreadable, starting empty");
                return Vec::new();
            }
        },
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(key = TASKS_KEY, error = %e, "failed to read stored tasks, starting empty");
            return Vec::new();
        }
    }
    load_legacy_tasks(kv)
}

fn load_legacy_tasks(kv: &dyn KeyValueStore) -> Vec<Task> {
    let raw = match kv.get(LEGACY_TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key = LEGACY_TASKS_KEY, error = %e, "failed to read legacy tasks");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Task>>(&raw) {
        Ok(tasks) => {
            tracing::info!(count = tasks.len(), "imported tasks from legacy layout");
            tasks
        }
        Err(e) => {
            tracing::warn!(key = LEGACY_TASKS_KEY, error = %e, "legacy tasks are unreadable");
            Vec::new()
        }
    }
}

/// Saves the given task list, overwriting the stored one.
pub fn save_tasks(kv: &dyn KeyValueStore, tasks: &[Task]) -> Result<(), StorageError> {
    write_state(kv, TASKS_KEY, &TasksRef { todos: tasks })
}

/// Deletes every persisted document: tasks, legacy tasks and theme.
pub fn reset_all(kv: &dyn KeyValueStore) -> Result<(), StorageError> {
    kv.remove(TASKS_KEY)?;
    kv.remove(LEGACY_TASKS_KEY)?;
    kv.remove(THEME_KEY)?;
    Ok(())
}
