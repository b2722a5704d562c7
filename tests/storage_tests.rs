use std::fs;

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use todoust::models::{Comment, Priority, Subtask, Task};
use todoust::storage::{
    decode_tasks, encode_tasks, load_tasks, reset_all, save_tasks, FileStore, KeyValueStore,
    MemoryStore, LEGACY_TASKS_KEY, TASKS_KEY, THEME_KEY,
};
use todoust::store::TaskStore;

fn sample_task() -> Task {
    let mut t = Task::new("Renew passport", "personal", Some(Utc::now() + Duration::days(10)), Priority::High);
    t.description = "Photos first".into();
    t.subtasks = vec![Subtask::new("Take photos"), Subtask { completed: true, ..Subtask::new("Fill form") }];
    t.comments = vec![Comment::new("Office closes at 4")];
    t
}

#[test]
fn test_round_trip_keeps_every_field() {
    let tasks = vec![sample_task(), Task::new("Plain", "default", None, Priority::Low)];
    let raw = encode_tasks(&tasks).unwrap();
    let decoded = decode_tasks(&raw).unwrap();
    assert_eq!(decoded, tasks);
    assert!(decoded[0].due_date.is_some());
    assert_eq!(decoded[1].due_date, None);
}

#[test]
fn test_persisted_layout() {
    let tasks = vec![sample_task()];
    let raw = encode_tasks(&tasks).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(v["version"], 0);
    let todo = &v["state"]["todos"][0];
    assert_eq!(todo["text"], "Renew passport");
    assert_eq!(todo["priority"], "high");
    assert!(todo["dueDate"].is_string());
    assert!(todo["createdAt"].is_string());
    assert!(todo["comments"][0]["createdAt"].is_string());
    assert_eq!(todo["subtasks"][1]["completed"], true);

    let due: DateTime<Utc> = todo["dueDate"].as_str().unwrap().parse().unwrap();
    assert_eq!(Some(due), tasks[0].due_date);
}

#[test]
fn test_absent_due_date_is_omitted() {
    let raw = encode_tasks(&[Task::new("No rush", "default", None, Priority::Medium)]).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(v["state"]["todos"][0].get("dueDate").is_none());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path().join("nested"));

    let mut store = TaskStore::open(Box::new(files.clone()), None);
    let id = store.add_text("Persist me");
    store.add_subtask(&id, "and me");
    assert!(files.path_for(TASKS_KEY).exists());
    assert!(!files.path_for(TASKS_KEY).with_extension("json.tmp").exists());

    let reopened = TaskStore::open(Box::new(files), None);
    assert_eq!(reopened.tasks(), store.tasks());
}

#[test]
fn test_file_store_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path());
    assert_eq!(files.get("nothing").unwrap(), None);
    files.remove("nothing").unwrap();

    files.set("k", "v").unwrap();
    assert_eq!(files.get("k").unwrap().as_deref(), Some("v"));
    files.remove("k").unwrap();
    assert_eq!(files.get("k").unwrap(), None);
}

#[test]
fn test_corrupt_document_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path());
    fs::write(files.path_for(TASKS_KEY), "{ not json").unwrap();

    assert!(load_tasks(&files).is_empty());
    let store = TaskStore::open(Box::new(files), None);
    assert!(store.tasks().is_empty());
}

#[test]
fn test_unreadable_storage_loads_empty() {
    let mem = MemoryStore::new();
    save_tasks(&mem, &[sample_task()]).unwrap();
    mem.set_failing(true);
    assert!(load_tasks(&mem).is_empty());
}

#[test]
fn test_legacy_layout_is_imported() {
    let mem = MemoryStore::new();
    mem.set(
        LEGACY_TASKS_KEY,
        r#"[{"id":"1","text":"Old task","completed":true,"category":"work","dueDate":null,"createdAt":"2024-05-01T10:00:00.000Z"}]"#,
    )
    .unwrap();

    let tasks = load_tasks(&mem);
    assert_eq!(tasks.len(), 1);
    let t = &tasks[0];
    assert_eq!(t.text, "Old task");
    assert!(t.completed);
    assert_eq!(t.category, "work");
    assert_eq!(t.priority, Priority::Medium);
    assert_eq!(t.due_date, None);
    assert_eq!(t.created_at, "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
    assert!(t.description.is_empty());
    assert!(t.subtasks.is_empty());
    assert!(t.comments.is_empty());
}

#[test]
fn test_current_layout_wins_over_legacy() {
    let mem = MemoryStore::new();
    mem.set(LEGACY_TASKS_KEY, r#"[{"id":"1","text":"Old","createdAt":"2024-05-01T10:00:00Z"}]"#).unwrap();
    save_tasks(&mem, &[]).unwrap();
    assert!(load_tasks(&mem).is_empty());
}

#[test]
fn test_reset_all_removes_documents() {
    let mem = MemoryStore::new();
    save_tasks(&mem, &[sample_task()]).unwrap();
    mem.set(THEME_KEY, r#"{"state":{"theme":"light"},"version":0}"#).unwrap();

    reset_all(&mem).unwrap();
    assert_eq!(mem.get(TASKS_KEY).unwrap(), None);
    assert_eq!(mem.get(THEME_KEY).unwrap(), None);
}
