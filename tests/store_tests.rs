use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use todoust::error::StoreError;
use todoust::models::{Priority, Task, TaskPatch};
use todoust::storage::{load_tasks, MemoryStore};
use todoust::store::TaskStore;

fn texts(store: &TaskStore) -> Vec<String> {
    store.tasks().iter().map(|t| t.text.clone()).collect()
}

fn ids(store: &TaskStore) -> Vec<String> {
    store.tasks().iter().map(|t| t.id.clone()).collect()
}

/// Runs `op`, then checks undo restores the list from before it and redo the one after.
fn assert_undoable(store: &mut TaskStore, op: impl FnOnce(&mut TaskStore)) {
    let before: Vec<Task> = store.tasks().to_vec();
    op(store);
    let after: Vec<Task> = store.tasks().to_vec();
    assert_ne!(before, after, "operation should change the list");

    assert!(store.undo());
    assert_eq!(store.tasks(), before.as_slice());
    assert!(store.redo());
    assert_eq!(store.tasks(), after.as_slice());
}

#[test]
fn test_buy_milk_scenario() {
    let mut store = TaskStore::in_memory();
    let before = Utc::now();
    let id = store.add_text("Buy milk");

    assert_eq!(store.tasks().len(), 1);
    let t = &store.tasks()[0];
    assert!(!t.completed);
    assert!(!t.id.is_empty());
    assert_eq!(t.text, "Buy milk");
    assert_eq!(t.category, "default");
    assert_eq!(t.priority, Priority::Medium);
    assert!(t.created_at >= before && t.created_at <= Utc::now());

    assert!(store.toggle(&id));
    assert!(store.tasks()[0].completed);

    assert!(store.undo());
    assert!(!store.tasks()[0].completed);

    assert!(store.undo());
    assert!(store.tasks().is_empty());

    assert!(store.redo());
    assert!(store.redo());
    assert_eq!(store.tasks().len(), 1);
    assert!(store.tasks()[0].completed);
    assert!(!store.redo());
}

#[test]
fn test_new_tasks_go_first_and_reorder_moves_them() {
    let mut store = TaskStore::in_memory();
    store.add_text("A");
    store.add_text("B");
    assert_eq!(texts(&store), vec!["B", "A"]);

    store.reorder(0, 1).unwrap();
    assert_eq!(texts(&store), vec!["A", "B"]);
}

#[test]
fn test_bulk_update_is_a_single_step() {
    let mut store = TaskStore::in_memory();
    let a = store.add_text("A");
    let b = store.add_text("B");
    let c = store.add_text("C");
    let len_before = store.history_len();

    let n = store.bulk_update(&[a.clone(), b.clone()], &TaskPatch::new().category("work"));
    assert_eq!(n, 2);
    assert_eq!(store.history_len(), len_before + 1);
    assert_eq!(store.get(&a).unwrap().category, "work");
    assert_eq!(store.get(&b).unwrap().category, "work");
    assert_eq!(store.get(&c).unwrap().category, "default");

    assert!(store.undo());
    assert_eq!(store.get(&a).unwrap().category, "default");
    assert_eq!(store.get(&b).unwrap().category, "default");
}

#[test]
fn test_bulk_remove_is_a_single_step() {
    let mut store = TaskStore::in_memory();
    let a = store.add_text("A");
    let b = store.add_text("B");
    store.add_text("C");

    assert_eq!(store.bulk_remove(&[a.as_str(), b.as_str(), "missing"]), 2);
    assert_eq!(texts(&store), vec!["C"]);

    assert!(store.undo());
    assert_eq!(texts(&store), vec!["C", "B", "A"]);
}

#[test]
fn test_every_mutation_can_be_undone_and_redone() {
    let mut store = TaskStore::in_memory();
    let first = store.add_text("first");
    let second = store.add_text("second");

    assert_undoable(&mut store, |s| {
        s.add("third", "work", None, Priority::High);
    });
    assert_undoable(&mut store, |s| {
        s.toggle(&first);
    });
    assert_undoable(&mut store, |s| {
        s.update(&second, &TaskPatch::new().text("renamed").priority(Priority::Low));
    });
    assert_undoable(&mut store, |s| {
        s.remove(&first);
    });
    assert_undoable(&mut store, |s| {
        s.reorder(0, 1).unwrap();
    });
}

#[test]
fn test_undo_and_redo_at_the_ends_are_noops() {
    let mut store = TaskStore::in_memory();
    assert_eq!(store.history_position(), Some(0));
    assert!(!store.can_undo());
    assert!(!store.undo());
    assert!(!store.redo());

    store.add_text("A");
    assert!(!store.redo());
    assert!(store.undo());
    assert!(!store.undo());
    assert!(store.tasks().is_empty());
}

#[test]
fn test_mutation_after_undo_discards_redo_branch() {
    let mut store = TaskStore::in_memory();
    store.add_text("a");
    store.add_text("b");
    assert!(store.undo());
    assert!(store.can_redo());

    store.add_text("c");
    assert!(!store.can_redo());
    assert!(!store.redo());
    assert_eq!(texts(&store), vec!["c", "a"]);
}

#[test]
fn test_toggle_twice_restores_flag_and_order() {
    let mut store = TaskStore::in_memory();
    store.add_text("a");
    let id = store.add_text("b");
    store.add_text("c");
    let order = ids(&store);

    store.toggle(&id);
    store.toggle(&id);
    assert!(!store.get(&id).unwrap().completed);
    assert_eq!(ids(&store), order);
}

#[test]
fn test_reorder_only_changes_positions() {
    let mut store = TaskStore::in_memory();
    for name in ["a", "b", "c", "d"] {
        store.add_text(name);
    }
    let mut before = store.tasks().to_vec();

    store.reorder(3, 0).unwrap();
    assert_eq!(texts(&store), vec!["a", "d", "c", "b"]);

    let mut after = store.tasks().to_vec();
    before.sort_by(|x, y| x.id.cmp(&y.id));
    after.sort_by(|x, y| x.id.cmp(&y.id));
    assert_eq!(before, after);
}

#[test]
fn test_out_of_range_reorder_is_rejected() {
    let mut store = TaskStore::in_memory();
    store.add_text("a");
    store.add_text("b");
    let len = store.history_len();

    assert_eq!(store.reorder(5, 0), Err(StoreError::IndexOutOfRange { index: 5, len: 2 }));
    assert_eq!(store.reorder(0, 2), Err(StoreError::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(texts(&store), vec!["b", "a"]);
    assert_eq!(store.history_len(), len);

    // Moving onto itself is allowed but records nothing.
    assert_eq!(store.reorder(1, 1), Ok(()));
    assert_eq!(store.history_len(), len);
}

#[test]
fn test_unknown_ids_record_nothing() {
    let mut store = TaskStore::in_memory();
    store.add_text("a");
    let len = store.history_len();

    assert!(!store.toggle("nope"));
    assert!(!store.remove("nope"));
    assert!(!store.update("nope", &TaskPatch::new().text("x")));
    assert_eq!(store.bulk_update(&["nope"], &TaskPatch::new().completed(true)), 0);
    assert_eq!(store.bulk_remove(&["nope"]), 0);
    assert_eq!(store.add_subtask("nope", "x"), None);
    assert_eq!(store.add_comment("nope", "x"), None);
    assert_eq!(store.history_len(), len);
}

#[test]
fn test_update_merges_only_given_fields() {
    let mut store = TaskStore::in_memory();
    let id = store.add("Write report", "work", None, Priority::Low);
    let original = store.get(&id).unwrap().clone();
    let due = Utc::now() + Duration::days(2);

    assert!(store.update(&id, &TaskPatch::new().priority(Priority::High).due_date(due).description("Q3 numbers")));
    let t = store.get(&id).unwrap();
    assert_eq!(t.priority, Priority::High);
    assert_eq!(t.due_date, Some(due));
    assert_eq!(t.description, "Q3 numbers");
    assert_eq!(t.text, original.text);
    assert_eq!(t.category, original.category);
    assert_eq!(t.created_at, original.created_at);

    assert!(store.update(&id, &TaskPatch::new().clear_due_date()));
    assert_eq!(store.get(&id).unwrap().due_date, None);

    // Same values again change nothing.
    let len = store.history_len();
    assert!(!store.update(&id, &TaskPatch::new().priority(Priority::High)));
    assert_eq!(store.history_len(), len);
}

#[test]
fn test_observers_see_every_change() {
    let mut store = TaskStore::in_memory();
    let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = store.subscribe(move |tasks| sink.borrow_mut().push(tasks.len()));

    let id = store.add_text("a");
    store.toggle(&id);
    store.toggle("missing");
    store.undo();
    store.redo();
    store.remove(&id);
    assert_eq!(*seen.borrow(), vec![1, 1, 1, 1, 0]);

    assert!(store.unsubscribe(sub));
    assert!(!store.unsubscribe(sub));
    store.add_text("b");
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn test_subtasks_and_comments() {
    let mut store = TaskStore::in_memory();
    let id = store.add_text("Plan trip");

    let s1 = store.add_subtask(&id, "Book flights").unwrap();
    let s2 = store.add_subtask(&id, "Book hotel").unwrap();
    assert!(store.toggle_subtask(&id, &s1));
    assert!(store.edit_subtask(&id, &s2, "Book hostel"));
    {
        let t = store.get(&id).unwrap();
        assert_eq!(t.subtasks.len(), 2);
        assert!(t.subtasks[0].completed);
        assert_eq!(t.subtasks[1].text, "Book hostel");
        assert_eq!(t.subtasks_done(), 1);
    }

    assert!(store.remove_subtask(&id, &s1));
    assert_eq!(store.get(&id).unwrap().subtasks.len(), 1);
    assert!(store.undo());
    assert_eq!(store.get(&id).unwrap().subtasks.len(), 2);
    assert!(!store.toggle_subtask(&id, "missing"));

    let c = store.add_comment(&id, "Check visa rules").unwrap();
    assert_eq!(store.get(&id).unwrap().comments[0].text, "Check visa rules");
    assert!(store.remove_comment(&id, &c));
    assert!(store.get(&id).unwrap().comments.is_empty());
    assert!(!store.remove_comment(&id, &c));
}

#[test]
fn test_every_change_is_persisted() {
    let mem = MemoryStore::new();
    let mut store = TaskStore::open(Box::new(mem.clone()), None);
    let id = store.add_text("a");
    store.toggle(&id);
    assert_eq!(load_tasks(&mem), store.tasks().to_vec());

    store.undo();
    store.undo();
    assert!(load_tasks(&mem).is_empty());

    store.redo();
    let reopened = TaskStore::open(Box::new(mem.clone()), None);
    assert_eq!(reopened.tasks(), store.tasks());
    assert_eq!(reopened.history_len(), 1);
    assert!(!reopened.can_undo());
}

#[test]
fn test_persistence_failures_are_swallowed() {
    let mem = MemoryStore::new();
    let mut store = TaskStore::open(Box::new(mem.clone()), None);
    mem.set_failing(true);

    let id = store.add_text("still here");
    assert_eq!(store.tasks().len(), 1);
    assert!(store.toggle(&id));
    assert!(store.undo());

    mem.set_failing(false);
    assert!(load_tasks(&mem).is_empty());
}

#[test]
fn test_history_limit_bounds_undo_depth() {
    let mut store = TaskStore::open(Box::new(MemoryStore::new()), Some(3));
    for i in 0..5 {
        store.add_text(format!("task {}", i));
    }
    assert_eq!(store.history_len(), 3);
    assert!(store.undo());
    assert!(store.undo());
    assert!(!store.undo());
    assert_eq!(store.tasks().len(), 3);
}

#[test]
fn test_find_by_prefix() {
    let mut store = TaskStore::in_memory();
    let id = store.add_text("a");
    assert_eq!(store.find_by_prefix(&id[..8]).map(|t| t.id.clone()), Some(id.clone()));
    assert_eq!(store.find_by_prefix(&id).map(|t| t.text.as_str()), Some("a"));
    assert!(store.find_by_prefix("").is_none());
    assert!(store.find_by_prefix("zzzz-not-an-id").is_none());
}
