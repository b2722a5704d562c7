use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todoust::filter::Filter;
use todoust::storage::MemoryStore;
use todoust::store::TaskStore;
use todoust::theme::{Theme, ThemeStore};
use todoust::tui::app::{App, InputMode};
use todoust::tui::handle_key;

fn app() -> App {
    App::new(TaskStore::in_memory(), ThemeStore::open(Box::new(MemoryStore::new())))
}

fn press(app: &mut App, code: KeyCode) -> bool {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_line(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
    press(app, KeyCode::Enter);
}

fn add(app: &mut App, text: &str) {
    press(app, KeyCode::Char('a'));
    type_line(app, text);
    type_line(app, "");
    type_line(app, "");
    type_line(app, "");
}

fn texts(app: &App) -> Vec<String> {
    app.store.tasks().iter().map(|t| t.text.clone()).collect()
}

#[test]
fn test_add_wizard() {
    let mut app = app();
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.input_mode, InputMode::Adding);
    type_line(&mut app, "Buy milk");
    type_line(&mut app, "Shopping");
    type_line(&mut app, "h");
    type_line(&mut app, "");

    assert_eq!(app.input_mode, InputMode::Normal);
    let t = &app.store.tasks()[0];
    assert_eq!(t.text, "Buy milk");
    assert_eq!(t.category, "shopping");
    assert_eq!(t.priority, todoust::models::Priority::High);
    assert_eq!(app.state.selected(), Some(0));
}

#[test]
fn test_undo_redo_keys() {
    let mut app = app();
    add(&mut app, "First");
    add(&mut app, "Second");
    assert_eq!(texts(&app), vec!["Second", "First"]);

    press(&mut app, KeyCode::Char('u'));
    assert_eq!(texts(&app), vec!["First"]);
    handle_key(&mut app, KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
    assert!(app.store.tasks().is_empty());
    assert_eq!(app.state.selected(), None);

    press(&mut app, KeyCode::Char('U'));
    handle_key(&mut app, KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL));
    assert_eq!(texts(&app), vec!["Second", "First"]);
}

#[test]
fn test_move_and_toggle_selected() {
    let mut app = app();
    add(&mut app, "A");
    add(&mut app, "B");
    add(&mut app, "C");

    press(&mut app, KeyCode::Char('J'));
    assert_eq!(texts(&app), vec!["B", "C", "A"]);
    assert_eq!(app.state.selected(), Some(1));

    press(&mut app, KeyCode::Char(' '));
    assert!(app.store.tasks()[1].completed);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.filter, Filter::Active);
    assert_eq!(app.visible().len(), 2);

    press(&mut app, KeyCode::Char('X'));
    assert_eq!(texts(&app), vec!["B", "A"]);
    press(&mut app, KeyCode::Char('u'));
    assert_eq!(texts(&app), vec!["B", "C", "A"]);
}

#[test]
fn test_search_narrows_and_esc_clears() {
    let mut app = app();
    add(&mut app, "Buy milk");
    add(&mut app, "Call mum");

    press(&mut app, KeyCode::Char('/'));
    for c in "milk".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    assert_eq!(app.visible().len(), 1);
    assert_eq!(app.selected_task().map(|t| t.text.as_str()), Some("Buy milk"));

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.search.is_empty());
    assert_eq!(app.visible().len(), 2);
}

#[test]
fn test_edit_text_of_selected() {
    let mut app = app();
    add(&mut app, "Draft");
    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.input_buffer, "Draft");
    press(&mut app, KeyCode::Backspace);
    type_line(&mut app, "s");
    assert_eq!(texts(&app), vec!["Drafs"]);
}

#[test]
fn test_shortcuts_dialog_swallows_keys() {
    let mut app = app();
    add(&mut app, "Keep");
    press(&mut app, KeyCode::Char('?'));
    assert!(app.shortcuts.is_open());

    assert!(press(&mut app, KeyCode::Char('d')));
    assert_eq!(app.store.tasks().len(), 1);

    press(&mut app, KeyCode::Esc);
    assert!(!app.shortcuts.is_open());
    assert!(!press(&mut app, KeyCode::Char('q')));
}

#[test]
fn test_theme_key() {
    let mut app = app();
    press(&mut app, KeyCode::Char('T'));
    assert_eq!(app.themes.theme(), Theme::Light);
}
