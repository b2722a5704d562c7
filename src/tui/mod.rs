pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputField, InputMode};
use ui::ui;

use crate::store::TaskStore;
use crate::theme::ThemeStore;

pub fn run_tui(store: TaskStore, themes: ThemeStore) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, themes);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "tui loop failed");
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !handle_key(app, key) {
                return Ok(());
            }
        }
    }
}

/// Applies one key press. Returns false when the user asked to quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if app.shortcuts.is_open() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.shortcuts.set_open(false);
        }
        return true;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match app.input_mode {
        InputMode::Normal => {
            app.status = None;
            match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('z') if ctrl => app.undo(),
                KeyCode::Char('y') if ctrl => app.redo(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('J') => app.move_selected(true),
                KeyCode::Char('K') => app.move_selected(false),
                KeyCode::Char(' ') => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('X') => app.clear_completed(),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('e') => app.start_edit(InputField::Text),
                KeyCode::Char('c') => app.start_edit(InputField::Category),
                KeyCode::Char('p') => app.start_edit(InputField::Priority),
                KeyCode::Char('t') => app.start_edit(InputField::Due),
                KeyCode::Char('D') => app.start_edit(InputField::Description),
                KeyCode::Char('s') => app.start_edit(InputField::Subtask),
                KeyCode::Char('m') => app.start_edit(InputField::Comment),
                KeyCode::Char('u') => app.undo(),
                KeyCode::Char('U') => app.redo(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('/') => app.start_search(),
                KeyCode::Char('T') => app.toggle_theme(),
                KeyCode::Char('?') => app.shortcuts.toggle(),
                KeyCode::Enter => app.toggle_details(),
                _ => {}
            }
        }
        InputMode::Searching => match key.code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => {
                app.search.push(c);
                app.search_changed();
            }
            KeyCode::Backspace => {
                app.search.pop();
                app.search_changed();
            }
            _ => {}
        },
        InputMode::Editing | InputMode::Adding => match key.code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => {
                app.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
    }
    true
}
