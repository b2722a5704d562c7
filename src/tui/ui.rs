use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::commands::render_details;
use crate::filter::{all_done, progress, remaining};
use crate::models::Priority;
use crate::shortcuts::SHORTCUTS;
use crate::theme::Palette;
use super::app::{App, InputField, InputMode};

/// Maps a palette entry onto a terminal color.
fn color(hex: &str) -> Color {
    Palette::rgb(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Reset)
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let colors = app.themes.colors();
    let base = Style::default().fg(color(colors.text)).bg(color(colors.background));
    f.render_widget(Block::default().style(base), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Table (+ details)
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    render_progress(f, app, chunks[0]);

    let body = if app.show_details {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)].as_ref())
            .split(chunks[1])
    };

    render_table(f, app, body[0]);
    if app.show_details && body.len() > 1 {
        render_details_pane(f, app, body[1]);
    }
    render_help(f, app, chunks[2]);

    match app.input_mode {
        InputMode::Editing | InputMode::Adding => render_input(f, app),
        InputMode::Searching | InputMode::Normal => {}
    }

    if app.shortcuts.is_open() {
        render_shortcuts(f, app);
    }
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let colors = app.themes.colors();
    let tasks = app.store.tasks();
    let ratio = progress(tasks);
    let label = if all_done(tasks) {
        "All tasks completed!".to_string()
    } else {
        format!("{} tasks remaining - {:.0}%", remaining(tasks), ratio * 100.0)
    };
    let gauge_color = if all_done(tasks) { colors.success } else { colors.primary };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border)))
                .title("Todoust"),
        )
        .gauge_style(Style::default().fg(color(gauge_color)).bg(color(colors.surface)))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let colors = app.themes.colors();
    let now = Utc::now();

    let rows: Vec<Row> = app
        .visible()
        .into_iter()
        .map(|(idx, t)| {
            let priority_color = match t.priority {
                Priority::High => colors.error,
                Priority::Medium => colors.warning,
                Priority::Low => colors.success,
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
            let style = if t.completed {
                Style::default().fg(color(colors.text_secondary)).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(color(colors.text))
            };

            Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.text.clone()),
                Cell::from(t.category.clone()).style(Style::default().fg(color(colors.accent))),
                Cell::from(t.priority.icon()).style(Style::default().fg(color(priority_color))),
                Cell::from(due).style(if t.is_overdue(now) {
                    Style::default().fg(color(colors.error))
                } else {
                    Style::default()
                }),
                Cell::from(subtasks),
                Cell::from(if t.comments.is_empty() { String::new() } else { t.comments.len().to_string() }),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(4),
    ];

    let mut title = format!("Tasks - {}", app.filter);
    if !app.search.is_empty() || app.input_mode == InputMode::Searching {
        title.push_str(&format!(" - search: {}", app.search));
        if app.input_mode == InputMode::Searching {
            title.push('_');
        }
    }

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["#", "", "Task", "Category", "Pri", "Due", "Sub", "Cmt"])
            .style(Style::default().fg(color(colors.primary)).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border)))
                .title(title),
        )
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(color(colors.surface_hover)),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_details_pane(f: &mut Frame, app: &App, area: Rect) {
    let colors = app.themes.colors();
    let text = match app.selected_task() {
        Some(t) => render_details(t),
        None => "No task selected".to_string(),
    };
    let details = Paragraph::new(text)
        .style(Style::default().fg(color(colors.text)).bg(color(colors.card)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border)))
                .title("Details"),
        );
    f.render_widget(details, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let colors = app.themes.colors();
    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Space: Done | e: Edit | d: Del | J/K: Move | u/U: Undo/Redo | f: Filter | /: Search | T: Theme | ?: Shortcuts",
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
        InputMode::Searching => "Type to search | Enter: Keep | Esc: Clear",
    };

    let mut spans = vec![Span::raw(help_text)];
    if let Some(msg) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg.clone(), Style::default().fg(color(colors.warning))));
    }

    let help = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(color(colors.text_secondary)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border))),
        );
    f.render_widget(help, area);
}

fn render_input(f: &mut Frame, app: &App) {
    let colors = app.themes.colors();
    let area = centered_rect(60, 3, f.area()); // border + 1 line
    f.render_widget(Clear, area);

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Text",
            1 => "Add Task: Enter Category (default)",
            2 => "Add Task: Enter Priority (low/medium/high)",
            3 => "Add Task: Enter Due Date (Optional)",
            _ => "Add Task",
        },
        InputMode::Editing => match app.input_field {
            InputField::Text => "Edit Text",
            InputField::Category => "Edit Category",
            InputField::Priority => "Edit Priority (low/medium/high)",
            InputField::Due => "Edit Due Date (empty to clear)",
            InputField::Description => "Edit Description",
            InputField::Subtask => "Add Subtask",
            InputField::Comment => "Add Comment",
            InputField::None => "Edit",
        },
        InputMode::Normal | InputMode::Searching => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(color(colors.primary)).bg(color(colors.surface)))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn render_shortcuts(f: &mut Frame, app: &App) {
    let colors = app.themes.colors();
    let height = SHORTCUTS.len() as u16 + 4;
    let area = centered_rect(50, height, f.area());
    f.render_widget(Clear, area);

    let rows: Vec<Row> = SHORTCUTS
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.keys).style(Style::default().fg(color(colors.primary)).add_modifier(Modifier::BOLD)),
                Cell::from(s.description),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
        .style(Style::default().fg(color(colors.text)).bg(color(colors.card)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border)))
                .title("Keyboard Shortcuts (Esc to close)"),
        );
    f.render_widget(table, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
