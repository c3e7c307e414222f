use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::app::{App, Overlay};
use crate::board::Board;
use crate::filter::{DueBucket, Filter};
use crate::overlays::{quadrant_color, render_error_overlay, render_help_overlay};
use crate::task::{meta_line, Quadrant};

pub fn render(frame: &mut Frame, app: &mut App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, app);

    app.render_board(frame, body);

    render_footer(frame, footer, app);

    match app.overlay {
        Some(Overlay::Form(ref form)) => form.render(frame),
        Some(Overlay::Prompt(ref prompt)) => prompt.render(frame),
        Some(Overlay::Confirm(ref confirm)) => confirm.render(frame),
        Some(Overlay::Error(ref message)) => render_error_overlay(frame, message),
        Some(Overlay::Help) => render_help_overlay(frame, &app.board_panel.shortcuts()),
        None => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " Priority Matrix ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} tasks", app.board().total()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    spans.extend(filter_spans(&app.filter));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn filter_spans(filter: &Filter) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let query = filter.query.trim();
    if !query.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("/{query}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    if filter.bucket != DueBucket::All {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("due: {}", filter.bucket.label()),
            Style::default().fg(Color::Magenta),
        ));
    }
    if filter.hide_completed {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "done hidden",
            Style::default().fg(Color::Green),
        ));
    }
    spans
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(ref status) = app.status {
        Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Green),
        ))
    } else if let Some(target) = app.board_panel.drop_target() {
        Line::from(vec![
            Span::styled(" Dragging ", Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::raw(format!(" over {}  ", target.title())),
            Span::styled("[h/j/k/l 1-4]", Style::default().fg(Color::Yellow)),
            Span::raw(" Aim "),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::raw(" Drop "),
            Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ])
    } else {
        let focused = app.board_panel.focused_quadrant();
        Line::from(vec![
            Span::styled(
                format!(" {} ", focused.title()),
                Style::default()
                    .fg(Color::Black)
                    .bg(quadrant_color(focused)),
            ),
            Span::styled(
                "  n new  e edit  x done  g drag  / search  f due  H hide done  ? help  q quit",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Plain-text board for `quadrant print`.
pub fn plain_text(board: &Board, today: NaiveDate) -> String {
    let mut out = String::new();
    for quadrant in Quadrant::ALL {
        let _ = writeln!(
            out,
            "{} {} ({})",
            quadrant.number(),
            quadrant.title(),
            board.count(quadrant)
        );
        let tasks = board.tasks(quadrant);
        if tasks.is_empty() {
            out.push_str("    (empty)\n");
        }
        for task in tasks {
            let tick = if task.done { "[x]" } else { "[ ]" };
            let meta = meta_line(task, today);
            if meta.is_empty() {
                let _ = writeln!(out, "    {tick} {}", task.title);
            } else {
                let _ = writeln!(out, "    {tick} {}  ({meta})", task.title);
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use crate::task::TaskDraft;

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn header_reflects_filters() {
        let mut app = App::new(Box::new(MemoryStore::default()), &Config::default());
        app.filter.query = "tax".into();
        app.filter.hide_completed = true;
        let text = screen(&mut app);
        assert!(text.contains("Priority Matrix"));
        assert!(text.contains("/tax"));
        assert!(text.contains("done hidden"));
    }

    #[test]
    fn form_overlay_is_drawn() {
        let mut app = App::new(Box::new(MemoryStore::default()), &Config::default());
        app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE));
        let text = screen(&mut app);
        assert!(text.contains("New task"));
        assert!(text.contains("Title"));
        assert!(text.contains("Quadrant"));
    }

    #[test]
    fn plain_text_lists_every_quadrant() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut board = Board::new();
        board.add(
            TaskDraft::new("File taxes").with_due(today).with_notes("forms"),
            Quadrant::Do,
        );
        board.add(TaskDraft::new("Plan trip"), Quadrant::Schedule);

        let text = plain_text(&board, today);
        assert!(text.contains("1 Do now (1)\n    [ ] File taxes  (Due today • forms)\n"));
        assert!(text.contains("2 Schedule (1)\n    [ ] Plan trip\n"));
        assert!(text.contains("3 Delegate (0)\n    (empty)\n"));
        assert!(text.contains("4 Drop (0)"));
    }
}
