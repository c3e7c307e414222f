use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};
use tracing::debug;

use super::util::{KeyHandleResult, Shortcut};
use crate::board::Board;
use crate::filter::{visible, Filter};
use crate::overlays::quadrant_color;
use crate::task::{format_due, Quadrant, Task};

/// Read-only inputs the panel needs to decide which rows are shown.
pub struct BoardView<'a> {
    pub board: &'a Board,
    pub filter: &'a Filter,
    pub today: NaiveDate,
}

impl BoardView<'_> {
    fn visible(&self, quadrant: Quadrant) -> Vec<(usize, &Task)> {
        visible(self.board, quadrant, self.filter, self.today)
    }
}

/// A task picked up and hovering over a dropzone.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Drag {
    id: String,
    source: Quadrant,
    target: Quadrant,
}

pub struct BoardPanel {
    focus: Quadrant,
    /// Cursor per quadrant, indexing the filtered rows.
    cursors: [usize; 4],
    drag: Option<Drag>,
}

impl Default for BoardPanel {
    fn default() -> Self {
        Self {
            focus: Quadrant::Do,
            cursors: [0; 4],
            drag: None,
        }
    }
}

impl BoardPanel {
    pub const fn focused_quadrant(&self) -> Quadrant {
        self.focus
    }

    pub const fn cursor(&self) -> usize {
        self.cursors[self.focus.index()]
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Quadrant currently highlighted as the drop target.
    pub fn drop_target(&self) -> Option<Quadrant> {
        self.drag.as_ref().map(|d| d.target)
    }

    /// Put the cursor on `id`, following it across quadrants.
    pub fn focus_task(&mut self, id: &str, view: &BoardView) {
        let Some((quadrant, _, _)) = view.board.find(id) else {
            return;
        };
        self.focus = quadrant;
        if let Some(pos) = view
            .visible(quadrant)
            .iter()
            .position(|(_, task)| task.id == id)
        {
            self.cursors[quadrant.index()] = pos;
        }
    }

    pub fn clamp_focus(&mut self, view: &BoardView) {
        for q in Quadrant::ALL {
            let len = view.visible(q).len();
            let cursor = &mut self.cursors[q.index()];
            if *cursor >= len {
                *cursor = len.saturating_sub(1);
            }
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        board: &mut Board,
        filter: &Filter,
        today: NaiveDate,
    ) -> KeyHandleResult {
        if self.drag.is_some() {
            return self.handle_drag_key(key, board, filter, today);
        }

        let view = BoardView {
            board: &*board,
            filter,
            today,
        };
        let rows = view.visible(self.focus);
        let selected = rows.get(self.cursor()).map(|(idx, task)| (*idx, task.id.clone()));

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor() + 1 < rows.len() {
                    self.cursors[self.focus.index()] += 1;
                } else {
                    self.focus = self.focus.down();
                }
                KeyHandleResult::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.cursor() > 0 {
                    self.cursors[self.focus.index()] -= 1;
                } else {
                    self.focus = self.focus.up();
                }
                KeyHandleResult::Consumed
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.focus = self.focus.left();
                KeyHandleResult::Consumed
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.focus = self.focus.right();
                KeyHandleResult::Consumed
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.focus = self.focus.prev();
                KeyHandleResult::Consumed
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                KeyHandleResult::Consumed
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                KeyHandleResult::Consumed
            }
            KeyCode::Char('a') => KeyHandleResult::AddTask(self.focus),
            _ => {
                let Some((board_idx, id)) = selected else {
                    return KeyHandleResult::Ignored;
                };
                let cursor = self.cursor();
                let neighbour = |offset: isize| {
                    cursor
                        .checked_add_signed(offset)
                        .and_then(|i| rows.get(i))
                        .map(|(idx, _)| *idx)
                };
                let (above, below) = (neighbour(-1), neighbour(1));
                self.handle_task_key(key, board, &id, board_idx, above, below)
            }
        }
    }

    fn handle_task_key(
        &mut self,
        key: KeyEvent,
        board: &mut Board,
        id: &str,
        board_idx: usize,
        above: Option<usize>,
        below: Option<usize>,
    ) -> KeyHandleResult {
        let quadrant = self.focus;
        match key.code {
            KeyCode::Char('x' | ' ') => {
                board.toggle_done(id);
                KeyHandleResult::Changed
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                board.delete(id);
                KeyHandleResult::Changed
            }
            KeyCode::Char('e') | KeyCode::Enter => KeyHandleResult::Edit(id.to_string()),
            KeyCode::Char('J') => match below {
                Some(other) if board.swap(quadrant, board_idx, other) => {
                    self.cursors[quadrant.index()] += 1;
                    KeyHandleResult::Changed
                }
                _ => KeyHandleResult::Consumed,
            },
            KeyCode::Char('K') => match above {
                Some(other) if board.swap(quadrant, board_idx, other) => {
                    self.cursors[quadrant.index()] -= 1;
                    KeyHandleResult::Changed
                }
                _ => KeyHandleResult::Consumed,
            },
            KeyCode::Char('g') => {
                debug!(%id, "grabbed task");
                self.drag = Some(Drag {
                    id: id.to_string(),
                    source: quadrant,
                    target: quadrant,
                });
                KeyHandleResult::Consumed
            }
            _ => KeyHandleResult::Ignored,
        }
    }

    fn handle_drag_key(
        &mut self,
        key: KeyEvent,
        board: &mut Board,
        filter: &Filter,
        today: NaiveDate,
    ) -> KeyHandleResult {
        let Some(ref mut drag) = self.drag else {
            return KeyHandleResult::Ignored;
        };
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => drag.target = drag.target.left(),
            KeyCode::Char('l') | KeyCode::Right => drag.target = drag.target.right(),
            KeyCode::Char('k') | KeyCode::Up => drag.target = drag.target.up(),
            KeyCode::Char('j') | KeyCode::Down => drag.target = drag.target.down(),
            KeyCode::Tab => drag.target = drag.target.next(),
            KeyCode::BackTab => drag.target = drag.target.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(q) = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(Quadrant::from_number)
                {
                    drag.target = q;
                }
            }
            KeyCode::Esc => {
                debug!(id = %drag.id, "drag cancelled");
                self.drag = None;
            }
            KeyCode::Enter | KeyCode::Char('g' | ' ') => {
                if let Some(drag) = self.drag.take() {
                    let moved = board.move_to(&drag.id, drag.target);
                    let view = BoardView {
                        board: &*board,
                        filter,
                        today,
                    };
                    self.focus_task(&drag.id, &view);
                    self.clamp_focus(&view);
                    if moved {
                        return KeyHandleResult::Changed;
                    }
                    debug!(id = %drag.id, quadrant = %drag.source, "dropped on own quadrant");
                }
            }
            _ => {}
        }
        KeyHandleResult::Consumed
    }

    pub fn shortcuts(&self) -> Vec<Shortcut> {
        vec![
            Shortcut {
                key: "h/j/k/l",
                description: "Navigate",
            },
            Shortcut {
                key: "Tab",
                description: "Next Quadrant",
            },
            Shortcut {
                key: "J/K",
                description: "Reorder",
            },
            Shortcut {
                key: "x",
                description: "Toggle Done",
            },
            Shortcut {
                key: "e",
                description: "Edit",
            },
            Shortcut {
                key: "d",
                description: "Delete",
            },
            Shortcut {
                key: "a",
                description: "Add Here",
            },
            Shortcut {
                key: "g",
                description: "Grab / Drop",
            },
        ]
    }

    // -- Rendering --

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool, view: &BoardView) {
        self.clamp_focus(view);

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let [top_left, top_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(top);
        let [bottom_left, bottom_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom);

        for (quadrant, cell) in Quadrant::ALL
            .into_iter()
            .zip([top_left, top_right, bottom_left, bottom_right])
        {
            self.render_quadrant(frame, cell, quadrant, focused, view);
        }
    }

    fn render_quadrant(
        &self,
        frame: &mut Frame,
        area: Rect,
        quadrant: Quadrant,
        focused: bool,
        view: &BoardView,
    ) {
        let rows = view.visible(quadrant);
        let total = view.board.count(quadrant);
        let is_focused = focused && self.focus == quadrant && self.drag.is_none();
        let is_over = self.drop_target() == Some(quadrant);

        let (border_color, border_type) = if is_over {
            (Color::Yellow, BorderType::Double)
        } else if is_focused {
            (Color::Cyan, BorderType::Plain)
        } else {
            (Color::DarkGray, BorderType::Plain)
        };

        let mut title = vec![
            Span::raw(" "),
            Span::styled(
                format!("{} {}", quadrant.number(), quadrant.title()),
                Style::default()
                    .fg(quadrant_color(quadrant))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" ({total})"), Style::default().fg(Color::Gray)),
        ];
        if view.filter.is_active() && rows.len() != total {
            title.push(Span::styled(
                format!(" {} shown", rows.len()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        title.push(Span::raw(" "));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(Style::default().fg(border_color))
            .title(Line::from(title))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {} ", quadrant.subtitle()),
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Right),
            );

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cursor = is_focused.then(|| self.cursors[quadrant.index()]);
        let dragged = self.drag.as_ref().map(|d| d.id.as_str());
        render_task_list(frame, inner, &rows, cursor, dragged, view.today);
    }
}

fn render_task_list(
    frame: &mut Frame,
    area: Rect,
    rows: &[(usize, &Task)],
    focused_index: Option<usize>,
    dragged: Option<&str>,
    today: NaiveDate,
) {
    if rows.is_empty() {
        let centered = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .split(area)[0];
        let placeholder = Paragraph::new("(empty)")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, centered);
        return;
    }

    let total_height = area.height as usize;
    if total_height == 0 {
        return;
    }

    // Reserve last row for ellipsis indicator
    let visible_height = total_height.saturating_sub(1).max(1);

    let offset = scroll_offset(rows.len(), visible_height, focused_index);
    let has_more_below = offset + visible_height < rows.len();

    let prefix_width = 6; // "> [x] "
    let max_width = (area.width as usize).saturating_sub(prefix_width);

    let mut items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(i, (_, task))| {
            let is_selected = focused_index == Some(i);
            let is_dragged = dragged == Some(task.id.as_str());
            ListItem::new(task_line(task, is_selected, is_dragged, max_width, today))
        })
        .collect();

    items.push(if has_more_below {
        ListItem::new(Line::from(Span::styled(
            "  ...",
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        ListItem::new(Line::from(""))
    });

    frame.render_widget(List::new(items), area);
}

fn task_line(
    task: &Task,
    selected: bool,
    dragged: bool,
    max_width: usize,
    today: NaiveDate,
) -> Line<'static> {
    let checkbox = if task.done { "[x] " } else { "[ ] " };
    let mut title_style = if selected {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    if task.done {
        title_style = title_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if dragged {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }

    let due = format_due(task.due, today);
    let due_color = if task.due.is_some_and(|d| d < today) && !task.done {
        Color::Red
    } else {
        Color::DarkGray
    };
    let meta = [due.as_str(), task.notes.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" • ");

    let title_width = task.title.chars().count();
    let title = truncate_with_ellipsis(&task.title, max_width);
    let meta_room = max_width.saturating_sub(title_width + 3);

    let mut spans = vec![
        if selected {
            Span::styled("> ", Style::default().fg(Color::Cyan))
        } else {
            Span::raw("  ")
        },
        Span::styled(checkbox, Style::default().fg(Color::DarkGray)),
        Span::styled(title, title_style),
    ];
    if !meta.is_empty() && meta_room > 3 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            truncate_with_ellipsis(&meta, meta_room),
            Style::default().fg(due_color),
        ));
    }
    Line::from(spans)
}

fn scroll_offset(total: usize, visible: usize, focused: Option<usize>) -> usize {
    let Some(cursor) = focused else { return 0 };
    if visible == 0 {
        return 0;
    }
    let max_offset = total.saturating_sub(visible);
    // Keep cursor at least `margin` rows from the bottom edge
    let margin = 2usize.min(visible.saturating_sub(1) / 2);
    (cursor + margin + 1).saturating_sub(visible).min(max_offset)
}

fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width < 3 {
        return ".".repeat(max_width);
    }
    let kept: String = text.chars().take(max_width - 3).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::task::TaskDraft;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(panel: &mut BoardPanel, board: &mut Board, code: KeyCode) -> KeyHandleResult {
        panel.handle_key(key(code), board, &Filter::default(), today())
    }

    fn sample() -> Board {
        let mut board = Board::new();
        board.add(TaskDraft::new("a1"), Quadrant::Do);
        board.add(TaskDraft::new("a2"), Quadrant::Do);
        board.add(TaskDraft::new("b1"), Quadrant::Schedule);
        board
    }

    fn titles(board: &Board, q: Quadrant) -> Vec<&str> {
        board.tasks(q).iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn navigation_walks_rows_then_quadrants() {
        let mut board = sample();
        let mut panel = BoardPanel::default();

        press(&mut panel, &mut board, KeyCode::Char('j'));
        assert_eq!(panel.cursor(), 1);
        press(&mut panel, &mut board, KeyCode::Char('j'));
        assert_eq!(panel.focused_quadrant(), Quadrant::Delegate);
        press(&mut panel, &mut board, KeyCode::Char('k'));
        assert_eq!(panel.focused_quadrant(), Quadrant::Do);
        press(&mut panel, &mut board, KeyCode::Char('l'));
        assert_eq!(panel.focused_quadrant(), Quadrant::Schedule);
        press(&mut panel, &mut board, KeyCode::Tab);
        assert_eq!(panel.focused_quadrant(), Quadrant::Delegate);
    }

    #[test]
    fn toggle_and_delete_act_on_selection() {
        let mut board = sample();
        let mut panel = BoardPanel::default();

        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Char('x')),
            KeyHandleResult::Changed
        );
        assert!(board.tasks(Quadrant::Do)[0].done);

        press(&mut panel, &mut board, KeyCode::Char('j'));
        press(&mut panel, &mut board, KeyCode::Char('d'));
        assert_eq!(titles(&board, Quadrant::Do), ["a1"]);
    }

    #[test]
    fn empty_quadrant_ignores_task_keys() {
        let mut board = sample();
        let mut panel = BoardPanel::default();
        press(&mut panel, &mut board, KeyCode::Char('h'));
        press(&mut panel, &mut board, KeyCode::Char('j'));
        press(&mut panel, &mut board, KeyCode::Char('j'));
        assert_eq!(panel.focused_quadrant(), Quadrant::Delegate);
        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Char('x')),
            KeyHandleResult::Ignored
        );
        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Char('a')),
            KeyHandleResult::AddTask(Quadrant::Delegate)
        );
    }

    #[test]
    fn edit_returns_selected_id() {
        let mut board = sample();
        let mut panel = BoardPanel::default();
        let id = board.tasks(Quadrant::Do)[0].id.clone();
        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Enter),
            KeyHandleResult::Edit(id)
        );
    }

    #[test]
    fn reorder_moves_cursor_with_task() {
        let mut board = sample();
        let mut panel = BoardPanel::default();
        press(&mut panel, &mut board, KeyCode::Char('J'));
        assert_eq!(titles(&board, Quadrant::Do), ["a2", "a1"]);
        assert_eq!(panel.cursor(), 1);
        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Char('J')),
            KeyHandleResult::Consumed
        );
        press(&mut panel, &mut board, KeyCode::Char('K'));
        assert_eq!(titles(&board, Quadrant::Do), ["a1", "a2"]);
        assert_eq!(panel.cursor(), 0);
    }

    #[test]
    fn reorder_skips_hidden_rows() {
        let mut board = Board::new();
        board.add(TaskDraft::new("match one"), Quadrant::Do);
        board.add(TaskDraft::new("hidden"), Quadrant::Do);
        board.add(TaskDraft::new("match two"), Quadrant::Do);
        let filter = Filter {
            query: "match".into(),
            ..Filter::default()
        };
        let mut panel = BoardPanel::default();
        panel.handle_key(key(KeyCode::Char('J')), &mut board, &filter, today());
        assert_eq!(
            titles(&board, Quadrant::Do),
            ["match two", "hidden", "match one"]
        );
    }

    #[test]
    fn grab_aim_drop_reassigns_quadrant() {
        let mut board = sample();
        let mut panel = BoardPanel::default();
        let id = board.tasks(Quadrant::Do)[0].id.clone();

        press(&mut panel, &mut board, KeyCode::Char('g'));
        assert!(panel.is_dragging());
        press(&mut panel, &mut board, KeyCode::Char('l'));
        assert_eq!(panel.drop_target(), Some(Quadrant::Schedule));
        press(&mut panel, &mut board, KeyCode::Char('4'));
        assert_eq!(panel.drop_target(), Some(Quadrant::Drop));

        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Enter),
            KeyHandleResult::Changed
        );
        assert!(!panel.is_dragging());
        assert_eq!(board.find(&id).unwrap().0, Quadrant::Drop);
        assert_eq!(panel.focused_quadrant(), Quadrant::Drop);
    }

    #[test]
    fn drop_on_own_quadrant_or_cancel_changes_nothing() {
        let mut board = sample();
        let before = board.clone();
        let mut panel = BoardPanel::default();

        press(&mut panel, &mut board, KeyCode::Char('g'));
        assert_eq!(
            press(&mut panel, &mut board, KeyCode::Char('g')),
            KeyHandleResult::Consumed
        );
        assert_eq!(board, before);

        press(&mut panel, &mut board, KeyCode::Char('g'));
        press(&mut panel, &mut board, KeyCode::Char('j'));
        press(&mut panel, &mut board, KeyCode::Esc);
        assert!(!panel.is_dragging());
        assert_eq!(board, before);
    }

    #[test]
    fn renders_four_quadrants_with_counts() {
        let board = sample();
        let filter = Filter::default();
        let view = BoardView {
            board: &board,
            filter: &filter,
            today: today(),
        };
        let mut panel = BoardPanel::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| panel.render(frame, frame.area(), true, &view))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("1 Do now (2)"));
        assert!(text.contains("2 Schedule (1)"));
        assert!(text.contains("3 Delegate (0)"));
        assert!(text.contains("4 Drop (0)"));
        assert!(text.contains("(empty)"));
        assert!(text.contains("> [ ] a1"));
    }

    #[test]
    fn truncation_is_char_aware() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("ééééééé", 6), "ééé...");
        assert_eq!(truncate_with_ellipsis("abc", 2), "..");
    }

    #[test]
    fn scroll_keeps_cursor_in_view() {
        assert_eq!(scroll_offset(5, 10, Some(4)), 0);
        assert_eq!(scroll_offset(20, 5, None), 0);
        let offset = scroll_offset(20, 5, Some(10));
        assert!(offset <= 10 && 10 < offset + 5);
    }
}
