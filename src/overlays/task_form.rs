use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::text_input::{input_style, TextInput};
use super::util::{centered_rect, hint_line, render_overlay_frame};
use crate::task::{parse_due, Quadrant, Task, TaskDraft, DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Notes,
    Due,
    Quadrant,
}

impl FormField {
    const fn next(self) -> Self {
        match self {
            Self::Title => Self::Notes,
            Self::Notes => Self::Due,
            Self::Due => Self::Quadrant,
            Self::Quadrant => Self::Title,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Title => Self::Quadrant,
            Self::Notes => Self::Title,
            Self::Due => Self::Notes,
            Self::Quadrant => Self::Due,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Notes => "Notes",
            Self::Due => "Due",
            Self::Quadrant => "Quadrant",
        }
    }
}

pub enum TaskFormAction {
    Consumed,
    Dismiss,
    /// `id` is `None` for a new task.
    Submit {
        id: Option<String>,
        draft: TaskDraft,
        quadrant: Quadrant,
    },
}

/// Modal form for creating or editing a task.
pub struct TaskFormOverlay {
    editing: Option<String>,
    title: TextInput,
    notes: TextInput,
    due: TextInput,
    quadrant: Quadrant,
    field: FormField,
    error: Option<String>,
}

impl TaskFormOverlay {
    pub fn new_task(quadrant: Quadrant) -> Self {
        Self {
            editing: None,
            title: TextInput::default(),
            notes: TextInput::default(),
            due: TextInput::default(),
            quadrant,
            field: FormField::Title,
            error: None,
        }
    }

    pub fn edit_task(task: &Task, quadrant: Quadrant) -> Self {
        let due = task
            .due
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            editing: Some(task.id.clone()),
            title: TextInput::new(task.title.clone()),
            notes: TextInput::new(task.notes.clone()),
            due: TextInput::new(due),
            quadrant,
            field: FormField::Title,
            error: None,
        }
    }

    #[cfg(test)]
    pub const fn field(&self) -> FormField {
        self.field
    }

    #[cfg(test)]
    pub const fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            " Edit task "
        } else {
            " New task "
        }
    }

    fn input_mut(&mut self) -> Option<&mut TextInput> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Notes => Some(&mut self.notes),
            FormField::Due => Some(&mut self.due),
            FormField::Quadrant => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> TaskFormAction {
        match key.code {
            KeyCode::Esc => return TaskFormAction::Dismiss,
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.field = self.field.prev();
            }
            KeyCode::Tab | KeyCode::Down => self.field = self.field.next(),
            KeyCode::BackTab | KeyCode::Up => self.field = self.field.prev(),
            _ if self.field == FormField::Quadrant => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.quadrant = self.quadrant.prev(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    self.quadrant = self.quadrant.next();
                }
                KeyCode::Char(c) => {
                    if let Some(q) = c
                        .to_digit(10)
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(Quadrant::from_number)
                    {
                        self.quadrant = q;
                    }
                }
                _ => {}
            },
            _ => {
                if let Some(input) = self.input_mut() {
                    input.handle_key(key);
                }
            }
        }
        TaskFormAction::Consumed
    }

    fn submit(&mut self) -> TaskFormAction {
        let title = self.title.value().trim();
        if title.is_empty() {
            return TaskFormAction::Dismiss;
        }
        let due = match parse_due(self.due.value()) {
            Ok(due) => due,
            Err(_) => {
                self.error = Some("Due date must be YYYY-MM-DD".to_string());
                self.field = FormField::Due;
                return TaskFormAction::Consumed;
            }
        };
        TaskFormAction::Submit {
            id: self.editing.clone(),
            draft: TaskDraft {
                title: title.to_string(),
                notes: self.notes.value().trim().to_string(),
                due,
            },
            quadrant: self.quadrant,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let overlay_area = centered_rect(frame.area(), 56, 13);
        let inner = render_overlay_frame(frame, overlay_area, self.heading(), Color::Cyan);

        let rows = Layout::vertical([
            Constraint::Length(1), // pad
            Constraint::Length(1), // title
            Constraint::Length(1), // notes
            Constraint::Length(1), // due
            Constraint::Length(1), // quadrant
            Constraint::Length(1), // pad
            Constraint::Length(1), // error
            Constraint::Length(1), // pad
            Constraint::Length(1), // hints
            Constraint::Min(0),
        ])
        .split(inner);

        let fields = [
            (FormField::Title, Some(&self.title)),
            (FormField::Notes, Some(&self.notes)),
            (FormField::Due, Some(&self.due)),
            (FormField::Quadrant, None),
        ];
        for (row, (field, input)) in rows[1..=4].iter().zip(fields) {
            let focused = self.field == field;
            let [label_area, value_area] =
                Layout::horizontal([Constraint::Length(11), Constraint::Min(1)]).areas(Rect {
                    x: row.x + 1,
                    width: row.width.saturating_sub(2),
                    ..*row
                });

            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(field.label(), label_style)),
                label_area,
            );

            match input {
                Some(input) => input.render(frame, value_area, focused, input_style(focused)),
                None => self.render_quadrant_picker(frame, value_area, focused),
            }
        }

        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
                    .alignment(Alignment::Center),
                rows[6],
            );
        } else if self.field == FormField::Due {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "YYYY-MM-DD, blank for none",
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center),
                rows[6],
            );
        }

        let hints = hint_line(&[("Tab", "Next"), ("Enter", "Save"), ("Esc", "Cancel")]);
        frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), rows[8]);
    }

    fn render_quadrant_picker(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let mut spans = Vec::new();
        for q in Quadrant::ALL {
            let style = if q == self.quadrant {
                let base = Style::default().fg(Color::Black).bg(quadrant_color(q));
                if focused {
                    base.add_modifier(Modifier::BOLD)
                } else {
                    base
                }
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", q.title()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

pub const fn quadrant_color(quadrant: Quadrant) -> Color {
    match quadrant {
        Quadrant::Do => Color::Red,
        Quadrant::Schedule => Color::Blue,
        Quadrant::Delegate => Color::Yellow,
        Quadrant::Drop => Color::Gray,
    }
}
