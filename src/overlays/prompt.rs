use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Color,
    widgets::Paragraph,
    Frame,
};

use super::text_input::{input_style, TextInput};
use super::util::{centered_rect, hint_line, render_overlay_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Export,
    Import,
}

impl PromptKind {
    const fn title(self) -> &'static str {
        match self {
            Self::Search => " Search ",
            Self::Export => " Export to ",
            Self::Import => " Import from ",
        }
    }

    const fn submit_label(self) -> &'static str {
        match self {
            Self::Search => "Done",
            Self::Export => "Export",
            Self::Import => "Import",
        }
    }
}

pub enum PromptAction {
    /// Text changed; search applies it live.
    Edited,
    Consumed,
    Dismiss,
    Submit(String),
}

/// Single-line prompt used for the search query and file paths.
pub struct PromptOverlay {
    pub kind: PromptKind,
    input: TextInput,
}

impl PromptOverlay {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            input: TextInput::new(initial),
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        match key.code {
            KeyCode::Esc => PromptAction::Dismiss,
            KeyCode::Enter => PromptAction::Submit(self.input.value().trim().to_string()),
            _ => {
                let before = self.input.value().len();
                if self.input.handle_key(key) && self.input.value().len() != before {
                    PromptAction::Edited
                } else {
                    PromptAction::Consumed
                }
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let overlay_area = centered_rect(frame.area(), 50, 7);
        let inner = render_overlay_frame(frame, overlay_area, self.kind.title(), Color::Cyan);

        let rows = Layout::vertical([
            Constraint::Length(1), // pad
            Constraint::Length(1), // input
            Constraint::Length(1), // pad
            Constraint::Length(1), // hints
            Constraint::Min(0),
        ])
        .split(inner);

        let input_area = Rect {
            x: rows[1].x + 1,
            width: rows[1].width.saturating_sub(2),
            ..rows[1]
        };
        self.input
            .render(frame, input_area, true, input_style(true));

        let hints = hint_line(&[("Enter", self.kind.submit_label()), ("Esc", "Cancel")]);
        frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), rows[3]);
    }
}
