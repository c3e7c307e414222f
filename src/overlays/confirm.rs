use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};

use super::util::{centered_rect, hint_line, render_overlay_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Consumed,
    Yes,
    No,
}

pub struct ConfirmOverlay {
    message: String,
}

impl ConfirmOverlay {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ConfirmAction {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => ConfirmAction::Yes,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => ConfirmAction::No,
            _ => ConfirmAction::Consumed,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let overlay_area = centered_rect(frame.area(), 36, 7);
        let inner = render_overlay_frame(frame, overlay_area, " Confirm ", Color::Yellow);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.message.as_str(),
                Style::default().fg(Color::White),
            ))
            .alignment(Alignment::Center),
            rows[1],
        );
        frame.render_widget(
            Paragraph::new(hint_line(&[("y", "Yes"), ("n", "No")])).alignment(Alignment::Center),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    #[test]
    fn answers() {
        let mut confirm = ConfirmOverlay::new("Clear all tasks?");
        let key = |c| KeyEvent::new(c, KeyModifiers::NONE);
        assert_eq!(confirm.handle_key(key(KeyCode::Char('y'))), ConfirmAction::Yes);
        assert_eq!(confirm.handle_key(key(KeyCode::Esc)), ConfirmAction::No);
        assert_eq!(
            confirm.handle_key(key(KeyCode::Char('q'))),
            ConfirmAction::Consumed
        );
    }
}
