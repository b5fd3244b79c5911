//! Modal dialogs: delete confirmation and critical error display.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;
use crate::record::RecordId;

/// Answer returned from the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// The user agreed to delete this record.
    Confirmed(RecordId),
    /// The user declined.
    Declined(RecordId),
}

/// A yes/no prompt attached to one record.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    message: String,
    target: Option<RecordId>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask `message` about the record `id`.
    pub fn show(&mut self, id: RecordId, message: impl Into<String>) {
        self.message = message.into();
        self.target = Some(id);
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The record the prompt is about.
    pub fn target(&self) -> Option<RecordId> {
        self.target
    }

    /// Handle keyboard input.
    ///
    /// `y` confirms, `n` and Esc decline. Other keys are swallowed.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        let id = self.target?;
        let action = match (key.code, key.modifiers) {
            (KeyCode::Char('y') | KeyCode::Char('Y'), _) => ConfirmAction::Confirmed(id),
            (KeyCode::Char('n') | KeyCode::Char('N'), _) | (KeyCode::Esc, KeyModifiers::NONE) => {
                ConfirmAction::Declined(id)
            }
            _ => return None,
        };
        self.target = None;
        Some(action)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.is_visible() {
            return;
        }

        let dialog_area = centered_rect(area, 40, 5);
        frame.render_widget(Clear, dialog_area);

        let text = vec![
            Line::from(Span::styled(
                self.message.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(Color::Cyan)),
                Span::styled(" yes  ", Style::default().fg(Color::DarkGray)),
                Span::styled("[n]", Style::default().fg(Color::Cyan)),
                Span::styled(" no", Style::default().fg(Color::DarkGray)),
            ]),
        ];

        let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(paragraph, dialog_area);
    }
}

/// A blocking dialog for errors that need acknowledgment.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    title: String,
    message: String,
    hint: Option<String>,
    log_location: Option<String>,
    visible: bool,
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an application error with its suggested action.
    pub fn show(&mut self, error: &AppError) {
        self.title = "Error".to_string();
        self.message = error.user_message();
        self.hint = error.suggested_action().map(str::to_string);
        self.visible = true;
    }

    /// Show a custom message.
    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.hint = None;
        self.visible = true;
    }

    /// Point users at the log files below every error.
    pub fn set_log_location(&mut self, dir: &Path) {
        self.log_location = Some(dir.display().to_string());
    }

    pub fn log_location(&self) -> Option<&str> {
        self.log_location.as_deref()
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let height = 7
            + if self.hint.is_some() { 2 } else { 0 }
            + if self.log_location.is_some() { 2 } else { 0 };
        let dialog_area = centered_rect(area, 60, height);
        frame.render_widget(Clear, dialog_area);

        let mut text = vec![Line::from(self.message.as_str()), Line::raw("")];
        if let Some(hint) = &self.hint {
            text.push(Line::styled(hint.as_str(), Style::default().fg(Color::Yellow)));
            text.push(Line::raw(""));
        }
        if let Some(dir) = &self.log_location {
            text.push(Line::styled(
                format!("Details are logged in {}", dir),
                Style::default().fg(Color::DarkGray),
            ));
            text.push(Line::raw(""));
        }
        text.push(Line::styled(
            "Press Enter or Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        ));

        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {} ", self.title),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(paragraph, dialog_area);
    }
}

/// Calculate a centered rectangle within the given area.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
