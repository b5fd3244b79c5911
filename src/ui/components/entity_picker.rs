//! Entity picker component.
//!
//! A popup listing the configured tables so the user can switch between
//! startups, users, and whatever else the config declares.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::modal::centered_rect;

/// Action returned from the entity picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPickerAction {
    /// Open the table with this entity name.
    Select(String),
    /// Close without switching.
    Cancel,
}

/// One line of the picker: the entity name and its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityChoice {
    pub name: String,
    pub title: String,
}

impl EntityChoice {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// Popup for choosing which table to show.
#[derive(Debug, Default)]
pub struct EntityPicker {
    choices: Vec<EntityChoice>,
    current: String,
    visible: bool,
    list_state: ListState,
}

impl EntityPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the picker with the cursor on the current entity.
    pub fn show(&mut self, choices: Vec<EntityChoice>, current: &str) {
        let selected = choices.iter().position(|c| c.name == current).unwrap_or(0);
        self.choices = choices;
        self.current = current.to_string();
        self.list_state.select(Some(selected));
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    /// The entity under the cursor.
    pub fn selected_entity(&self) -> Option<&str> {
        self.choices.get(self.selected()).map(|c| c.name.as_str())
    }

    fn move_by(&mut self, delta: isize) {
        if self.choices.is_empty() {
            return;
        }
        let last = self.choices.len() - 1;
        let next = self.selected().saturating_add_signed(delta).min(last);
        self.list_state.select(Some(next));
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<EntityPickerAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.move_by(1);
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.move_by(-1);
                None
            }
            (KeyCode::Enter, _) => {
                self.visible = false;
                self.selected_entity()
                    .map(|name| EntityPickerAction::Select(name.to_string()))
            }
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.visible = false;
                Some(EntityPickerAction::Cancel)
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let width = 40u16.min(area.width.saturating_sub(4));
        let height = (self.choices.len().min(10) as u16 + 3).min(area.height.saturating_sub(4));
        let dialog_area = centered_rect(area, width, height);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                " Tables ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let list_area = Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let hint_area = Rect {
            y: inner.y + list_area.height,
            height: 1,
            ..inner
        };

        let items: Vec<ListItem> = self
            .choices
            .iter()
            .map(|choice| {
                if choice.name == self.current {
                    ListItem::new(Span::styled(
                        format!("{} (open)", choice.title),
                        Style::default().fg(Color::Green),
                    ))
                } else {
                    ListItem::new(choice.title.clone())
                }
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let hint = Paragraph::new(Span::styled(
            "j/k:move  Enter:open  Esc:close",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(hint, hint_area);
    }
}
