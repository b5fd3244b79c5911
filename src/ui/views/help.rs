//! Help panel listing every keyboard shortcut.
//!
//! Opened with '?' and closed with '?', 'q', or Escape.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::components::centered_rect;

/// Shortcut sections: (heading, [(keys, description)]).
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Browsing",
        &[
            ("j / Down", "Next row"),
            ("k / Up", "Previous row"),
            ("g / G", "First / last row"),
            ("e / Enter", "Edit the selected row"),
            ("d / Delete", "Delete the selected row"),
            ("r", "Reload from the server"),
            ("t", "Switch table"),
            ("?", "Toggle this help"),
            ("q / Ctrl+C", "Quit"),
        ],
    ),
    (
        "Editing",
        &[
            ("Tab / Shift+Tab", "Next / previous field"),
            ("Left / Right", "Move the cursor"),
            ("Ctrl+A / Ctrl+E", "Start / end of field"),
            ("Ctrl+U", "Clear the field"),
            ("Enter", "Save the row"),
            ("Esc", "Discard changes"),
        ],
    ),
    (
        "Dialogs",
        &[("y", "Confirm"), ("n / Esc", "Decline"), ("Enter / Esc", "Dismiss error")],
    ),
];

/// Actions returned from the help view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

/// The help panel.
#[derive(Debug, Default)]
pub struct HelpView {
    scroll: u16,
    visible_height: u16,
    log_location: Option<String>,
}

impl HelpView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show where the log files are at the bottom of the panel.
    pub fn set_log_location(&mut self, dir: &Path) {
        self.log_location = Some(dir.display().to_string());
    }

    pub fn log_location(&self) -> Option<&str> {
        self.log_location.as_deref()
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn total_lines(&self) -> u16 {
        self.lines().len() as u16
    }

    fn max_scroll(&self) -> u16 {
        self.total_lines().saturating_sub(self.visible_height)
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<HelpAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('?'), _) | (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => {
                Some(HelpAction::Close)
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) => {
                self.scroll = 0;
                None
            }
            _ => None,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (heading, bindings) in SECTIONS {
            lines.push(Line::styled(
                *heading,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            for (keys, description) in *bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<18}", keys), Style::default().fg(Color::Cyan)),
                    Span::raw(*description),
                ]));
            }
            lines.push(Line::raw(""));
        }
        if let Some(dir) = &self.log_location {
            lines.push(Line::styled(
                "Logs",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::styled(format!("  {}", dir), Style::default().fg(Color::DarkGray)));
        }
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dialog_area = centered_rect(area, 56, self.total_lines() + 2);
        self.visible_height = dialog_area.height.saturating_sub(2);
        self.scroll = self.scroll.min(self.max_scroll());

        frame.render_widget(Clear, dialog_area);
        let paragraph = Paragraph::new(self.lines())
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(paragraph, dialog_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_close_keys() {
        let mut help = HelpView::new();
        for code in [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('?')] {
            assert_eq!(help.handle_input(key(code)), Some(HelpAction::Close));
        }
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut help = HelpView::new();
        help.visible_height = 5;
        for _ in 0..100 {
            help.handle_input(key(KeyCode::Char('j')));
        }
        assert_eq!(help.scroll(), help.total_lines() - 5);

        help.handle_input(key(KeyCode::Char('g')));
        assert_eq!(help.scroll(), 0);
        help.handle_input(key(KeyCode::Up));
        assert_eq!(help.scroll(), 0);
    }

    #[test]
    fn test_no_scroll_when_everything_fits() {
        let mut help = HelpView::new();
        help.visible_height = 200;
        help.handle_input(key(KeyCode::Down));
        assert_eq!(help.scroll(), 0);
    }

    #[test]
    fn test_lines_cover_every_binding() {
        let bindings: usize = SECTIONS.iter().map(|(_, b)| b.len()).sum();
        assert_eq!(HelpView::new().lines().len(), bindings + SECTIONS.len() * 2);
    }

    #[test]
    fn test_log_location_is_listed() {
        let mut help = HelpView::new();
        let without = help.total_lines();
        help.set_log_location(Path::new("/tmp/incubadmin/logs"));

        assert_eq!(help.total_lines(), without + 2);
        let last = help.lines().pop().unwrap();
        assert!(last.to_string().contains("/tmp/incubadmin/logs"));
    }
}
