//! The record table view.
//!
//! Wraps a `RecordTable` with row selection, field focus and the text input
//! bound to the focused cell. Key presses become `TableAction`s; network
//! requests are handed back to the App, which runs them in the background
//! and feeds the answers in through `apply`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::debug;

use crate::config::EntityConfig;
use crate::record::RecordId;
use crate::table::{Answer, CellContent, LoadState, PendingWrite, RecordTable, TableError};
use crate::tasks::{ApiMessage, ApiRequest, MountId};
use crate::ui::components::TextInput;

/// Width of the trailing actions column.
const ACTIONS_WIDTH: u16 = 22;

/// What the App should do after a key press in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// Run this request against the entity's store.
    Send(ApiRequest),
    /// Ask the user before deleting this record.
    ConfirmDelete(RecordId),
}

/// The outcome of applying a server answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Loaded(usize),
    Saved(RecordId),
    Deleted(RecordId),
}

/// An editable table of one entity's records.
#[derive(Debug)]
pub struct TableView {
    entity: String,
    title: String,
    mount: MountId,
    table: RecordTable,
    state: TableState,
    /// Index into `columns()` of the focused input while editing.
    focus: Option<usize>,
    input: TextInput,
}

impl TableView {
    /// Mount a fresh, empty table for `entity`.
    pub fn new(entity: &EntityConfig, mount: MountId) -> Self {
        Self {
            entity: entity.name.clone(),
            title: entity.title().to_string(),
            mount,
            table: RecordTable::with_id_field(entity.columns(), entity.id_field.clone()),
            state: TableState::default(),
            focus: None,
            input: TextInput::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mount(&self) -> MountId {
        self.mount
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    /// Whether keys should go to the row being edited.
    pub fn is_editing(&self) -> bool {
        self.table.edit_state().is_editing()
    }

    /// The selected row index.
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// The id of the selected record.
    pub fn selected_id(&self) -> Option<RecordId> {
        let index = self.state.selected()?;
        self.table.records().get(index)?.id(self.table.id_field())
    }

    /// The field of the focused input while editing.
    pub fn focused_field(&self) -> Option<&str> {
        self.focus
            .and_then(|i| self.table.columns().get(i))
            .map(|c| c.field.as_str())
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    /// Start a list fetch.
    pub fn load(&mut self) -> Result<ApiRequest, TableError> {
        self.table.begin_load()?;
        Ok(ApiRequest::Load)
    }

    /// Handle a key press.
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<TableAction>, TableError> {
        if self.is_editing() {
            self.handle_edit_input(key)
        } else {
            self.handle_view_input(key)
        }
    }

    fn handle_view_input(&mut self, key: KeyEvent) -> Result<Option<TableAction>, TableError> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.move_selection(1);
                Ok(None)
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.move_selection(-1);
                Ok(None)
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.select_index(0);
                Ok(None)
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.select_index(self.table.records().len().saturating_sub(1));
                Ok(None)
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
                let Some(id) = self.selected_id() else {
                    return Ok(None);
                };
                self.table.start_edit(id)?;
                self.focus = self.editable_columns().first().copied();
                self.sync_input();
                Ok(None)
            }
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
                let Some(id) = self.selected_id() else {
                    return Ok(None);
                };
                if self.table.is_busy() || self.table.is_loading() {
                    return Err(TableError::Busy);
                }
                Ok(Some(TableAction::ConfirmDelete(id)))
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => self.load().map(|r| Some(TableAction::Send(r))),
            _ => Ok(None),
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) -> Result<Option<TableAction>, TableError> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.table.cancel_edit();
                self.focus = None;
                self.input = TextInput::new();
                Ok(None)
            }
            (KeyCode::Enter, _) => match self.table.begin_save()? {
                Some(request) => Ok(Some(TableAction::Send(ApiRequest::Save {
                    id: request.id,
                    patch: request.patch,
                }))),
                None => Ok(None),
            },
            (KeyCode::Tab, _) => {
                self.move_focus(1);
                Ok(None)
            }
            (KeyCode::BackTab, _) => {
                self.move_focus(-1);
                Ok(None)
            }
            _ => {
                if self.table.is_busy() {
                    return Err(TableError::Busy);
                }
                let Some(field) = self.focused_field().map(str::to_string) else {
                    return Ok(None);
                };
                if self.input.handle_input(key) {
                    self.table.change_field(&field, self.input.value())?;
                }
                Ok(None)
            }
        }
    }

    /// Apply the user's answer to the delete prompt.
    pub fn delete(&mut self, id: RecordId, confirmed: bool) -> Result<Option<ApiRequest>, TableError> {
        if self.table.begin_delete(id, &mut Answer(confirmed))? {
            Ok(Some(ApiRequest::Delete { id }))
        } else {
            Ok(None)
        }
    }

    /// Apply a server answer addressed to this table.
    pub fn apply(&mut self, message: ApiMessage) -> Result<Applied, TableError> {
        let applied = match message {
            ApiMessage::RecordsLoaded { result, .. } => {
                let count = self.table.finish_load(result)?;
                Applied::Loaded(count)
            }
            ApiMessage::RecordSaved { id, result, .. } => {
                self.table.finish_save(id, result)?;
                Applied::Saved(id)
            }
            ApiMessage::RecordDeleted { id, result, .. } => {
                self.table.finish_delete(id, result)?;
                Applied::Deleted(id)
            }
        };
        if !self.is_editing() {
            self.focus = None;
        }
        self.clamp_selection();
        Ok(applied)
    }

    fn editable_columns(&self) -> Vec<usize> {
        self.table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.editable)
            .map(|(i, _)| i)
            .collect()
    }

    /// Load the focused field's draft value into the input.
    fn sync_input(&mut self) {
        let value = match (self.focused_field(), self.table.edit_state().draft()) {
            (Some(field), Some(draft)) => draft.display(field),
            _ => String::new(),
        };
        self.input = TextInput::with_value(value);
    }

    fn move_focus(&mut self, delta: isize) {
        let editable = self.editable_columns();
        if editable.is_empty() {
            return;
        }
        let current = self
            .focus
            .and_then(|f| editable.iter().position(|&i| i == f))
            .unwrap_or(0);
        let len = editable.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        self.focus = Some(editable[next]);
        debug!(field = ?self.focused_field(), "Focus moved");
        self.sync_input();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.table.records().len();
        if len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        self.select_index(current.saturating_add_signed(delta).min(len - 1));
    }

    fn select_index(&mut self, index: usize) {
        if self.table.records().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(index.min(self.table.records().len() - 1)));
        }
    }

    fn clamp_selection(&mut self) {
        let index = self.state.selected().unwrap_or(0);
        self.select_index(index);
    }

    /// Render the table into `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ({}) ", self.title, self.table.records().len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.table.records().is_empty() {
            self.render_placeholder(frame, inner);
            return;
        }

        let error = self.table.edit_state().error().map(str::to_string);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(if error.is_some() { 1 } else { 0 }),
            ])
            .split(inner);

        let table = self.build_table();
        frame.render_stateful_widget(table, chunks[0], &mut self.state);

        if let Some(error) = error {
            let line = Paragraph::new(Span::styled(
                format!("✗ {}", error),
                Style::default().fg(Color::Red),
            ));
            frame.render_widget(line, chunks[1]);
        }
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let line = match self.table.load_state() {
            LoadState::NotLoaded | LoadState::Loading => {
                Line::styled("Loading records...", Style::default().fg(Color::DarkGray))
            }
            LoadState::Failed(msg) => Line::styled(
                format!("Failed to load records: {}  (press r to retry)", msg),
                Style::default().fg(Color::Red),
            ),
            LoadState::Loaded => {
                Line::styled("No records.", Style::default().fg(Color::DarkGray))
            }
        };
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn build_table(&self) -> Table<'static> {
        let columns = self.table.columns();
        let id_field = self.table.id_field();
        let editing = self.table.edit_state().editing_id();
        let focused = self.focused_field();

        let header = Row::new(
            columns
                .iter()
                .map(|c| Cell::from(c.label.clone()))
                .chain(std::iter::once(Cell::from("Actions"))),
        )
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .table
            .records()
            .iter()
            .map(|record| {
                let is_edited_row = editing.is_some() && record.id(id_field) == editing;
                let mut cells: Vec<Cell> = columns
                    .iter()
                    .map(|column| match self.table.cell(column, record) {
                        CellContent::Display(text) => Cell::from(text),
                        CellContent::Input { field, value } => {
                            if focused == Some(field.as_str()) {
                                Cell::from(self.input_line())
                            } else {
                                Cell::from(value).style(Style::default().fg(Color::Yellow))
                            }
                        }
                    })
                    .collect();
                cells.push(self.actions_cell(is_edited_row));
                Row::new(cells)
            })
            .collect();

        let widths: Vec<Constraint> = columns
            .iter()
            .map(|_| Constraint::Fill(1))
            .chain(std::iter::once(Constraint::Length(ACTIONS_WIDTH)))
            .collect();

        Table::new(rows, widths)
            .header(header)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ")
    }

    /// The focused input with a block cursor.
    fn input_line(&self) -> Line<'static> {
        let value: Vec<char> = self.input.value().chars().collect();
        let cursor = self.input.cursor().min(value.len());
        let before: String = value[..cursor].iter().collect();
        let at: String = value.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
        let after: String = value.get(cursor + 1..).map(|s| s.iter().collect()).unwrap_or_default();

        let style = Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED);
        Line::from(vec![
            Span::styled(before, style),
            Span::styled(at, style.add_modifier(Modifier::REVERSED)),
            Span::styled(after, style),
        ])
    }

    fn actions_cell(&self, is_edited_row: bool) -> Cell<'static> {
        let text = match (is_edited_row, self.table.pending()) {
            (true, Some(PendingWrite::Save(_))) => "Saving...",
            (true, _) => "[Enter] save [Esc] cancel",
            (false, _) => "[e] edit [d] delete",
        };
        Cell::from(text).style(Style::default().fg(Color::DarkGray))
    }
}
