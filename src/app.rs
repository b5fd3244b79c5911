//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern for predictable
//! state management in the TUI application. Network work never happens in
//! here: the App queues `PendingRequest`s which the main loop runs in the
//! background, and the results come back through `handle_message`.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::events::{Event, KeyContext};
use crate::table::{LoadState, PendingWrite, TableError, DELETE_PROMPT};
use crate::tasks::{ApiMessage, ApiRequest, MountId, PendingRequest};
use crate::ui::{
    render_context_help, Applied, ConfirmAction, ConfirmDialog, EntityChoice, EntityPicker,
    EntityPickerAction, ErrorDialog, HelpAction, HelpView, NotificationManager, Spinner,
    TableAction, TableView,
};

/// The main application struct that holds all state.
///
/// This implements the Model part of The Elm Architecture (TEA).
pub struct App {
    /// Application configuration.
    config: Config,
    /// The mounted entity table, if any entity is configured.
    table: Option<TableView>,
    /// Source of mount ids; never reused.
    next_mount: u64,
    /// Requests waiting to be spawned by the main loop.
    pending: Vec<PendingRequest>,
    /// Whether the help panel is open.
    show_help: bool,
    help: HelpView,
    /// Notification manager for toast messages.
    notifications: NotificationManager,
    /// Error dialog for critical errors.
    error_dialog: ErrorDialog,
    /// Delete confirmation prompt.
    confirm_dialog: ConfirmDialog,
    /// Table switcher popup.
    entity_picker: EntityPicker,
    /// Status bar spinner.
    spinner: Spinner,
    /// Whether the application should quit.
    should_quit: bool,
}

impl App {
    /// Create the application and mount the default entity table.
    ///
    /// The initial list fetch is queued; call `take_pending` to run it.
    pub fn with_config(config: Config) -> Self {
        debug!("Creating application");

        let mut app = Self {
            config,
            table: None,
            next_mount: 0,
            pending: Vec::new(),
            show_help: false,
            help: HelpView::new(),
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            confirm_dialog: ConfirmDialog::new(),
            entity_picker: EntityPicker::new(),
            spinner: Spinner::new(),
            should_quit: false,
        };

        match app.config.default_entity().map(|e| e.name.clone()) {
            Some(name) => {
                if let Err(e) = app.switch_entity(&name) {
                    app.handle_error(&AppError::from(e));
                }
            }
            None => app
                .error_dialog
                .show_message("No tables", "No entities are configured."),
        }
        app
    }

    /// Tell users where the log files live, in help and error dialogs.
    pub fn with_log_directory(mut self, dir: &Path) -> Self {
        self.help.set_log_location(dir);
        self.error_dialog.set_log_location(dir);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mounted table view.
    pub fn table_view(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    /// The name of the mounted entity.
    pub fn current_entity(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.entity())
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn is_error_dialog_visible(&self) -> bool {
        self.error_dialog.is_visible()
    }

    pub fn is_confirm_visible(&self) -> bool {
        self.confirm_dialog.is_visible()
    }

    pub fn is_entity_picker_visible(&self) -> bool {
        self.entity_picker.is_visible()
    }

    /// Drain the requests queued since the last call.
    pub fn take_pending(&mut self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Tear down the current table and mount `name` in its place.
    ///
    /// Results still in flight for the old table are dropped when they
    /// arrive, since they carry the old mount id.
    pub fn switch_entity(&mut self, name: &str) -> Result<(), ConfigError> {
        let entity = self
            .config
            .entity(name)
            .ok_or_else(|| ConfigError::EntityNotFound(name.to_string()))?;

        if let Some(old) = &self.table {
            debug!(entity = old.entity(), mount = old.mount().0, "Unmounting table");
        }

        self.next_mount += 1;
        let mount = MountId(self.next_mount);
        let mut view = TableView::new(entity, mount);
        info!(entity = name, mount = mount.0, "Mounting table");

        match view.load() {
            Ok(request) => self.pending.push(PendingRequest {
                entity: name.to_string(),
                mount,
                request,
            }),
            Err(e) => warn!(error = %e, "Fresh table refused to load"),
        }
        self.table = Some(view);
        Ok(())
    }

    /// Handle an application error.
    ///
    /// Critical errors are shown in a modal dialog, table preconditions as
    /// warnings, and everything else as an error toast.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(error);
        } else if matches!(error, AppError::Table(_)) {
            debug!(error = %error, "Action refused");
            self.notifications.warning(error.user_message());
        } else {
            debug!(error = %error, "Recoverable error occurred");
            self.notifications.error(error.user_message());
        }
    }

    fn handle_table_error(&mut self, error: TableError) {
        self.handle_error(&AppError::from(error));
    }

    /// Apply the result of a background request.
    ///
    /// Results addressed to a table that is no longer mounted are dropped.
    pub fn handle_message(&mut self, message: ApiMessage) {
        let Some(view) = self.table.as_mut().filter(|v| v.mount() == message.mount()) else {
            debug!(mount = message.mount().0, "Dropping result for unmounted table");
            return;
        };

        match view.apply(message) {
            Ok(Applied::Loaded(count)) => debug!(count, "Table populated"),
            Ok(Applied::Saved(id)) => self.notifications.success(format!("Saved record {}", id)),
            Ok(Applied::Deleted(id)) => {
                self.notifications.success(format!("Deleted record {}", id))
            }
            Err(e) => self.handle_table_error(e),
        }
    }

    /// Update the application state based on an event.
    ///
    /// This implements the Update part of The Elm Architecture (TEA).
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        // Error dialog blocks all other input
        if self.error_dialog.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_dialog.dismiss();
            }
            return;
        }

        if self.confirm_dialog.is_visible() {
            if let Some(action) = self.confirm_dialog.handle_input(key) {
                self.answer_delete(action);
            }
            return;
        }

        if self.entity_picker.is_visible() {
            if let Some(EntityPickerAction::Select(name)) = self.entity_picker.handle_input(key) {
                if self.current_entity() != Some(name.as_str()) {
                    if let Err(e) = self.switch_entity(&name) {
                        self.handle_error(&AppError::from(e));
                    }
                }
            }
            return;
        }

        if self.show_help {
            if self.help.handle_input(key) == Some(HelpAction::Close) {
                self.show_help = false;
            }
            return;
        }

        // While editing, every key belongs to the row
        let editing = self.table.as_ref().is_some_and(|t| t.is_editing());
        if !editing {
            match (key.code, key.modifiers) {
                (KeyCode::Char('q'), KeyModifiers::NONE) => {
                    self.should_quit = true;
                    return;
                }
                (KeyCode::Char('?'), _) => {
                    self.help.reset_scroll();
                    self.show_help = true;
                    return;
                }
                (KeyCode::Char('t'), KeyModifiers::NONE) => {
                    self.open_entity_picker();
                    return;
                }
                _ => {}
            }
        }

        let Some(view) = self.table.as_mut() else {
            return;
        };
        match view.handle_input(key) {
            Ok(Some(action)) => self.dispatch(action),
            Ok(None) => {}
            Err(e) => self.handle_table_error(e),
        }
    }

    fn open_entity_picker(&mut self) {
        let choices = self
            .config
            .entities
            .iter()
            .map(|e| EntityChoice::new(e.name.clone(), e.title()))
            .collect();
        let current = self.current_entity().unwrap_or_default().to_string();
        self.entity_picker.show(choices, &current);
    }

    fn dispatch(&mut self, action: TableAction) {
        match action {
            TableAction::Send(request) => self.queue(request),
            TableAction::ConfirmDelete(id) => self.confirm_dialog.show(id, DELETE_PROMPT),
        }
    }

    fn answer_delete(&mut self, action: ConfirmAction) {
        let Some(view) = self.table.as_mut() else {
            return;
        };
        let (id, confirmed) = match action {
            ConfirmAction::Confirmed(id) => (id, true),
            ConfirmAction::Declined(id) => (id, false),
        };
        match view.delete(id, confirmed) {
            Ok(Some(request)) => self.queue(request),
            Ok(None) => {}
            Err(e) => self.handle_table_error(e),
        }
    }

    /// Address `request` to the mounted table.
    fn queue(&mut self, request: ApiRequest) {
        let Some(view) = self.table.as_ref() else {
            return;
        };
        self.pending.push(PendingRequest {
            entity: view.entity().to_string(),
            mount: view.mount(),
            request,
        });
    }

    fn handle_tick(&mut self) {
        self.notifications.tick();
        let working = self
            .table
            .as_ref()
            .is_some_and(|t| t.table().is_busy() || t.table().is_loading());
        self.spinner.set_active(working);
        self.spinner.tick();
    }

    /// The shortcut context for the help bar.
    pub fn key_context(&self) -> KeyContext {
        if self.confirm_dialog.is_visible() || self.error_dialog.is_visible() {
            KeyContext::Confirm
        } else if self.entity_picker.is_visible() {
            KeyContext::EntityPicker
        } else if self.show_help {
            KeyContext::Help
        } else {
            match &self.table {
                Some(t) if t.is_editing() && t.table().is_busy() => KeyContext::Busy,
                Some(t) if t.is_editing() => KeyContext::Editing,
                _ => KeyContext::Viewing,
            }
        }
    }

    /// Render the application UI.
    ///
    /// This implements the View part of The Elm Architecture (TEA).
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(1),    // Table
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        self.render_header(frame, chunks[0]);

        match self.table.as_mut() {
            Some(view) => view.render(frame, chunks[1]),
            None => frame.render_widget(
                Paragraph::new("No tables configured.").alignment(Alignment::Center),
                chunks[1],
            ),
        }

        self.render_status_bar(frame, chunks[2]);
        render_context_help(frame, chunks[3], self.key_context());

        if self.show_help {
            self.help.render(frame, area);
        }
        self.notifications.render(frame, area);
        self.entity_picker.render(frame, area);
        self.confirm_dialog.render(frame, area);
        self.error_dialog.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(format!("incubadmin  {}", self.config.settings.base_url))
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = &self.table else {
            return;
        };
        let table = view.table();

        let mut spans = vec![
            Span::styled(
                format!(" {} ", view.title()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ];

        let activity = match (table.load_state(), table.pending()) {
            (_, Some(PendingWrite::Save(_))) => Some("Saving..."),
            (_, Some(PendingWrite::Delete(_))) => Some("Deleting..."),
            (LoadState::Loading, None) => Some("Loading records..."),
            _ => None,
        };
        match activity {
            Some(message) => spans.push(Span::styled(
                self.spinner.label(message),
                Style::default().fg(Color::Cyan),
            )),
            None => spans.push(Span::styled(
                format!("{} records", table.records().len()),
                Style::default().fg(Color::DarkGray),
            )),
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::record::{Record, RecordId};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn rec(id: i64, name: &str) -> Record {
        Record::new().with("id", id).with("name", name)
    }

    /// An app with the default config whose first load has been answered.
    fn loaded_app(records: Vec<Record>) -> App {
        let mut app = App::with_config(Config::default());
        let pending = app.take_pending();
        assert_eq!(pending.len(), 1);
        app.handle_message(ApiMessage::RecordsLoaded {
            mount: pending[0].mount,
            result: Ok(records),
        });
        app
    }

    fn mount(app: &App) -> MountId {
        app.table_view().unwrap().mount()
    }

    #[test]
    fn test_with_config_queues_initial_load() {
        let mut app = App::with_config(Config::default());
        assert_eq!(app.current_entity(), Some("startups"));

        let pending = app.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity, "startups");
        assert_eq!(pending[0].request, ApiRequest::Load);
        assert!(app.take_pending().is_empty());
    }

    #[test]
    fn test_loaded_records_are_shown() {
        let app = loaded_app(vec![rec(1, "A"), rec(2, "B")]);
        let view = app.table_view().unwrap();
        assert_eq!(view.table().records().len(), 2);
        assert_eq!(view.table().load_state(), &LoadState::Loaded);
    }

    #[test]
    fn test_quit_on_q() {
        let mut app = loaded_app(Vec::new());
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_on_ctrl_c_while_editing() {
        let mut app = loaded_app(vec![rec(1, "A")]);
        app.update(key(KeyCode::Char('e')));
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_event() {
        let mut app = loaded_app(Vec::new());
        app.update(Event::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_q_is_text_while_editing() {
        let mut app = loaded_app(vec![rec(1, "")]);
        app.update(key(KeyCode::Char('e')));
        app.update(key(KeyCode::Char('q')));

        assert!(!app.should_quit());
        let view = app.table_view().unwrap();
        assert_eq!(view.table().edit_state().draft().unwrap().display("name"), "q");
        assert_eq!(app.key_context(), KeyContext::Editing);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = loaded_app(Vec::new());
        app.update(key(KeyCode::Char('?')));
        assert!(app.is_help_visible());
        assert_eq!(app.key_context(), KeyContext::Help);

        app.update(key(KeyCode::Char('q')));
        assert!(!app.is_help_visible());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_save_round_trip() {
        let mut app = loaded_app(vec![rec(7, "Old")]);
        app.update(key(KeyCode::Char('e')));
        app.update(key(KeyCode::Char('!')));
        app.update(key(KeyCode::Enter));

        let pending = app.take_pending();
        assert_eq!(pending.len(), 1);
        let ApiRequest::Save { id, patch } = &pending[0].request else {
            panic!("expected save, got {:?}", pending[0].request);
        };
        assert_eq!(*id, RecordId(7));
        assert_eq!(patch.display("name"), "Old!");
        assert_eq!(app.key_context(), KeyContext::Busy);

        app.handle_message(ApiMessage::RecordSaved {
            mount: pending[0].mount,
            id: *id,
            result: Ok(rec(7, "Old!")),
        });
        let view = app.table_view().unwrap();
        assert!(!view.is_editing());
        assert_eq!(view.table().records()[0].display("name"), "Old!");
        assert!(app.notifications().iter().any(|n| n.message == "Saved record 7"));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = loaded_app(vec![rec(1, "A"), rec(2, "B")]);
        app.update(key(KeyCode::Char('d')));
        assert!(app.is_confirm_visible());
        assert!(app.take_pending().is_empty());

        app.update(key(KeyCode::Char('n')));
        assert!(!app.is_confirm_visible());
        assert!(app.take_pending().is_empty());

        app.update(key(KeyCode::Char('d')));
        app.update(key(KeyCode::Char('y')));
        let pending = app.take_pending();
        assert_eq!(pending[0].request, ApiRequest::Delete { id: RecordId(1) });

        app.handle_message(ApiMessage::RecordDeleted {
            mount: pending[0].mount,
            id: RecordId(1),
            result: Ok(()),
        });
        assert_eq!(app.table_view().unwrap().table().records(), &[rec(2, "B")]);
    }

    #[test]
    fn test_switch_entity_drops_stale_results() {
        let mut app = loaded_app(vec![rec(1, "A")]);
        let old_mount = mount(&app);

        app.update(key(KeyCode::Char('t')));
        assert!(app.is_entity_picker_visible());
        app.update(key(KeyCode::Char('j')));
        app.update(key(KeyCode::Enter));

        assert_eq!(app.current_entity(), Some("users"));
        let new_mount = mount(&app);
        assert_ne!(old_mount, new_mount);
        let pending = app.take_pending();
        assert_eq!(pending[0].entity, "users");
        assert_eq!(pending[0].mount, new_mount);

        app.handle_message(ApiMessage::RecordsLoaded {
            mount: old_mount,
            result: Ok(vec![rec(9, "stale")]),
        });
        assert!(app.table_view().unwrap().table().records().is_empty());
    }

    #[test]
    fn test_switch_to_unknown_entity() {
        let mut app = loaded_app(Vec::new());
        let err = app.switch_entity("mentors").unwrap_err();
        assert!(matches!(err, ConfigError::EntityNotFound(_)));
        assert_eq!(app.current_entity(), Some("startups"));
    }

    #[test]
    fn test_unauthorized_load_opens_error_dialog() {
        let mut app = App::with_config(Config::default());
        let pending = app.take_pending();
        app.handle_message(ApiMessage::RecordsLoaded {
            mount: pending[0].mount,
            result: Err(ApiError::Unauthorized),
        });
        assert!(app.is_error_dialog_visible());

        // Dialog swallows keys until dismissed
        app.update(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        app.update(key(KeyCode::Enter));
        assert!(!app.is_error_dialog_visible());
    }

    #[test]
    fn test_save_failure_is_toasted() {
        let mut app = loaded_app(vec![rec(1, "A")]);
        app.update(key(KeyCode::Char('e')));
        app.update(key(KeyCode::Enter));
        let pending = app.take_pending();

        app.handle_message(ApiMessage::RecordSaved {
            mount: pending[0].mount,
            id: RecordId(1),
            result: Err(ApiError::Validation("bad email".to_string())),
        });
        assert!(!app.is_error_dialog_visible());
        assert!(app
            .notifications()
            .iter()
            .any(|n| n.message.contains("bad email")));
        assert!(app.table_view().unwrap().is_editing());
    }

    #[test]
    fn test_refused_action_is_a_warning() {
        let mut app = loaded_app(vec![rec(1, "A"), rec(2, "B")]);
        app.update(key(KeyCode::Char('d')));
        app.update(key(KeyCode::Char('y')));
        app.update(key(KeyCode::Char('e')));

        let warning = app.notifications().iter().last().unwrap();
        assert_eq!(warning.kind, crate::ui::NotificationKind::Warning);
    }

    #[test]
    fn test_log_directory_reaches_help_and_errors() {
        let app = App::with_config(Config::default())
            .with_log_directory(Path::new("/tmp/incubadmin/logs"));
        assert_eq!(app.help.log_location(), Some("/tmp/incubadmin/logs"));
        assert_eq!(app.error_dialog.log_location(), Some("/tmp/incubadmin/logs"));
    }

    #[test]
    fn test_tick_runs_spinner_while_loading() {
        let mut app = App::with_config(Config::default());
        app.update(Event::Tick);
        assert!(app.spinner.is_active());

        let pending = app.take_pending();
        app.handle_message(ApiMessage::RecordsLoaded {
            mount: pending[0].mount,
            result: Ok(Vec::new()),
        });
        app.update(Event::Tick);
        assert!(!app.spinner.is_active());
    }
}
