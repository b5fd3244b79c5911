//! User interface components and views.
//!
//! This module contains all TUI rendering logic: the record table view, the
//! help screen, and the popups layered over them.

mod components;
mod views;

pub use components::{
    render_context_help, ConfirmAction, ConfirmDialog, EntityChoice, EntityPicker,
    EntityPickerAction, ErrorDialog, Notification, NotificationKind, NotificationManager, Spinner,
    TextInput,
};
pub use views::{Applied, HelpAction, HelpView, TableAction, TableView};
