//! Reusable UI components.

mod entity_picker;
mod help_bar;
mod input;
mod loading;
mod modal;
mod notification;

pub use entity_picker::{EntityChoice, EntityPicker, EntityPickerAction};
pub use help_bar::render_context_help;
pub use input::TextInput;
pub use loading::Spinner;
pub(crate) use modal::centered_rect;
pub use modal::{ConfirmAction, ConfirmDialog, ErrorDialog};
pub use notification::{Notification, NotificationKind, NotificationManager};
