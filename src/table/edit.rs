//! Row edit state machine.
//!
//! At most one row is editable at a time. The state is a sum type, so the
//! draft cannot outlive the edit it belongs to.

use crate::record::{Record, RecordId};

/// The edit state of a record table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    /// No row is editable.
    #[default]
    Viewing,
    /// One row is being edited.
    Editing {
        /// The identifier of the row being edited.
        id: RecordId,
        /// In-progress field values, seeded from the record.
        draft: Record,
        /// Message from the last failed save, if any.
        error: Option<String>,
    },
}

impl EditState {
    /// Begin editing `id` with a draft copied from the record.
    pub fn start(id: RecordId, record: Record) -> Self {
        EditState::Editing {
            id,
            draft: record,
            error: None,
        }
    }

    /// Whether a row is being edited.
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing { .. })
    }

    /// The identifier of the row being edited.
    pub fn editing_id(&self) -> Option<RecordId> {
        match self {
            EditState::Editing { id, .. } => Some(*id),
            EditState::Viewing => None,
        }
    }

    /// The draft, if editing.
    pub fn draft(&self) -> Option<&Record> {
        match self {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// The draft if `id` is the row being edited.
    pub fn draft_for(&self, id: RecordId) -> Option<&Record> {
        match self {
            EditState::Editing { id: editing, draft, .. } if *editing == id => Some(draft),
            _ => None,
        }
    }

    /// The error attached by the last failed save.
    pub fn error(&self) -> Option<&str> {
        match self {
            EditState::Editing { error, .. } => error.as_deref(),
            EditState::Viewing => None,
        }
    }

    /// Overwrite one draft field with the raw input string.
    ///
    /// Returns `false` (and changes nothing) when not editing.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self {
            EditState::Editing { draft, .. } => {
                draft.set(field, value.into());
                true
            }
            EditState::Viewing => false,
        }
    }

    /// Attach a save failure. The row stays in edit mode with its draft intact.
    pub fn save_failed(&mut self, message: impl Into<String>) {
        if let EditState::Editing { error, .. } = self {
            *error = Some(message.into());
        }
    }

    /// Return to `Viewing`, discarding any draft.
    pub fn cancel(&mut self) {
        *self = EditState::Viewing;
    }
}
