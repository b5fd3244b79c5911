//! Column descriptors and cell rendering.
//!
//! Rendering is a pure function of the column, the record, and the current
//! edit state: no hidden state is consulted.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edit::EditState;
use crate::record::{display_value, Record};

/// A custom cell renderer: `(value, record) -> display text`.
///
/// `value` is `Value::Null` when the field is absent.
pub type RenderFn = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// Built-in renderers selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    /// Plain string form.
    #[default]
    Text,
    /// Dates and timestamps as `DD Mon YYYY`.
    Date,
    /// Booleans as `yes`/`no`.
    Boolean,
}

impl CellFormat {
    /// The renderer for this format, or `None` for plain text.
    pub fn renderer(self) -> Option<RenderFn> {
        match self {
            CellFormat::Text => None,
            CellFormat::Date => Some(Arc::new(|value: &Value, _: &Record| format_date(value))),
            CellFormat::Boolean => {
                Some(Arc::new(|value: &Value, _: &Record| format_boolean(value)))
            }
        }
    }
}

/// Describes how one field of a record is labeled, displayed and edited.
#[derive(Clone)]
pub struct Column {
    /// The record field this column shows.
    pub field: String,
    /// Header text.
    pub label: String,
    /// Whether the cell becomes an input while its row is being edited.
    pub editable: bool,
    /// Optional custom renderer for display mode.
    pub render: Option<RenderFn>,
}

impl Column {
    /// Create an editable column without a custom renderer.
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            editable: true,
            render: None,
        }
    }

    /// Mark the column as read-only.
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Set the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Use a custom display renderer.
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Use a built-in format's renderer.
    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.render = format.renderer();
        self
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("editable", &self.editable)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// What a single table cell shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Read-only text.
    Display(String),
    /// An input bound to the draft value of the field.
    Input {
        /// The field the input edits.
        field: String,
        /// The current draft value.
        value: String,
    },
}

impl CellContent {
    /// The text shown in the cell.
    pub fn text(&self) -> &str {
        match self {
            CellContent::Display(text) => text,
            CellContent::Input { value, .. } => value,
        }
    }

    /// Whether the cell is an input.
    pub fn is_input(&self) -> bool {
        matches!(self, CellContent::Input { .. })
    }
}

/// Render one cell.
///
/// The cell is an input when `record` is the row being edited and the column
/// is editable; otherwise the column's renderer (or the plain string form)
/// is used.
pub fn render_cell(column: &Column, record: &Record, id_field: &str, edit: &EditState) -> CellContent {
    if column.editable {
        if let Some(draft) = record.id(id_field).and_then(|id| edit.draft_for(id)) {
            return CellContent::Input {
                field: column.field.clone(),
                value: draft.display(&column.field),
            };
        }
    }

    match &column.render {
        Some(render) => {
            let value = record.get(&column.field).unwrap_or(&Value::Null);
            CellContent::Display(render(value, record))
        }
        None => CellContent::Display(record.display(&column.field)),
    }
}

/// Format RFC 3339 timestamps and `YYYY-MM-DD` dates as `DD Mon YYYY`.
///
/// Anything else falls back to its plain string form.
pub fn format_date(value: &Value) -> String {
    let Value::String(raw) = value else {
        return display_value(value);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d %b %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d %b %Y").to_string();
    }
    raw.clone()
}

/// Format booleans as `yes`/`no`.
pub fn format_boolean(value: &Value) -> String {
    match value {
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        other => display_value(other),
    }
}
