//! Generic record table.
//!
//! Binds an ordered list of uniform records to an editable table and
//! delegates persistence to a `RecordStore`. Nothing in here depends on the
//! terminal UI.

mod column;
mod confirm;
mod controller;
mod edit;

pub use column::{format_boolean, format_date, render_cell, CellContent, CellFormat, Column, RenderFn};
pub use confirm::{Answer, Confirm};
pub use controller::{
    LoadState, PendingWrite, RecordTable, Result, SaveRequest, TableError, DELETE_PROMPT,
};
pub use edit::EditState;
