//! incubadmin - terminal administration for the startup incubator platform.
//!
//! The `table` module is the UI-independent core: a record table bound to a
//! REST collection through the `RecordStore` trait. Everything else wires it
//! to a ratatui front end.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod record;
pub mod table;
pub mod tasks;
pub mod ui;

pub use app::App;
pub use record::{Record, RecordId};
pub use table::{Column, RecordTable, TableError};
