//! The record table controller.
//!
//! Orchestrates loading, editing, saving and deleting, reconciling the local
//! record list with server responses. Every network operation is split into
//! a synchronous `begin_*` step that validates and records the in-flight
//! write, and a `finish_*` step that applies the server's answer. The async
//! convenience methods (`initialize`, `save_edit`, `delete_row`) run both
//! halves against a `RecordStore`; the TUI instead runs the request on a
//! background task and feeds the result back in.
//!
//! Records are only mutated after the server confirms a write.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::column::{render_cell, CellContent, Column};
use super::confirm::Confirm;
use super::edit::EditState;
use crate::api::{ApiError, RecordStore};
use crate::record::{Record, RecordId, DEFAULT_ID_FIELD};

/// Prompt shown before deleting a row.
pub const DELETE_PROMPT: &str = "Delete this item?";

/// Errors returned by table operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a row in edit mode.
    #[error("No row is being edited")]
    NotEditing,

    /// Another row is already in edit mode.
    #[error("Row {0} is already being edited")]
    AlreadyEditing(RecordId),

    /// A save or delete is still waiting for the server.
    #[error("Another change is still being saved")]
    Busy,

    /// No record with this identifier is loaded.
    #[error("Record {0} not found")]
    UnknownRecord(RecordId),

    /// The server returned a record without a usable identifier.
    #[error("Server response has no numeric '{0}' field")]
    MissingId(String),
}

impl TableError {
    /// Whether this error came from the remote collection.
    pub fn is_api(&self) -> bool {
        matches!(self, TableError::Api(_))
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// State of the initial (or refreshed) list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No fetch has been issued.
    #[default]
    NotLoaded,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Loaded,
    /// The last fetch failed with this message.
    Failed(String),
}

/// A write waiting for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    /// PATCH of the row being edited.
    Save(RecordId),
    /// DELETE of a row.
    Delete(RecordId),
}

/// A PATCH to send: the draft of the row being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// The identifier of the edited row.
    pub id: RecordId,
    /// The request body.
    pub patch: Record,
}

/// Binds a list of uniform records to an editable table.
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: Vec<Column>,
    id_field: String,
    records: Vec<Record>,
    edit: EditState,
    load: LoadState,
    pending: Option<PendingWrite>,
}

impl RecordTable {
    /// Create an empty table using `id` as the identifier field.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::with_id_field(columns, DEFAULT_ID_FIELD)
    }

    /// Create an empty table with a custom identifier field.
    pub fn with_id_field(columns: Vec<Column>, id_field: impl Into<String>) -> Self {
        Self {
            columns,
            id_field: id_field.into(),
            records: Vec::new(),
            edit: EditState::Viewing,
            load: LoadState::NotLoaded,
            pending: None,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The loaded records, in server order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// The write currently waiting for the server.
    pub fn pending(&self) -> Option<PendingWrite> {
        self.pending
    }

    /// Whether a save or delete is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a list fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    /// Refuse row operations while any request is outstanding.
    fn ensure_idle(&self) -> Result<()> {
        if self.is_busy() || self.is_loading() {
            Err(TableError::Busy)
        } else {
            Ok(())
        }
    }

    /// Look up a loaded record.
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.id(&self.id_field) == Some(id))
    }

    /// Render one cell of a loaded record.
    pub fn cell(&self, column: &Column, record: &Record) -> CellContent {
        render_cell(column, record, &self.id_field, &self.edit)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Mark a list fetch as started.
    ///
    /// Refused while a row is being edited or another request is in flight:
    /// replacing `records` would orphan the draft or the pending write, and
    /// two list responses could land out of order.
    pub fn begin_load(&mut self) -> Result<()> {
        self.ensure_idle()?;
        if let Some(id) = self.edit.editing_id() {
            return Err(TableError::AlreadyEditing(id));
        }
        self.load = LoadState::Loading;
        Ok(())
    }

    /// Apply the result of a list fetch.
    ///
    /// On success `records` is replaced by the server's list, in order. On
    /// failure `records` is left as it was and the error is returned.
    pub fn finish_load(
        &mut self,
        result: std::result::Result<Vec<Record>, ApiError>,
    ) -> Result<usize> {
        match result {
            Ok(records) => {
                let count = records.len();
                info!(count, "Records loaded");
                self.records = records;
                self.load = LoadState::Loaded;
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load records");
                self.load = LoadState::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Fetch the collection and populate `records`.
    pub async fn initialize<S: RecordStore + ?Sized>(&mut self, store: &S) -> Result<usize> {
        self.begin_load()?;
        let result = store.list().await;
        self.finish_load(result)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Put the row `id` into edit mode with a copy of the record as draft.
    pub fn start_edit(&mut self, id: RecordId) -> Result<()> {
        self.ensure_idle()?;
        if let Some(current) = self.edit.editing_id() {
            return Err(TableError::AlreadyEditing(current));
        }
        let record = self.record(id).cloned().ok_or(TableError::UnknownRecord(id))?;

        debug!(%id, "Start edit");
        self.edit = EditState::start(id, record);
        Ok(())
    }

    /// Overwrite one draft field with the raw input string.
    pub fn change_field(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        if self.is_busy() {
            return Err(TableError::Busy);
        }
        if self.edit.set_field(field, value) {
            Ok(())
        } else {
            Err(TableError::NotEditing)
        }
    }

    /// Leave edit mode, discarding the draft. Always succeeds.
    pub fn cancel_edit(&mut self) {
        if let Some(id) = self.edit.editing_id() {
            debug!(%id, "Cancel edit");
        }
        self.edit.cancel();
    }

    /// Prepare the PATCH for the row being edited.
    ///
    /// Returns `Ok(None)` when no row is being edited.
    pub fn begin_save(&mut self) -> Result<Option<SaveRequest>> {
        let (id, draft) = match &self.edit {
            EditState::Editing { id, draft, .. } => (*id, draft.clone()),
            EditState::Viewing => return Ok(None),
        };
        if self.pending.is_some() {
            return Err(TableError::Busy);
        }

        debug!(%id, "Saving row");
        self.pending = Some(PendingWrite::Save(id));
        Ok(Some(SaveRequest { id, patch: draft }))
    }

    /// Apply the server's answer to a PATCH of row `id`.
    ///
    /// On success the response's identifier is coerced to a number, the
    /// matching record is replaced, and the row leaves edit mode (if it is
    /// still the row being edited). On failure the row stays in edit mode with
    /// the error attached and `records` is untouched.
    pub fn finish_save(
        &mut self,
        id: RecordId,
        result: std::result::Result<Record, ApiError>,
    ) -> Result<()> {
        if self.pending == Some(PendingWrite::Save(id)) {
            self.pending = None;
        }
        let still_editing = self.edit.editing_id() == Some(id);

        let mut updated = match result {
            Ok(updated) => updated,
            Err(e) => {
                warn!(%id, error = %e, "Save failed");
                if still_editing {
                    self.edit.save_failed(e.to_string());
                }
                return Err(e.into());
            }
        };

        let Some(updated_id) = updated.coerce_id(&self.id_field) else {
            let err = TableError::MissingId(self.id_field.clone());
            warn!(%id, error = %err, "Save response rejected");
            if still_editing {
                self.edit.save_failed(err.to_string());
            }
            return Err(err);
        };

        let id_field = &self.id_field;
        if let Some(slot) = self
            .records
            .iter_mut()
            .find(|r| r.id(id_field) == Some(updated_id))
        {
            *slot = updated;
        } else {
            debug!(%updated_id, "Saved record is no longer loaded");
        }

        if still_editing {
            self.edit.cancel();
        }
        info!(%id, "Row saved");
        Ok(())
    }

    /// PATCH the draft and merge the server's record.
    ///
    /// A no-op when no row is being edited.
    pub async fn save_edit<S: RecordStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        let Some(request) = self.begin_save()? else {
            return Ok(());
        };
        let result = store.update(request.id, &request.patch).await;
        self.finish_save(request.id, result)
    }

    // ------------------------------------------------------------------
    // Deleting
    // ------------------------------------------------------------------

    /// Ask for confirmation and, if granted, record the pending DELETE.
    ///
    /// Returns `Ok(false)` when the user declines; nothing changes.
    pub fn begin_delete(&mut self, id: RecordId, confirm: &mut dyn Confirm) -> Result<bool> {
        self.ensure_idle()?;
        if self.record(id).is_none() {
            return Err(TableError::UnknownRecord(id));
        }
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%id, "Delete declined");
            return Ok(false);
        }

        self.pending = Some(PendingWrite::Delete(id));
        Ok(true)
    }

    /// Apply the server's answer to a DELETE of row `id`.
    pub fn finish_delete(&mut self, id: RecordId, result: std::result::Result<(), ApiError>) -> Result<()> {
        if self.pending == Some(PendingWrite::Delete(id)) {
            self.pending = None;
        }
        if let Err(e) = result {
            warn!(%id, error = %e, "Delete failed");
            return Err(e.into());
        }

        let id_field = &self.id_field;
        self.records.retain(|r| r.id(id_field) != Some(id));
        if self.edit.editing_id() == Some(id) {
            self.edit.cancel();
        }
        info!(%id, "Row deleted");
        Ok(())
    }

    /// Confirm, DELETE, and drop the row locally.
    ///
    /// Returns `Ok(false)` if the user declined.
    pub async fn delete_row<S: RecordStore + ?Sized>(
        &mut self,
        id: RecordId,
        confirm: &mut dyn Confirm,
        store: &S,
    ) -> Result<bool> {
        if !self.begin_delete(id, confirm)? {
            return Ok(false);
        }
        let result = store.remove(id).await;
        self.finish_delete(id, result)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::confirm::Answer;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory store with scripted responses.
    #[derive(Default)]
    struct FakeStore {
        list: Mutex<Option<std::result::Result<Vec<Record>, ApiError>>>,
        update: Mutex<Option<std::result::Result<Record, ApiError>>>,
        remove: Mutex<Option<std::result::Result<(), ApiError>>>,
        patches: Mutex<Vec<(RecordId, Record)>>,
        removed: Mutex<Vec<RecordId>>,
    }

    impl FakeStore {
        fn listing(records: Vec<Record>) -> Self {
            let store = Self::default();
            *store.list.lock().unwrap() = Some(Ok(records));
            store
        }

        fn respond_update(&self, result: std::result::Result<Record, ApiError>) {
            *self.update.lock().unwrap() = Some(result);
        }

        fn respond_remove(&self, result: std::result::Result<(), ApiError>) {
            *self.remove.lock().unwrap() = Some(result);
        }
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn list(&self) -> crate::api::error::Result<Vec<Record>> {
            self.list.lock().unwrap().take().unwrap_or(Ok(Vec::new()))
        }

        async fn update(&self, id: RecordId, patch: &Record) -> crate::api::error::Result<Record> {
            self.patches.lock().unwrap().push((id, patch.clone()));
            self.update
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(patch.clone()))
        }

        async fn remove(&self, id: RecordId) -> crate::api::error::Result<()> {
            self.removed.lock().unwrap().push(id);
            self.remove.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    fn rec(id: i64, name: &str) -> Record {
        Record::new().with("id", id).with("name", name)
    }

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name"), Column::new("id", "ID").read_only()]
    }

    async fn loaded(records: Vec<Record>) -> RecordTable {
        let mut table = RecordTable::new(columns());
        let store = FakeStore::listing(records);
        table.initialize(&store).await.unwrap();
        table
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_initialize_populates_records_in_order() {
        let table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        assert_eq!(table.records(), &[rec(1, "A"), rec(2, "B")]);
        assert_eq!(table.load_state(), &LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_initialize_failure_is_surfaced() {
        let mut table = RecordTable::new(columns());
        let store = FakeStore::default();
        *store.list.lock().unwrap() = Some(Err(server_error()));

        let err = table.initialize(&store).await.unwrap_err();
        assert!(err.is_api());
        assert!(table.records().is_empty());
        assert!(matches!(table.load_state(), LoadState::Failed(msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_start_edit_seeds_draft() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(2)).unwrap();
        assert_eq!(table.edit_state().editing_id(), Some(RecordId(2)));
        assert_eq!(table.edit_state().draft(), Some(&rec(2, "B")));
    }

    #[tokio::test]
    async fn test_start_edit_unknown_record() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        let err = table.start_edit(RecordId(9)).unwrap_err();
        assert!(matches!(err, TableError::UnknownRecord(RecordId(9))));
        assert!(!table.edit_state().is_editing());
    }

    #[tokio::test]
    async fn test_only_one_row_editable() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(1)).unwrap();
        let err = table.start_edit(RecordId(2)).unwrap_err();
        assert!(matches!(err, TableError::AlreadyEditing(RecordId(1))));
        assert_eq!(table.edit_state().editing_id(), Some(RecordId(1)));
    }

    #[tokio::test]
    async fn test_start_and_cancel_sequences_keep_single_edit() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B"), rec(3, "C")]).await;
        let ops = [1, 2, 0, 3, 0, 0, 2, 1, 0];
        for op in ops {
            if op == 0 {
                table.cancel_edit();
                assert!(!table.edit_state().is_editing());
            } else {
                let before = table.edit_state().editing_id();
                let result = table.start_edit(RecordId(op));
                match before {
                    None => assert!(result.is_ok()),
                    Some(_) => assert!(result.is_err()),
                }
            }
            let editing = table.edit_state().editing_id();
            assert!(editing.is_none() || table.record(editing.unwrap()).is_some());
        }
    }

    #[tokio::test]
    async fn test_change_field_requires_editing() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        let err = table.change_field("name", "Z").unwrap_err();
        assert!(matches!(err, TableError::NotEditing));
    }

    #[tokio::test]
    async fn test_change_field_updates_draft_only() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        table.start_edit(RecordId(1)).unwrap();
        table.change_field("name", "Z").unwrap();

        assert_eq!(table.edit_state().draft().unwrap().display("name"), "Z");
        assert_eq!(table.records()[0].display("name"), "A");
    }

    #[tokio::test]
    async fn test_cancel_edit_twice_equals_once() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        table.start_edit(RecordId(1)).unwrap();
        table.change_field("name", "Z").unwrap();

        table.cancel_edit();
        let once = table.edit_state().clone();
        table.cancel_edit();
        assert_eq!(table.edit_state(), &once);
        assert_eq!(table.edit_state(), &EditState::Viewing);
        assert_eq!(table.records(), &[rec(1, "A")]);
    }

    #[tokio::test]
    async fn test_save_coerces_string_id_and_replaces_record() {
        let mut table = loaded(vec![rec(3, "C"), rec(7, "Old")]).await;
        let store = FakeStore::default();
        store.respond_update(Ok(
            serde_json::from_value(json!({"id": "7", "name": "X"})).unwrap()
        ));

        table.start_edit(RecordId(7)).unwrap();
        table.change_field("name", "X").unwrap();
        table.save_edit(&store).await.unwrap();

        let saved = table.record(RecordId(7)).unwrap();
        assert_eq!(saved.display("name"), "X");
        assert_eq!(saved.get("id"), Some(&json!(7)));
        assert_eq!(table.records()[0], rec(3, "C"));
        assert_eq!(table.edit_state(), &EditState::Viewing);
        assert!(!table.is_busy());
    }

    #[tokio::test]
    async fn test_save_sends_draft_as_patch() {
        let mut table = loaded(vec![rec(7, "Old")]).await;
        let store = FakeStore::default();

        table.start_edit(RecordId(7)).unwrap();
        table.change_field("name", "New").unwrap();
        table.save_edit(&store).await.unwrap();

        let patches = store.patches.lock().unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].0, RecordId(7));
        assert_eq!(patches[0].1.display("name"), "New");
    }

    #[tokio::test]
    async fn test_save_without_edit_is_noop() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        let store = FakeStore::default();
        table.save_edit(&store).await.unwrap();
        assert!(store.patches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_stays_editing_with_error() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        let store = FakeStore::default();
        store.respond_update(Err(ApiError::Validation("name too short".to_string())));

        table.start_edit(RecordId(1)).unwrap();
        table.change_field("name", "Z").unwrap();
        let err = table.save_edit(&store).await.unwrap_err();

        assert!(err.is_api());
        assert_eq!(table.edit_state().editing_id(), Some(RecordId(1)));
        assert_eq!(table.edit_state().draft().unwrap().display("name"), "Z");
        assert!(table.edit_state().error().unwrap().contains("name too short"));
        assert_eq!(table.records(), &[rec(1, "A")]);
        assert!(!table.is_busy());
    }

    #[tokio::test]
    async fn test_save_response_without_id_is_rejected() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        let store = FakeStore::default();
        store.respond_update(Ok(Record::new().with("name", "Z")));

        table.start_edit(RecordId(1)).unwrap();
        let err = table.save_edit(&store).await.unwrap_err();

        assert!(matches!(err, TableError::MissingId(_)));
        assert!(table.edit_state().is_editing());
        assert_eq!(table.records(), &[rec(1, "A")]);
    }

    #[tokio::test]
    async fn test_in_flight_save_blocks_edits_and_deletes() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(1)).unwrap();
        let request = table.begin_save().unwrap().unwrap();
        assert_eq!(table.pending(), Some(PendingWrite::Save(RecordId(1))));

        assert!(matches!(table.change_field("name", "Q"), Err(TableError::Busy)));
        assert!(matches!(table.begin_save(), Err(TableError::Busy)));
        assert!(matches!(
            table.begin_delete(RecordId(2), &mut Answer(true)),
            Err(TableError::Busy)
        ));

        table.cancel_edit();
        assert!(matches!(table.start_edit(RecordId(2)), Err(TableError::Busy)));

        table
            .finish_save(request.id, Ok(rec(1, "Saved")))
            .unwrap();
        assert!(!table.is_busy());
        assert_eq!(table.records()[0].display("name"), "Saved");
        assert_eq!(table.edit_state(), &EditState::Viewing);
        table.start_edit(RecordId(2)).unwrap();
    }

    #[tokio::test]
    async fn test_save_response_after_cancel_keeps_viewing() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        table.start_edit(RecordId(1)).unwrap();
        let request = table.begin_save().unwrap().unwrap();
        table.cancel_edit();

        table
            .finish_save(request.id, Err(server_error()))
            .unwrap_err();
        assert_eq!(table.edit_state(), &EditState::Viewing);
    }

    #[tokio::test]
    async fn test_delete_declined_leaves_records() {
        let mut table = loaded(vec![rec(1, "A"), rec(3, "C")]).await;
        let store = FakeStore::default();

        let deleted = table
            .delete_row(RecordId(3), &mut Answer(false), &store)
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(table.records(), &[rec(1, "A"), rec(3, "C")]);
        assert!(store.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_confirmed_removes_record() {
        let mut table = loaded(vec![rec(1, "A"), rec(3, "C")]).await;
        let store = FakeStore::default();
        let mut prompts = Vec::new();
        let mut confirm = |msg: &str| {
            prompts.push(msg.to_string());
            true
        };

        let deleted = table
            .delete_row(RecordId(3), &mut confirm, &store)
            .await
            .unwrap();

        assert!(deleted);
        assert!(table.record(RecordId(3)).is_none());
        assert_eq!(table.records(), &[rec(1, "A")]);
        assert_eq!(prompts, vec![DELETE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_records() {
        let mut table = loaded(vec![rec(3, "C")]).await;
        let store = FakeStore::default();
        store.respond_remove(Err(ApiError::Forbidden));

        let err = table
            .delete_row(RecordId(3), &mut Answer(true), &store)
            .await
            .unwrap_err();

        assert!(err.is_api());
        assert_eq!(table.records(), &[rec(3, "C")]);
        assert!(!table.is_busy());
    }

    #[tokio::test]
    async fn test_delete_of_edited_row_ends_edit() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(2)).unwrap();
        assert!(table.begin_delete(RecordId(2), &mut Answer(true)).unwrap());
        table.finish_delete(RecordId(2), Ok(())).unwrap();

        assert_eq!(table.edit_state(), &EditState::Viewing);
        assert_eq!(table.records(), &[rec(1, "A")]);
    }

    #[tokio::test]
    async fn test_custom_id_field() {
        let mut table = RecordTable::with_id_field(columns(), "startup_id");
        let store = FakeStore::listing(vec![Record::new().with("startup_id", 5).with("name", "S")]);
        table.initialize(&store).await.unwrap();

        table.start_edit(RecordId(5)).unwrap();
        assert_eq!(table.edit_state().editing_id(), Some(RecordId(5)));
    }

    #[tokio::test]
    async fn test_reload_refused_while_editing() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        table.start_edit(RecordId(1)).unwrap();
        assert!(matches!(table.begin_load(), Err(TableError::AlreadyEditing(_))));
    }

    #[tokio::test]
    async fn test_reload_in_flight_blocks_row_operations() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.begin_load().unwrap();
        assert!(table.is_loading());

        assert!(matches!(table.start_edit(RecordId(2)), Err(TableError::Busy)));
        assert!(matches!(table.begin_load(), Err(TableError::Busy)));
        assert!(matches!(
            table.begin_delete(RecordId(2), &mut Answer(true)),
            Err(TableError::Busy)
        ));

        table.finish_load(Ok(vec![rec(1, "A")])).unwrap();
        assert_eq!(table.edit_state(), &EditState::Viewing);
        assert!(matches!(table.start_edit(RecordId(2)), Err(TableError::UnknownRecord(_))));
        table.start_edit(RecordId(1)).unwrap();
    }

    #[tokio::test]
    async fn test_failed_reload_allows_retry() {
        let mut table = loaded(vec![rec(1, "A")]).await;
        table.begin_load().unwrap();
        table.finish_load(Err(server_error())).unwrap_err();
        assert!(!table.is_loading());
        table.begin_load().unwrap();
    }

    #[tokio::test]
    async fn test_in_flight_delete_blocks_typing() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(1)).unwrap();
        assert!(table.begin_delete(RecordId(2), &mut Answer(true)).unwrap());

        assert!(matches!(table.change_field("name", "Z"), Err(TableError::Busy)));
        assert_eq!(table.edit_state().draft().unwrap().display("name"), "A");

        table.finish_delete(RecordId(2), Ok(())).unwrap();
        table.change_field("name", "Z").unwrap();
    }

    #[tokio::test]
    async fn test_cell_rendering_follows_edit_state() {
        let mut table = loaded(vec![rec(1, "A"), rec(2, "B")]).await;
        table.start_edit(RecordId(1)).unwrap();
        table.change_field("name", "AA").unwrap();

        let name_col = table.columns()[0].clone();
        let id_col = table.columns()[1].clone();
        let first = table.records()[0].clone();
        let second = table.records()[1].clone();

        assert!(table.cell(&name_col, &first).is_input());
        assert_eq!(table.cell(&name_col, &first).text(), "AA");
        assert!(!table.cell(&id_col, &first).is_input());
        assert!(!table.cell(&name_col, &second).is_input());
    }
}
