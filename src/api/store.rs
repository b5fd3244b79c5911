//! The persistence seam behind a record table.

use async_trait::async_trait;

use super::error::Result;
use crate::record::{Record, RecordId};

/// CRUD operations against one remote collection.
///
/// `CollectionClient` is the HTTP implementation; tests substitute an
/// in-memory store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record in the collection, in server order.
    async fn list(&self) -> Result<Vec<Record>>;

    /// Apply `patch` to the record `id` and return the full updated record.
    async fn update(&self, id: RecordId, patch: &Record) -> Result<Record>;

    /// Delete the record `id`.
    async fn remove(&self, id: RecordId) -> Result<()>;
}
