//! The backend seam: one connection-like session per unit of work

use async_trait::async_trait;

use super::query::Query;
use super::record::Record;
use super::schema::Table;
use crate::errors::StoreError;

/// Fills a foreign-key column from the id assigned to an earlier insert
/// in the same batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub index: usize,
    pub column: &'static str,
}

/// A staged write
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert {
        record: Record,
        parent: Option<ParentLink>,
    },
    /// Full replacement of the row with the record's id
    Update { record: Record },
    Delete { table: Table, id: i64 },
}

impl Change {
    pub fn table(&self) -> Table {
        match self {
            Change::Insert { record, .. } | Change::Update { record } => record.table,
            Change::Delete { table, .. } => *table,
        }
    }

    /// Id assigned to an applied insert
    pub fn inserted_id(&self) -> Option<i64> {
        match self {
            Change::Insert { record, .. } => record.id,
            _ => None,
        }
    }
}

/// Resolve parent links in place once the parent at `index` has an id
pub fn link_parent(changes: &mut [Change], position: usize) -> Result<(), StoreError> {
    let link = match &changes[position] {
        Change::Insert {
            parent: Some(link), ..
        } => *link,
        _ => return Ok(()),
    };
    let parent_id = changes
        .get(link.index)
        .filter(|_| link.index < position)
        .and_then(Change::inserted_id)
        .ok_or_else(|| StoreError::backend("parent insert has no assigned id"))?;
    if let Change::Insert { record, .. } = &mut changes[position] {
        record.set(link.column, parent_id);
    }
    Ok(())
}

/// A store connection. Each unit of work owns exactly one.
///
/// `apply` is atomic: either every change in the batch takes effect or
/// none does. Inserts get their assigned id written back into the batch.
#[async_trait]
pub trait Session: Send {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn select(&mut self, query: &Query) -> Result<Vec<Record>, StoreError>;

    async fn count(&mut self, query: &Query) -> Result<u64, StoreError>;

    /// Returns the number of rows directly affected
    async fn apply(&mut self, changes: &mut [Change]) -> Result<u64, StoreError>;

    async fn begin(&mut self) -> Result<(), StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;

    /// Release the underlying connection
    async fn close(&mut self) -> Result<(), StoreError>;
}
