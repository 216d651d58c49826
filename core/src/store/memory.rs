//! Process-local store backend
//!
//! Enforces the same integrity rules a relational engine would: primary
//! keys, unique keys (NULLs never collide), foreign-key presence, and
//! cascade or restrict on delete. Every batch is applied to a copy of the
//! tables that is swapped in only on success, so failed batches leave no
//! trace. Explicit transactions work on a private snapshot whose change
//! log is replayed against the shared tables on commit.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::query::Query;
use super::record::Record;
use super::schema::{ColumnKind, OnDelete, Table};
use super::seed;
use super::session::{link_parent, Change, Session};
use super::value::Value;
use crate::errors::{ConstraintKind, StoreError};

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    rows: HashMap<Table, BTreeMap<i64, Record>>,
}

impl Tables {
    fn rows(&self, table: Table) -> impl Iterator<Item = &Record> {
        self.rows.get(&table).into_iter().flat_map(|rows| rows.values())
    }

    fn get(&self, table: Table, id: i64) -> Option<&Record> {
        self.rows.get(&table).and_then(|rows| rows.get(&id))
    }

    fn select(&self, query: &Query) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .rows(query.table)
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        query.sort(&mut rows);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    }

    fn insert(&mut self, record: Record) -> Result<(), StoreError> {
        let id = record.require_id()?;
        if self.get(record.table, id).is_some() {
            return Err(StoreError::constraint(
                ConstraintKind::PrimaryKey,
                record.table,
                format!("duplicate id {}", id),
            ));
        }
        self.check_row(&record, id)?;
        self.rows.entry(record.table).or_default().insert(id, record);
        Ok(())
    }

    fn update(&mut self, record: Record) -> Result<(), StoreError> {
        let id = record.require_id()?;
        if self.get(record.table, id).is_none() {
            return Err(StoreError::MissingRow {
                table: record.table,
                id,
            });
        }
        self.check_row(&record, id)?;
        self.rows.entry(record.table).or_default().insert(id, record);
        Ok(())
    }

    /// Deletes a row and its cascade set. Returns 0 when the row is absent.
    fn delete(&mut self, table: Table, id: i64) -> Result<u64, StoreError> {
        if self.get(table, id).is_none() {
            return Ok(0);
        }

        let mut doomed: BTreeSet<(Table, i64)> = BTreeSet::new();
        let mut queue = vec![(table, id)];
        while let Some((current, current_id)) = queue.pop() {
            if !doomed.insert((current, current_id)) {
                continue;
            }
            for (child, fk) in current.referenced_by() {
                if fk.on_delete != OnDelete::Cascade {
                    continue;
                }
                queue.extend(
                    self.rows(child)
                        .filter(|row| row.value(fk.column).sql_eq(&Value::Int(current_id)))
                        .filter_map(|row| row.id.map(|child_id| (child, child_id))),
                );
            }
        }

        for &(current, current_id) in &doomed {
            for (child, fk) in current.referenced_by() {
                if fk.on_delete != OnDelete::Restrict {
                    continue;
                }
                let blocker = self.rows(child).find(|row| {
                    row.value(fk.column).sql_eq(&Value::Int(current_id))
                        && !row.id.is_some_and(|child_id| doomed.contains(&(child, child_id)))
                });
                if let Some(blocker) = blocker {
                    return Err(StoreError::constraint(
                        ConstraintKind::ForeignKey,
                        current,
                        format!(
                            "row {} is still referenced by {}.{} (row {})",
                            current_id,
                            child,
                            fk.column,
                            blocker.id.unwrap_or_default()
                        ),
                    ));
                }
            }
        }

        for (current, current_id) in doomed {
            if let Some(rows) = self.rows.get_mut(&current) {
                rows.remove(&current_id);
            }
        }
        Ok(1)
    }

    fn check_row(&self, record: &Record, id: i64) -> Result<(), StoreError> {
        let table = record.table;

        if let Some((column, _)) = record.values().find(|(c, _)| table.column(c).is_none()) {
            return Err(StoreError::UnknownColumn {
                table,
                column: column.to_string(),
            });
        }

        for column in table.columns() {
            let value = record.value(column.name);
            let fits = match (&value, column.kind) {
                (Value::Null, _) => {
                    if column.nullable {
                        continue;
                    }
                    return Err(StoreError::constraint(
                        ConstraintKind::NotNull,
                        table,
                        format!("{} cannot be null", column.name),
                    ));
                }
                (Value::Text(text), ColumnKind::Text(max)) => {
                    if text.chars().count() > max {
                        return Err(StoreError::constraint(
                            ConstraintKind::Length,
                            table,
                            format!("{} exceeds {} characters", column.name, max),
                        ));
                    }
                    true
                }
                (Value::Int(_), ColumnKind::Int)
                | (Value::Bool(_), ColumnKind::Bool)
                | (Value::Decimal(_), ColumnKind::Decimal)
                | (Value::Int(_), ColumnKind::Decimal)
                | (Value::Timestamp(_), ColumnKind::Timestamp) => true,
                _ => false,
            };
            if !fits {
                return Err(StoreError::Mapping {
                    table,
                    column: column.name.to_string(),
                    message: format!("{} value in {:?} column", value.type_name(), column.kind),
                });
            }
        }

        for key in table.unique_keys() {
            let values: Vec<Value> = key.iter().map(|c| record.value(c)).collect();
            if values.iter().any(Value::is_null) {
                continue;
            }
            let duplicate = self.rows(table).any(|row| {
                row.id != Some(id)
                    && key
                        .iter()
                        .zip(&values)
                        .all(|(c, v)| row.value(c).sql_eq(v))
            });
            if duplicate {
                return Err(StoreError::constraint(
                    ConstraintKind::Unique,
                    table,
                    format!("duplicate value for ({})", key.join(", ")),
                ));
            }
        }

        for fk in table.foreign_keys() {
            if let Value::Int(target) = record.value(fk.column) {
                if self.get(fk.references, target).is_none() {
                    return Err(StoreError::constraint(
                        ConstraintKind::ForeignKey,
                        table,
                        format!("{} references missing {} row {}", fk.column, fk.references, target),
                    ));
                }
            }
        }

        Ok(())
    }

    fn row_count(&self, table: Table) -> usize {
        self.rows.get(&table).map_or(0, BTreeMap::len)
    }
}

/// Auto-increment counters. Shared by every session and never rolled back.
#[derive(Debug, Default)]
struct Sequences {
    next: HashMap<Table, i64>,
}

impl Sequences {
    fn assign(&mut self, record: &mut Record) {
        let last = self.next.entry(record.table).or_insert(0);
        match record.id {
            Some(explicit) => *last = (*last).max(explicit),
            None => {
                *last += 1;
                record.id = Some(*last);
            }
        }
    }
}

fn apply_batch(
    tables: &mut Tables,
    sequences: &mut Sequences,
    changes: &mut [Change],
) -> Result<u64, StoreError> {
    let mut affected = 0;
    for position in 0..changes.len() {
        link_parent(changes, position)?;
        match &mut changes[position] {
            Change::Insert { record, .. } => {
                sequences.assign(record);
                tables.insert(record.clone())?;
                affected += 1;
            }
            Change::Update { record } => {
                tables.update(record.clone())?;
                affected += 1;
            }
            Change::Delete { table, id } => {
                affected += tables.delete(*table, *id)?;
            }
        }
    }
    Ok(affected)
}

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    sequences: Mutex<Sequences>,
}

/// In-memory database. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the fixed seed rows
    pub fn seeded() -> Result<Self, StoreError> {
        let mut tables = Tables::default();
        let mut sequences = Sequences::default();
        let mut changes: Vec<Change> = seed::seed_records()
            .into_iter()
            .map(|record| Change::Insert {
                record,
                parent: None,
            })
            .collect();
        apply_batch(&mut tables, &mut sequences, &mut changes)?;

        Ok(Self {
            shared: Arc::new(Shared {
                tables: RwLock::new(tables),
                sequences: Mutex::new(sequences),
            }),
        })
    }

    pub fn session(&self) -> MemorySession {
        MemorySession {
            shared: Arc::clone(&self.shared),
            transaction: None,
            closed: false,
        }
    }

    /// Committed rows in a table
    pub async fn row_count(&self, table: Table) -> usize {
        self.shared.tables.read().await.row_count(table)
    }
}

#[derive(Debug)]
struct Transaction {
    snapshot: Tables,
    log: Vec<Change>,
}

/// A session over a [`MemoryStore`]
#[derive(Debug)]
pub struct MemorySession {
    shared: Arc<Shared>,
    transaction: Option<Transaction>,
    closed: bool,
}

impl MemorySession {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MemorySession {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn select(&mut self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.ensure_open()?;
        query.validate()?;
        match &self.transaction {
            Some(transaction) => Ok(transaction.snapshot.select(query)),
            None => Ok(self.shared.tables.read().await.select(query)),
        }
    }

    async fn count(&mut self, query: &Query) -> Result<u64, StoreError> {
        let mut unlimited = query.clone();
        unlimited.limit = None;
        Ok(self.select(&unlimited).await?.len() as u64)
    }

    async fn apply(&mut self, changes: &mut [Change]) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut sequences = self.shared.sequences.lock().await;

        if let Some(transaction) = &mut self.transaction {
            let mut working = transaction.snapshot.clone();
            let affected = apply_batch(&mut working, &mut sequences, changes)?;
            transaction.snapshot = working;
            // Links were resolved against this batch; the log replays plain rows
            transaction.log.extend(changes.iter().cloned().map(|change| match change {
                Change::Insert { record, .. } => Change::Insert {
                    record,
                    parent: None,
                },
                other => other,
            }));
            return Ok(affected);
        }

        let mut tables = self.shared.tables.write().await;
        let mut working = tables.clone();
        let affected = apply_batch(&mut working, &mut sequences, changes)?;
        *tables = working;
        Ok(affected)
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.transaction.is_some() {
            return Err(StoreError::InvalidTransactionState {
                operation: "begin",
                state: "in transaction",
            });
        }
        let snapshot = self.shared.tables.read().await.clone();
        self.transaction = Some(Transaction {
            snapshot,
            log: Vec::new(),
        });
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut transaction = self.transaction.take().ok_or(StoreError::InvalidTransactionState {
            operation: "commit",
            state: "idle",
        })?;
        if transaction.log.is_empty() {
            return Ok(());
        }

        let mut sequences = self.shared.sequences.lock().await;
        let mut tables = self.shared.tables.write().await;
        let mut working = tables.clone();
        match apply_batch(&mut working, &mut sequences, &mut transaction.log) {
            Ok(_) => {
                *tables = working;
                debug!(changes = transaction.log.len(), "Memory transaction committed");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "Memory transaction conflicted at commit");
                Err(error)
            }
        }
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.transaction
            .take()
            .map(|_| ())
            .ok_or(StoreError::InvalidTransactionState {
                operation: "rollback",
                state: "idle",
            })
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.transaction = None;
        self.closed = true;
        Ok(())
    }
}
