//! MySQL implementation of the store session
//!
//! One pooled connection per session. Every `apply` runs inside its own
//! transaction, or inside a savepoint when an explicit transaction is
//! open, so a failed batch never leaves partial effects behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlQueryResult, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query as SqlQuery;
use sqlx::{Executor, MySql, Row};

use sf_core::errors::StoreError;
use sf_core::store::session::link_parent;
use sf_core::store::{Change, ColumnKind, Query, Record, Session, Table, Value};

use super::errors::{connection_error, store_error};
use super::sql::{self, Statement};

const BATCH_SAVEPOINT: &str = "sf_batch";

/// Binds `params` to the placeholders of `query` in order
pub(crate) fn bind_all<'q>(
    mut query: SqlQuery<'q, MySql, MySqlArguments>,
    params: &[Value],
) -> SqlQuery<'q, MySql, MySqlArguments> {
    for value in params {
        query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Bool(v) => query.bind(*v),
            Value::Decimal(v) => query.bind(*v),
            Value::Timestamp(v) => query.bind(*v),
        };
    }
    query
}

fn mapping_error(table: Table, column: &str, error: sqlx::Error) -> StoreError {
    StoreError::Mapping {
        table,
        column: column.to_string(),
        message: error.to_string(),
    }
}

/// Reads one row into a record using the table's declared column kinds
fn decode_row(table: Table, row: &MySqlRow) -> Result<Record, StoreError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| mapping_error(table, "id", e))?;
    let mut record = Record::with_id(table, id);

    for column in table.columns() {
        let name = column.name;
        let value = match column.kind {
            ColumnKind::Int => row.try_get::<Option<i64>, _>(name).map(Value::from),
            ColumnKind::Text(_) => row.try_get::<Option<String>, _>(name).map(Value::from),
            ColumnKind::Bool => row.try_get::<Option<bool>, _>(name).map(Value::from),
            ColumnKind::Decimal => row.try_get::<Option<Decimal>, _>(name).map(Value::from),
            ColumnKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(name)
                .map(Value::from),
        }
        .map_err(|e| mapping_error(table, name, e))?;
        record.set(name, value);
    }
    Ok(record)
}

fn check_columns(record: &Record) -> Result<(), StoreError> {
    match record.values().find(|(c, _)| !record.table.has_column(c)) {
        Some((column, _)) => Err(StoreError::UnknownColumn {
            table: record.table,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// A store session over one pooled MySQL connection
pub struct MySqlSession {
    conn: PoolConnection<MySql>,
    in_transaction: bool,
    /// A batch started but neither finished nor undid itself, because its
    /// future was dropped mid-flight
    interrupted: bool,
    closed: bool,
}

impl MySqlSession {
    pub fn new(conn: PoolConnection<MySql>) -> Self {
        Self {
            conn,
            in_transaction: false,
            interrupted: false,
            closed: false,
        }
    }

    async fn execute_raw(&mut self, statement: &str) -> Result<(), StoreError> {
        (&mut *self.conn)
            .execute(statement)
            .await
            .map(|_| ())
            .map_err(connection_error)
    }

    async fn run(&mut self, table: Table, statement: &Statement) -> Result<MySqlQueryResult, StoreError> {
        bind_all(sqlx::query(&statement.sql), &statement.params)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| store_error(table, e))
    }

    /// Fails once closed, and undoes the leftovers of an interrupted batch
    async fn ready(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Disposed);
        }
        if self.interrupted {
            tracing::warn!("Undoing interrupted batch");
            let undo = if self.in_transaction {
                format!("ROLLBACK TO SAVEPOINT {}", BATCH_SAVEPOINT)
            } else {
                "ROLLBACK".to_string()
            };
            self.execute_raw(&undo).await?;
            self.interrupted = false;
        }
        Ok(())
    }

    async fn apply_batch(&mut self, changes: &mut [Change]) -> Result<u64, StoreError> {
        let mut affected = 0;
        for position in 0..changes.len() {
            link_parent(changes, position)?;
            match &mut changes[position] {
                Change::Insert { record, .. } => {
                    check_columns(record)?;
                    let statement = sql::insert(record, false);
                    let result = self.run(record.table, &statement).await?;
                    if record.id.is_none() {
                        record.id = Some(result.last_insert_id() as i64);
                    }
                    affected += result.rows_affected();
                }
                Change::Update { record } => {
                    check_columns(record)?;
                    let id = record.require_id()?;
                    let result = self.run(record.table, &sql::update(record, id)).await?;
                    // Unchanged rows report zero affected
                    if result.rows_affected() == 0 && !self.row_exists(record.table, id).await? {
                        return Err(StoreError::MissingRow {
                            table: record.table,
                            id,
                        });
                    }
                    affected += 1;
                }
                Change::Delete { table, id } => {
                    let result = self.run(*table, &sql::delete(*table, *id)).await?;
                    affected += result.rows_affected();
                }
            }
        }
        Ok(affected)
    }

    async fn row_exists(&mut self, table: Table, id: i64) -> Result<bool, StoreError> {
        let statement = sql::row_exists(table, id);
        let row = bind_all(sqlx::query(&statement.sql), &statement.params)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| store_error(table, e))?;
        let count: i64 = row.try_get(0).map_err(|e| mapping_error(table, "id", e))?;
        Ok(count > 0)
    }

    fn invalid_state(&self, operation: &'static str) -> StoreError {
        StoreError::InvalidTransactionState {
            operation,
            state: if self.in_transaction {
                "in transaction"
            } else {
                "idle"
            },
        }
    }
}

#[async_trait]
impl Session for MySqlSession {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn select(&mut self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.ready().await?;
        query.validate()?;
        let statement = sql::select(query);
        let rows = bind_all(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| store_error(query.table, e))?;
        rows.iter().map(|row| decode_row(query.table, row)).collect()
    }

    async fn count(&mut self, query: &Query) -> Result<u64, StoreError> {
        self.ready().await?;
        query.validate()?;
        let statement = sql::count(query);
        let row = bind_all(sqlx::query(&statement.sql), &statement.params)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| store_error(query.table, e))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| mapping_error(query.table, "COUNT(*)", e))?;
        Ok(count.max(0) as u64)
    }

    async fn apply(&mut self, changes: &mut [Change]) -> Result<u64, StoreError> {
        self.ready().await?;
        let (open, undo, finish) = if self.in_transaction {
            (
                format!("SAVEPOINT {}", BATCH_SAVEPOINT),
                format!("ROLLBACK TO SAVEPOINT {}", BATCH_SAVEPOINT),
                format!("RELEASE SAVEPOINT {}", BATCH_SAVEPOINT),
            )
        } else {
            (
                "START TRANSACTION".to_string(),
                "ROLLBACK".to_string(),
                "COMMIT".to_string(),
            )
        };

        self.execute_raw(&open).await?;
        self.interrupted = true;
        match self.apply_batch(changes).await {
            Ok(affected) => {
                self.execute_raw(&finish).await?;
                self.interrupted = false;
                tracing::debug!(changes = changes.len(), affected, "Batch applied");
                Ok(affected)
            }
            Err(error) => {
                match self.execute_raw(&undo).await {
                    Ok(()) => self.interrupted = false,
                    Err(undo_error) => {
                        tracing::warn!(error = %undo_error, "Failed to undo batch")
                    }
                }
                Err(error)
            }
        }
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        self.ready().await?;
        if self.in_transaction {
            return Err(self.invalid_state("begin"));
        }
        self.execute_raw("START TRANSACTION").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ready().await?;
        if !self.in_transaction {
            return Err(self.invalid_state("commit"));
        }
        self.in_transaction = false;
        self.execute_raw("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Disposed);
        }
        if !self.in_transaction {
            return Err(self.invalid_state("roll back"));
        }
        self.in_transaction = false;
        self.interrupted = false;
        self.execute_raw("ROLLBACK").await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.in_transaction || self.interrupted {
            self.in_transaction = false;
            self.interrupted = false;
            if let Err(error) = self.execute_raw("ROLLBACK").await {
                // Never hand a connection with open work back to the pool
                self.conn.close_on_drop();
                return Err(error);
            }
        }
        Ok(())
    }
}

impl Drop for MySqlSession {
    fn drop(&mut self) {
        if self.in_transaction || self.interrupted {
            tracing::debug!("Session dropped with open work, discarding connection");
            self.conn.close_on_drop();
        }
    }
}
