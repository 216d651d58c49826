//! Unit of Work: one store session, the repositories bound to it, and the
//! batch of changes they have staged.
//!
//! Repositories only read and stage. Nothing reaches the store until
//! [`UnitOfWork::save_changes`], which applies the whole batch atomically.
//! An explicit transaction widens the atomicity boundary to everything
//! saved between begin and commit.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::category::CategoryRepository;
use super::generic::Repository;
use super::order::OrderRepository;
use super::product::ProductRepository;
use super::user::UserRepository;
use crate::domain::entities::{OrderItem, Role, UserProfile, UserRole};
use crate::errors::StoreError;
use crate::store::{Change, Entity, MemoryStore, ParentLink, Query, Record, Session, Table};

/// Lifecycle of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// No explicit transaction open
    Idle,
    InTransaction,
    /// Terminal
    Disposed,
}

impl UnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitState::Idle => "idle",
            UnitState::InTransaction => "in transaction",
            UnitState::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a staged insert. Pass it to [`UnitOfWork::persisted`] after
/// saving to get the entity with its store-assigned id.
#[derive(Debug, Clone)]
pub struct Staged<T> {
    ticket: u64,
    entity: T,
}

impl<T> Staged<T> {
    /// The entity as staged, id still zero
    pub fn entity(&self) -> &T {
        &self.entity
    }
}

#[derive(Debug)]
struct Pending {
    ticket: u64,
    change: Change,
}

/// Creates a fresh unit of work per request
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn create(&self) -> Result<UnitOfWork, StoreError>;
}

#[async_trait]
impl UnitOfWorkFactory for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self) -> Result<UnitOfWork, StoreError> {
        Ok(UnitOfWork::new(Box::new(self.session())))
    }
}

pub struct UnitOfWork {
    session: Box<dyn Session>,
    state: UnitState,
    pending: Vec<Pending>,
    next_ticket: u64,
    assigned: HashMap<u64, i64>,
    /// Tickets saved inside the open transaction
    uncommitted: Vec<u64>,
    deadline: Option<Instant>,
}

impl UnitOfWork {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self {
            session,
            state: UnitState::Idle,
            pending: Vec::new(),
            next_ticket: 0,
            assigned: HashMap::new(),
            uncommitted: Vec::new(),
            deadline: None,
        }
    }

    /// Every store round trip made after `timeout` has elapsed fails with
    /// [`StoreError::DeadlineExceeded`]
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn backend(&self) -> &'static str {
        self.session.backend()
    }

    pub fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    pub fn products(&mut self) -> ProductRepository<'_> {
        ProductRepository::new(self)
    }

    pub fn categories(&mut self) -> CategoryRepository<'_> {
        CategoryRepository::new(self)
    }

    pub fn orders(&mut self) -> OrderRepository<'_> {
        OrderRepository::new(self)
    }

    pub fn roles(&mut self) -> Repository<'_, Role> {
        Repository::new(self)
    }

    pub fn user_roles(&mut self) -> Repository<'_, UserRole> {
        Repository::new(self)
    }

    pub fn user_profiles(&mut self) -> Repository<'_, UserProfile> {
        Repository::new(self)
    }

    pub fn order_items(&mut self) -> Repository<'_, OrderItem> {
        Repository::new(self)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops everything staged since the last successful save
    pub fn discard_changes(&mut self) {
        self.pending.clear();
    }

    /// The saved form of a staged insert, once `save_changes` has succeeded.
    /// Inserts saved inside a transaction that is rolled back yield `None`.
    pub fn persisted<T: Entity>(&self, staged: &Staged<T>) -> Option<T> {
        self.assigned.get(&staged.ticket).map(|id| {
            let mut entity = staged.entity.clone();
            entity.set_id(*id);
            entity
        })
    }

    /// Flushes every staged change as one atomic batch and returns the
    /// number of rows affected. On failure the staged changes are kept and
    /// an open transaction stays open.
    pub async fn save_changes(&mut self) -> Result<u64, StoreError> {
        self.ensure_usable()?;
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut batch: Vec<Change> = self.pending.iter().map(|p| p.change.clone()).collect();
        let result = within(self.deadline, self.session.apply(&mut batch)).await;

        match result {
            Ok(affected) => {
                for (pending, applied) in self.pending.iter().zip(&batch) {
                    if let Some(id) = applied.inserted_id() {
                        self.assigned.insert(pending.ticket, id);
                        if self.state == UnitState::InTransaction {
                            self.uncommitted.push(pending.ticket);
                        }
                    }
                }
                debug!(changes = batch.len(), affected, state = %self.state, "Saved changes");
                self.pending.clear();
                Ok(affected)
            }
            Err(error) => {
                warn!(changes = batch.len(), error = %error, "Save failed");
                Err(error)
            }
        }
    }

    /// Idle -> InTransaction
    pub async fn begin_transaction(&mut self) -> Result<(), StoreError> {
        self.require_state("begin a transaction", UnitState::Idle)?;
        within(self.deadline, self.session.begin()).await?;
        self.state = UnitState::InTransaction;
        info!(backend = self.backend(), "Transaction started");
        Ok(())
    }

    /// InTransaction -> Idle, persisting everything saved in the transaction
    pub async fn commit_transaction(&mut self) -> Result<(), StoreError> {
        self.require_state("commit", UnitState::InTransaction)?;
        let result = within(self.deadline, self.session.commit()).await;
        self.state = UnitState::Idle;
        match &result {
            Ok(()) => {
                self.uncommitted.clear();
                info!("Transaction committed");
            }
            Err(error) => {
                self.forget_uncommitted();
                warn!(error = %error, "Transaction commit failed");
            }
        }
        result
    }

    /// InTransaction -> Idle, discarding the transaction's effects and any
    /// changes staged but not yet saved
    pub async fn rollback_transaction(&mut self) -> Result<(), StoreError> {
        self.require_state("roll back", UnitState::InTransaction)?;
        self.pending.clear();
        self.forget_uncommitted();
        let result = self.session.rollback().await;
        self.state = UnitState::Idle;
        info!("Transaction rolled back");
        result
    }

    /// Releases the transaction (if open) and the session. Safe to call
    /// more than once.
    pub async fn dispose(&mut self) -> Result<(), StoreError> {
        if self.state == UnitState::Disposed {
            return Ok(());
        }
        if self.state == UnitState::InTransaction {
            if let Err(error) = self.session.rollback().await {
                warn!(error = %error, "Rollback during dispose failed");
            }
            self.forget_uncommitted();
        }
        self.pending.clear();
        self.state = UnitState::Disposed;
        self.session.close().await
    }

    /// Ids assigned inside a transaction that never committed are not real
    fn forget_uncommitted(&mut self) {
        for ticket in self.uncommitted.drain(..) {
            self.assigned.remove(&ticket);
        }
    }

    /// Cheap round trip used by health checks
    pub async fn ping(&mut self) -> Result<(), StoreError> {
        let query = Query::new(Table::Roles).limit(1);
        self.fetch(&query).await.map(|_| ())
    }

    pub(crate) async fn fetch(&mut self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.ensure_usable()?;
        query.validate()?;
        within(self.deadline, self.session.select(query)).await
    }

    pub(crate) async fn fetch_count(&mut self, query: &Query) -> Result<u64, StoreError> {
        self.ensure_usable()?;
        query.validate()?;
        within(self.deadline, self.session.count(query)).await
    }

    /// Stages a change and returns its ticket
    pub(crate) fn stage(&mut self, change: Change) -> Result<u64, StoreError> {
        self.ensure_usable()?;
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push(Pending { ticket, change });
        Ok(ticket)
    }

    /// Stages an insert whose `column` takes the id assigned to the insert
    /// staged at `parent`
    pub(crate) fn stage_child(
        &mut self,
        record: Record,
        parent: usize,
        column: &'static str,
    ) -> Result<u64, StoreError> {
        self.stage(Change::Insert {
            record,
            parent: Some(ParentLink {
                index: parent,
                column,
            }),
        })
    }

    /// Batch position the next staged change will occupy
    pub(crate) fn next_position(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn staged<T>(ticket: u64, entity: T) -> Staged<T> {
        Staged { ticket, entity }
    }

    fn ensure_usable(&self) -> Result<(), StoreError> {
        if self.state == UnitState::Disposed {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    fn require_state(&self, operation: &'static str, expected: UnitState) -> Result<(), StoreError> {
        self.ensure_usable()?;
        if self.state != expected {
            return Err(StoreError::InvalidTransactionState {
                operation,
                state: self.state.as_str(),
            });
        }
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state != UnitState::Disposed {
            debug!(
                state = %self.state,
                pending = self.pending.len(),
                "Unit of work dropped without dispose"
            );
        }
    }
}

async fn within<T>(
    deadline: Option<Instant>,
    operation: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
        Some(deadline) => tokio::time::timeout_at(deadline, operation)
            .await
            .map_err(|_| StoreError::DeadlineExceeded)?,
        None => operation.await,
    }
}
