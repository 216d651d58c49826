mod aggregate_tests;
mod crud_tests;
mod unit_of_work_tests;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::StoreError;
use crate::repositories::{UnitOfWork, UnitOfWorkFactory};
use crate::store::{Change, MemorySession, MemoryStore, Query, Record, Session};

pub(super) async fn seeded() -> (MemoryStore, UnitOfWork) {
    let store = MemoryStore::seeded().unwrap();
    let uow = store.create().await.unwrap();
    (store, uow)
}

/// Wraps a memory session and counts the reads sent through it
pub(super) struct CountingSession {
    inner: MemorySession,
    selects: Arc<AtomicUsize>,
}

impl CountingSession {
    pub(super) fn new(store: &MemoryStore) -> (Self, Arc<AtomicUsize>) {
        let selects = Arc::new(AtomicUsize::new(0));
        let session = Self {
            inner: store.session(),
            selects: Arc::clone(&selects),
        };
        (session, selects)
    }
}

#[async_trait]
impl Session for CountingSession {
    fn backend(&self) -> &'static str {
        "counting"
    }

    async fn select(&mut self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.select(query).await
    }

    async fn count(&mut self, query: &Query) -> Result<u64, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.count(query).await
    }

    async fn apply(&mut self, changes: &mut [Change]) -> Result<u64, StoreError> {
        self.inner.apply(changes).await
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        self.inner.begin().await
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback().await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close().await
    }
}
