//! Generic CRUD repository shared by every entity type

use std::marker::PhantomData;

use super::unit_of_work::{Staged, UnitOfWork};
use crate::errors::StoreError;
use crate::store::{Change, Direction, Entity, Filter, Query};

/// CRUD access to one entity type through a unit of work.
///
/// Reads go straight to the store. Writes are staged and only reach the
/// store on [`UnitOfWork::save_changes`].
pub struct Repository<'u, T: Entity> {
    uow: &'u mut UnitOfWork,
    _entity: PhantomData<T>,
}

impl<'u, T: Entity> Repository<'u, T> {
    pub(crate) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    /// Every row, unfiltered
    pub async fn get_all(&mut self) -> Result<Vec<T>, StoreError> {
        self.query().fetch_all().await
    }

    /// `Ok(None)` when no row has this id
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<T>, StoreError> {
        self.query().filter(Filter::eq("id", id)).first().await
    }

    /// Stages an insert. Any id already on the entity is ignored; the store
    /// assigns one on save.
    pub fn add(&mut self, entity: T) -> Result<Staged<T>, StoreError> {
        let mut record = entity.to_record();
        record.id = None;
        let ticket = self.uow.stage(Change::Insert {
            record,
            parent: None,
        })?;
        Ok(UnitOfWork::staged(ticket, entity))
    }

    /// Stages a full replacement of the row with the entity's id
    pub fn update(&mut self, entity: T) -> Result<T, StoreError> {
        if entity.id() == 0 {
            return Err(StoreError::MissingRow {
                table: T::TABLE,
                id: 0,
            });
        }
        self.uow.stage(Change::Update {
            record: entity.to_record(),
        })?;
        Ok(entity)
    }

    /// Stages removal when the row exists. Returns `false`, staging
    /// nothing, when it does not.
    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        if !self.exists(id).await? {
            return Ok(false);
        }
        self.uow.stage(Change::Delete {
            table: T::TABLE,
            id,
        })?;
        Ok(true)
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, StoreError> {
        self.query().filter(Filter::eq("id", id)).any().await
    }

    /// Composable filter and sort before materialisation
    pub fn query(&mut self) -> Queryable<'_, T> {
        Queryable::new(self.uow)
    }

    pub(crate) fn unit(&mut self) -> &mut UnitOfWork {
        self.uow
    }
}

/// A pending read against one entity type
pub struct Queryable<'q, T: Entity> {
    uow: &'q mut UnitOfWork,
    query: Query,
    _entity: PhantomData<T>,
}

impl<'q, T: Entity> Queryable<'q, T> {
    pub(crate) fn new(uow: &'q mut UnitOfWork) -> Self {
        Self {
            uow,
            query: Query::new(T::TABLE),
            _entity: PhantomData,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.query = self.query.filter(filter);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.query = self.query.order_by(column, direction);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub async fn fetch_all(self) -> Result<Vec<T>, StoreError> {
        let records = self.uow.fetch(&self.query).await?;
        records.iter().map(T::from_record).collect()
    }

    pub async fn first(self) -> Result<Option<T>, StoreError> {
        Ok(self.limit(1).fetch_all().await?.into_iter().next())
    }

    pub async fn count(self) -> Result<u64, StoreError> {
        self.uow.fetch_count(&self.query).await
    }

    /// Answers from a count, without loading rows
    pub async fn any(self) -> Result<bool, StoreError> {
        Ok(self.count().await? > 0)
    }
}
