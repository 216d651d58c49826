//! Untyped rows and the per-entity mapping to and from them

use std::collections::BTreeMap;

use super::schema::Table;
use super::value::{FromValue, Value};
use crate::errors::StoreError;

/// One row of a table. `id` stays `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub table: Table,
    pub id: Option<i64>,
    values: BTreeMap<&'static str, Value>,
}

impl Record {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            id: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_id(table: Table, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::new(table)
        }
    }

    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.values.insert(column, value.into());
    }

    /// Value of a column, `id` included. Absent columns read as NULL.
    pub fn value(&self, column: &str) -> Value {
        if column == "id" {
            return self.id.map_or(Value::Null, Value::Int);
        }
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Typed read used by [`Entity::from_record`] implementations
    pub fn take<T: FromValue>(&self, column: &str) -> Result<T, StoreError> {
        let value = self.values.get(column).unwrap_or(&Value::Null);
        T::from_value(value).ok_or_else(|| StoreError::Mapping {
            table: self.table,
            column: column.to_string(),
            message: format!("unexpected {} value", value.type_name()),
        })
    }

    /// The assigned id, or a mapping error for rows that were never stored
    pub fn require_id(&self) -> Result<i64, StoreError> {
        self.id.ok_or_else(|| StoreError::Mapping {
            table: self.table,
            column: "id".to_string(),
            message: "row has no id".to_string(),
        })
    }
}

/// Row mapping for a persisted entity type
pub trait Entity: Clone + Send + Sync + 'static {
    const TABLE: Table;

    /// Zero until the entity has been saved
    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> Result<Self, StoreError>;

    /// Start a record for this entity, carrying its id when it has one
    fn empty_record(&self) -> Record {
        match self.id() {
            0 => Record::new(Self::TABLE),
            id => Record::with_id(Self::TABLE, id),
        }
    }
}
