//! Product categories, arranged as a tree through `parent_category_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::now;
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

/// A category. Children point at their parent by id; the parent holds no
/// list of children, those are found by query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    /// Unique category name
    pub name: String,
    pub description: Option<String>,
    /// `None` for a main category
    pub parent_category_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            parent_category_id: None,
            is_active: true,
            created_at: now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parent(mut self, parent_category_id: i64) -> Self {
        self.parent_category_id = Some(parent_category_id);
        self
    }

    pub fn is_main(&self) -> bool {
        self.parent_category_id.is_none()
    }
}

impl Entity for Category {
    const TABLE: Table = Table::Categories;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("name", &self.name)
            .with("description", self.description.clone())
            .with("parent_category_id", self.parent_category_id)
            .with("is_active", self.is_active)
            .with("created_at", self.created_at)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            name: record.take("name")?,
            description: record.take("description")?,
            parent_category_id: record.take("parent_category_id")?,
            is_active: record.take("is_active")?,
            created_at: record.take("created_at")?,
        })
    }
}
