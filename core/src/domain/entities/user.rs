//! User entity representing a storefront customer or staff account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::now;
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

/// User entity. Deactivation is a soft delete through `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier, zero until saved
    #[serde(default)]
    pub id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Unique across all users, compared exactly
    pub email: String,

    pub phone_number: Option<String>,

    /// bcrypt hash, present only for accounts that can log in
    #[serde(skip)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,

    pub is_active: bool,
}

impl User {
    /// Creates a new active user
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: None,
            password_hash: None,
            created_at: now(),
            updated_at: None,
            is_active: true,
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Marks the row as modified now
    pub fn touch(&mut self) {
        self.updated_at = Some(now());
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }
}

impl Entity for User {
    const TABLE: Table = Table::Users;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("first_name", &self.first_name)
            .with("last_name", &self.last_name)
            .with("email", &self.email)
            .with("phone_number", self.phone_number.clone())
            .with("password_hash", self.password_hash.clone())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
            .with("is_active", self.is_active)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            first_name: record.take("first_name")?,
            last_name: record.take("last_name")?,
            email: record.take("email")?,
            phone_number: record.take("phone_number")?,
            password_hash: record.take("password_hash")?,
            created_at: record.take("created_at")?,
            updated_at: record.take("updated_at")?,
            is_active: record.take("is_active")?,
        })
    }
}
