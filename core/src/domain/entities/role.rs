//! Roles and the user-to-role assignments that join them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::now;
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

/// Name of the role given to self-registered accounts
pub const DEFAULT_ROLE: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: i64,
    /// Unique role name
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            created_at: now(),
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Role {
    const TABLE: Table = Table::Roles;

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
            .with("created_at", self.created_at)
            .with("is_active", self.is_active)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            name: record.take("name")?,
            description: record.take("description")?,
            created_at: record.take("created_at")?,
            is_active: record.take("is_active")?,
        })
    }
}

/// Membership of a user in a role. Only active rows grant the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(default)]
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub assigned_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl UserRole {
    pub fn new(user_id: i64, role_id: i64) -> Self {
        Self {
            id: 0,
            user_id,
            role_id,
            assigned_at: now(),
            revoked_at: None,
            is_active: true,
        }
    }

    pub fn revoke(&mut self) {
        self.is_active = false;
        self.revoked_at = Some(now());
    }
}

impl Entity for UserRole {
    const TABLE: Table = Table::UserRoles;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("user_id", self.user_id)
            .with("role_id", self.role_id)
            .with("assigned_at", self.assigned_at)
            .with("revoked_at", self.revoked_at)
            .with("is_active", self.is_active)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            user_id: record.take("user_id")?,
            role_id: record.take("role_id")?,
            assigned_at: record.take("assigned_at")?,
            revoked_at: record.take("revoked_at")?,
            is_active: record.take("is_active")?,
        })
    }
}
