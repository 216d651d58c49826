//! Error types for the store, authentication and token operations

use thiserror::Error;

use crate::store::Table;

/// Kind of integrity rule a write broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    NotNull,
    Length,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Length => "length",
        };
        f.write_str(name)
    }
}

/// Failures raised by a store session or the unit of work driving it
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} constraint violated on {table}: {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        table: Table,
        message: String,
    },

    #[error("No {table} row with id {id}")]
    MissingRow { table: Table, id: i64 },

    #[error("Cannot {operation} while the unit of work is {state}")]
    InvalidTransactionState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Unit of work has been disposed")]
    Disposed,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Unknown column {column} on {table}")]
    UnknownColumn { table: Table, column: String },

    #[error("Cannot map {table}.{column}: {message}")]
    Mapping {
        table: Table,
        column: String,
        message: String,
    },

    #[error("Store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn constraint(kind: ConstraintKind, table: Table, message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            kind,
            table,
            message: message.into(),
        }
    }

    pub fn backend(message: impl ToString) -> Self {
        StoreError::Backend {
            message: message.to_string(),
        }
    }

    /// True for integrity failures a client can fix by changing its input
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation { .. })
    }
}

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User account is inactive")]
    UserInactive,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },
}

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Token subject is not a user id")]
    InvalidSubject,

    #[error("Invalid token")]
    Invalid,
}
