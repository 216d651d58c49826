//! Storage abstraction shared by every backend
//!
//! Entities map to untyped [`Record`]s, reads are expressed as [`Query`]
//! values and writes as batches of [`Change`]s handed to a [`Session`].
//! [`MemoryStore`] is the in-process backend; the MySQL backend lives in
//! the infrastructure crate.

pub mod memory;
pub mod query;
pub mod record;
pub mod schema;
pub mod seed;
pub mod session;
pub mod value;

pub use memory::{MemorySession, MemoryStore};
pub use query::{Case, Direction, Filter, Query};
pub use record::{Entity, Record};
pub use schema::{Column, ColumnKind, ForeignKey, OnDelete, Table};
pub use session::{Change, ParentLink, Session};
pub use value::{FromValue, Value};
