//! Translation of MySQL failures into store errors

use sf_core::errors::{ConstraintKind, StoreError};
use sf_core::store::Table;
use sqlx::mysql::MySqlDatabaseError;

// MySQL server error numbers
const ER_DUP_ENTRY: u16 = 1062;
const ER_BAD_NULL_ERROR: u16 = 1048;
const ER_NO_DEFAULT_FOR_FIELD: u16 = 1364;
const ER_DATA_TOO_LONG: u16 = 1406;
const ER_ROW_IS_REFERENCED: u16 = 1451;
const ER_NO_REFERENCED_ROW: u16 = 1452;

/// Constraint kind for a MySQL error number, if it is an integrity error
pub fn constraint_kind(number: u16, message: &str) -> Option<ConstraintKind> {
    match number {
        ER_DUP_ENTRY if message.contains("'PRIMARY'") || message.contains(".PRIMARY'") => {
            Some(ConstraintKind::PrimaryKey)
        }
        ER_DUP_ENTRY => Some(ConstraintKind::Unique),
        ER_ROW_IS_REFERENCED | ER_NO_REFERENCED_ROW => Some(ConstraintKind::ForeignKey),
        ER_BAD_NULL_ERROR | ER_NO_DEFAULT_FOR_FIELD => Some(ConstraintKind::NotNull),
        ER_DATA_TOO_LONG => Some(ConstraintKind::Length),
        _ => None,
    }
}

/// Maps a failed statement against `table` to a [`StoreError`]
pub fn store_error(table: Table, error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if let Some(mysql) = db_error.try_downcast_ref::<MySqlDatabaseError>() {
            if let Some(kind) = constraint_kind(mysql.number(), mysql.message()) {
                tracing::warn!(%table, %kind, code = mysql.number(), "Constraint violation");
                return StoreError::constraint(kind, table, mysql.message());
            }
        }
    }
    tracing::error!(%table, error = %error, "Database statement failed");
    StoreError::backend(error)
}

/// Maps a failure outside any particular table (pooling, transactions)
pub fn connection_error(error: sqlx::Error) -> StoreError {
    tracing::error!(error = %error, "Database connection failed");
    StoreError::backend(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_kinds() {
        assert_eq!(
            constraint_kind(1062, "Duplicate entry 'a@b.com' for key 'users.uq_users_email'"),
            Some(ConstraintKind::Unique)
        );
        assert_eq!(
            constraint_kind(1062, "Duplicate entry '1' for key 'users.PRIMARY'"),
            Some(ConstraintKind::PrimaryKey)
        );
        assert_eq!(constraint_kind(1451, ""), Some(ConstraintKind::ForeignKey));
        assert_eq!(constraint_kind(1452, ""), Some(ConstraintKind::ForeignKey));
        assert_eq!(constraint_kind(1048, ""), Some(ConstraintKind::NotNull));
        assert_eq!(constraint_kind(1406, ""), Some(ConstraintKind::Length));
        assert_eq!(constraint_kind(1213, "Deadlock found"), None);
    }
}
