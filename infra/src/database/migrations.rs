//! Schema creation and seeding
//!
//! Tables are created from the shared schema declarations, so the MySQL
//! schema enforces exactly the keys and delete rules the in-memory store
//! does. Text uses a binary collation: equality and unique keys are
//! case-sensitive on both backends.

use sf_core::store::{seed, ColumnKind, OnDelete, Table};
use sqlx::{Executor, MySqlConnection};

use super::errors::store_error;
use super::session::bind_all;
use super::sql::{insert, quote};
use crate::InfrastructureError;

fn column_type(kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Int => "BIGINT".to_string(),
        ColumnKind::Text(max) => format!("VARCHAR({})", max),
        ColumnKind::Bool => "TINYINT(1)".to_string(),
        ColumnKind::Decimal => "DECIMAL(18,2)".to_string(),
        ColumnKind::Timestamp => "DATETIME(6)".to_string(),
    }
}

/// `CREATE TABLE IF NOT EXISTS` for one table
pub fn create_table(table: Table) -> String {
    let mut lines = vec!["`id` BIGINT NOT NULL AUTO_INCREMENT".to_string()];
    for column in table.columns() {
        lines.push(format!(
            "{} {} {}",
            quote(column.name),
            column_type(column.kind),
            if column.nullable { "NULL" } else { "NOT NULL" }
        ));
    }
    lines.push("PRIMARY KEY (`id`)".to_string());

    for key in table.unique_keys() {
        let columns: Vec<String> = key.iter().map(|c| quote(c)).collect();
        lines.push(format!(
            "UNIQUE KEY {} ({})",
            quote(&format!("uq_{}_{}", table.name(), key.join("_"))),
            columns.join(", ")
        ));
    }
    for fk in table.foreign_keys() {
        let rule = match fk.on_delete {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
        };
        lines.push(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} (`id`) ON DELETE {}",
            quote(&format!("fk_{}_{}", table.name(), fk.column)),
            quote(fk.column),
            quote(fk.references.name()),
            rule
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin",
        quote(table.name()),
        lines.join(",\n    ")
    )
}

/// Creates any missing table, then inserts the seed rows that are not
/// already present. Safe to run on every startup.
pub async fn run(conn: &mut MySqlConnection) -> Result<(), InfrastructureError> {
    for table in Table::ALL {
        (&mut *conn)
            .execute(create_table(table).as_str())
            .await
            .map_err(|e| InfrastructureError::Migration(format!("{}: {}", table, e)))?;
        tracing::debug!(%table, "Table ready");
    }

    let mut seeded = 0;
    for record in seed::seed_records() {
        let statement = insert(&record, true);
        let result = bind_all(sqlx::query(&statement.sql), &statement.params)
            .execute(&mut *conn)
            .await
            .map_err(|e| store_error(record.table, e))?;
        seeded += result.rows_affected();
    }
    tracing::info!(tables = Table::ALL.len(), seeded, "Migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles_table() {
        let ddl = create_table(Table::UserRoles);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS `user_roles` ("));
        assert!(ddl.contains("`id` BIGINT NOT NULL AUTO_INCREMENT"));
        assert!(ddl.contains("`revoked_at` DATETIME(6) NULL"));
        assert!(ddl.contains("UNIQUE KEY `uq_user_roles_user_id_role_id` (`user_id`, `role_id`)"));
        assert!(ddl.contains(
            "CONSTRAINT `fk_user_roles_user_id` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE"
        ));
        assert!(ddl.ends_with("COLLATE=utf8mb4_bin"));
    }

    #[test]
    fn test_products_table() {
        let ddl = create_table(Table::Products);
        assert!(ddl.contains("`price` DECIMAL(18,2) NOT NULL"));
        assert!(ddl.contains("`sku` VARCHAR(50) NULL"));
        assert!(ddl.contains("`is_active` TINYINT(1) NOT NULL"));
        assert!(ddl.contains("REFERENCES `categories` (`id`) ON DELETE RESTRICT"));
    }

    #[test]
    fn test_every_table_has_ddl() {
        for table in Table::ALL {
            assert!(create_table(table).contains(&format!("`{}`", table.name())));
        }
    }
}
