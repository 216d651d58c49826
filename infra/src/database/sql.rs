//! SQL text generation for the MySQL session
//!
//! Every statement uses `?` placeholders; the values to bind are returned
//! alongside the text in the order they must be bound.

use sf_core::store::{Case, Direction, Filter, Query, Record, Table, Value};

/// SQL text plus the values for its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

pub fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// `id` followed by every declared column, in schema order
pub fn column_list(table: Table) -> String {
    std::iter::once("id")
        .chain(table.columns().iter().map(|c| c.name))
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select(query: &Query) -> Statement {
    let mut params = Vec::new();
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list(query.table),
        quote(query.table.name())
    );
    push_where(&mut sql, &mut params, query);

    let mut order: Vec<String> = query
        .order
        .iter()
        .map(|(column, direction)| {
            let keyword = match direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", quote(column), keyword)
        })
        .collect();
    order.push("`id` ASC".to_string());
    sql.push_str(" ORDER BY ");
    sql.push_str(&order.join(", "));

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    Statement { sql, params }
}

/// Row count for the query's filter; ordering and limit are ignored
pub fn count(query: &Query) -> Statement {
    let mut params = Vec::new();
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote(query.table.name()));
    push_where(&mut sql, &mut params, query);
    Statement { sql, params }
}

/// Inserts the record. The id column is only written when the record
/// already carries one. `ignore` skips rows whose key already exists.
pub fn insert(record: &Record, ignore: bool) -> Statement {
    let mut columns = Vec::new();
    let mut params = Vec::new();
    if let Some(id) = record.id {
        columns.push(quote("id"));
        params.push(Value::Int(id));
    }
    for column in record.table.columns() {
        columns.push(quote(column.name));
        params.push(record.value(column.name));
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    let verb = if ignore { "INSERT IGNORE" } else { "INSERT" };
    Statement {
        sql: format!(
            "{} INTO {} ({}) VALUES ({})",
            verb,
            quote(record.table.name()),
            columns.join(", "),
            placeholders
        ),
        params,
    }
}

/// Full replacement of every declared column
pub fn update(record: &Record, id: i64) -> Statement {
    let mut params = Vec::new();
    let assignments: Vec<String> = record
        .table
        .columns()
        .iter()
        .map(|column| {
            params.push(record.value(column.name));
            format!("{} = ?", quote(column.name))
        })
        .collect();
    params.push(Value::Int(id));
    Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE `id` = ?",
            quote(record.table.name()),
            assignments.join(", ")
        ),
        params,
    }
}

pub fn delete(table: Table, id: i64) -> Statement {
    Statement {
        sql: format!("DELETE FROM {} WHERE `id` = ?", quote(table.name())),
        params: vec![Value::Int(id)],
    }
}

pub fn row_exists(table: Table, id: i64) -> Statement {
    Statement {
        sql: format!("SELECT COUNT(*) FROM {} WHERE `id` = ?", quote(table.name())),
        params: vec![Value::Int(id)],
    }
}

fn push_where(sql: &mut String, params: &mut Vec<Value>, query: &Query) {
    if let Some(filter) = &query.filter {
        sql.push_str(" WHERE ");
        sql.push_str(&render(filter, params));
    }
}

fn render(filter: &Filter, params: &mut Vec<Value>) -> String {
    match filter {
        Filter::Eq(column, value) => {
            params.push(value.clone());
            format!("{} = ?", quote(column))
        }
        Filter::IsNull(column) => format!("{} IS NULL", quote(column)),
        Filter::Contains {
            column,
            needle,
            case,
        } => {
            params.push(Value::Text(format!("%{}%", escape_like(needle))));
            match case {
                Case::Sensitive => format!("{} LIKE ?", quote(column)),
                Case::Insensitive => format!("LOWER({}) LIKE LOWER(?)", quote(column)),
            }
        }
        Filter::Between { column, low, high } => {
            params.push(low.clone());
            params.push(high.clone());
            format!("{} BETWEEN ? AND ?", quote(column))
        }
        Filter::In(_, values) if values.is_empty() => "1 = 0".to_string(),
        Filter::In(column, values) => {
            params.extend(values.iter().cloned());
            format!("{} IN ({})", quote(column), vec!["?"; values.len()].join(", "))
        }
        Filter::And(parts) => join(parts, " AND ", "1 = 1", params),
        Filter::Or(parts) => join(parts, " OR ", "1 = 0", params),
    }
}

fn join(parts: &[Filter], separator: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|part| render(part, params)).collect();
    format!("({})", rendered.join(separator))
}

/// Escapes LIKE wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
