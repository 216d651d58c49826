//! Composable row predicates, ordering and limits

use std::cmp::Ordering;

use super::record::Record;
use super::schema::Table;
use super::value::Value;
use crate::errors::StoreError;

/// Case handling for substring matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    IsNull(&'static str),
    Contains {
        column: &'static str,
        needle: String,
        case: Case,
    },
    /// Inclusive on both ends
    Between {
        column: &'static str,
        low: Value,
        high: Value,
    },
    /// An empty list matches nothing
    In(&'static str, Vec<Value>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn is_null(column: &'static str) -> Self {
        Filter::IsNull(column)
    }

    pub fn contains(column: &'static str, needle: impl Into<String>, case: Case) -> Self {
        Filter::Contains {
            column,
            needle: needle.into(),
            case,
        }
    }

    pub fn between(column: &'static str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Filter::Between {
            column,
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn in_list<V: Into<Value>>(column: &'static str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column, values.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Eq(column, value) => record.value(column).sql_eq(value),
            Filter::IsNull(column) => record.value(column).is_null(),
            Filter::Contains {
                column,
                needle,
                case,
            } => match record.value(column) {
                Value::Text(text) => match case {
                    Case::Sensitive => text.contains(needle.as_str()),
                    Case::Insensitive => text.to_lowercase().contains(&needle.to_lowercase()),
                },
                _ => false,
            },
            Filter::Between { column, low, high } => {
                let value = record.value(column);
                matches!(
                    value.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(value.compare(high), Some(Ordering::Less | Ordering::Equal))
            }
            Filter::In(column, values) => {
                let value = record.value(column);
                values.iter().any(|candidate| value.sql_eq(candidate))
            }
            Filter::And(parts) => parts.iter().all(|f| f.matches(record)),
            Filter::Or(parts) => parts.iter().any(|f| f.matches(record)),
        }
    }

    fn collect_columns(&self, out: &mut Vec<&'static str>) {
        match self {
            Filter::Eq(column, _)
            | Filter::IsNull(column)
            | Filter::Contains { column, .. }
            | Filter::Between { column, .. }
            | Filter::In(column, _) => out.push(*column),
            Filter::And(parts) | Filter::Or(parts) => {
                for part in parts {
                    part.collect_columns(out);
                }
            }
        }
    }
}

/// A read against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filter: Option<Filter>,
    pub order: Vec<(&'static str, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            filter: None,
            order: Vec::new(),
            limit: None,
        }
    }

    /// Adds a predicate; repeated calls are combined with AND
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rejects column names the table does not declare
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut columns = Vec::new();
        if let Some(filter) = &self.filter {
            filter.collect_columns(&mut columns);
        }
        columns.extend(self.order.iter().map(|(column, _)| *column));

        match columns.into_iter().find(|c| !self.table.has_column(c)) {
            Some(column) => Err(StoreError::UnknownColumn {
                table: self.table,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(record))
    }

    /// Sorts by the requested columns, then by id for a stable result
    pub fn sort(&self, rows: &mut [Record]) {
        rows.sort_by(|a, b| {
            for (column, direction) in &self.order {
                let ordering = a.value(column).sort_cmp(&b.value(column));
                let ordering = match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.id.cmp(&b.id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: i64, name: &str, sku: Option<&str>) -> Record {
        Record::with_id(Table::Products, id)
            .with("name", name)
            .with("sku", sku)
            .with("price", dec!(10.00))
    }

    #[test]
    fn test_contains_respects_case_mode() {
        let row = product(1, "Laptop", Some("LAP001"));
        assert!(Filter::contains("name", "lap", Case::Insensitive).matches(&row));
        assert!(!Filter::contains("name", "lap", Case::Sensitive).matches(&row));
        assert!(Filter::contains("name", "Lap", Case::Sensitive).matches(&row));
        assert!(!Filter::contains("description", "x", Case::Insensitive).matches(&row));
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let row = product(1, "Laptop", None);
        assert!(!Filter::in_list::<i64>("id", []).matches(&row));
        assert!(Filter::in_list("id", [3i64, 1]).matches(&row));
    }

    #[test]
    fn test_between_is_inclusive() {
        let row = product(5, "Desk", None);
        assert!(Filter::between("price", dec!(10.00), dec!(20.00)).matches(&row));
        assert!(Filter::between("price", dec!(5.00), dec!(10.00)).matches(&row));
        assert!(!Filter::between("price", dec!(10.01), dec!(20.00)).matches(&row));
    }

    #[test]
    fn test_eq_against_null_column_is_false() {
        let row = product(1, "Laptop", None);
        assert!(!Filter::eq("sku", Value::Null).matches(&row));
        assert!(Filter::is_null("sku").matches(&row));
    }

    #[test]
    fn test_validate_rejects_unknown_columns() {
        let query = Query::new(Table::Products)
            .filter(Filter::eq("name", "x"))
            .order_by("colour", Direction::Asc);
        assert!(matches!(
            query.validate(),
            Err(StoreError::UnknownColumn { ref column, .. }) if column == "colour"
        ));
        assert!(Query::new(Table::Products).order_by("id", Direction::Desc).validate().is_ok());
    }

    #[test]
    fn test_sort_descending_with_id_tiebreak() {
        let query = Query::new(Table::Products).order_by("price", Direction::Desc);
        let mut rows = vec![
            product(2, "b", None),
            product(1, "a", None).with("price", dec!(50.00)),
            product(3, "c", None),
        ];
        query.sort(&mut rows);
        let ids: Vec<_> = rows.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
