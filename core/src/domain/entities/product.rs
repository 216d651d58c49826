//! Product entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, now};
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Two decimal places
    pub price: Decimal,
    /// Unique when present
    pub sku: Option<String>,
    pub category_id: i64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal, category_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            price: money(price),
            sku: None,
            category_id,
            stock_quantity: 0,
            is_active: true,
            created_at: now(),
            updated_at: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_stock(mut self, stock_quantity: i32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(now());
    }
}

impl Entity for Product {
    const TABLE: Table = Table::Products;

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
            .with("price", money(self.price))
            .with("sku", self.sku.clone())
            .with("category_id", self.category_id)
            .with("stock_quantity", self.stock_quantity)
            .with("is_active", self.is_active)
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            name: record.take("name")?,
            description: record.take("description")?,
            price: record.take("price")?,
            sku: record.take("sku")?,
            category_id: record.take("category_id")?,
            stock_quantity: record.take("stock_quantity")?,
            is_active: record.take("is_active")?,
            created_at: record.take("created_at")?,
            updated_at: record.take("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_is_rounded_to_cents() {
        let product = Product::new("Hammer", dec!(9.994), 1);
        assert_eq!(product.price, dec!(9.99));
        assert_eq!(product.price.scale(), 2);
    }
}
