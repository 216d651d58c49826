//! Orders and the line items they own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, now};
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

/// Well-known order states. Stored as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: i64,
    /// Unique human-facing order reference
    pub order_number: String,
    pub user_id: i64,
    pub total_amount: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub order_date: DateTime<Utc>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
}

impl Order {
    /// A pending order with zero amounts
    pub fn new(order_number: impl Into<String>, user_id: i64) -> Self {
        Self {
            id: 0,
            order_number: order_number.into(),
            user_id,
            total_amount: money(Decimal::ZERO),
            tax_amount: money(Decimal::ZERO),
            shipping_amount: money(Decimal::ZERO),
            status: OrderStatus::Pending.as_str().to_string(),
            notes: None,
            order_date: now(),
            shipped_date: None,
            delivered_date: None,
        }
    }

    pub fn with_amounts(mut self, total: Decimal, tax: Decimal, shipping: Decimal) -> Self {
        self.total_amount = money(total);
        self.tax_amount = money(tax);
        self.shipping_amount = money(shipping);
        self
    }

    pub fn with_order_date(mut self, order_date: DateTime<Utc>) -> Self {
        self.order_date = order_date;
        self
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        let at = now();
        match status {
            OrderStatus::Shipped => self.shipped_date = Some(at),
            OrderStatus::Delivered => self.delivered_date = Some(at),
            _ => {}
        }
        self.status = status.as_str().to_string();
    }
}

impl Entity for Order {
    const TABLE: Table = Table::Orders;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("order_number", &self.order_number)
            .with("user_id", self.user_id)
            .with("total_amount", money(self.total_amount))
            .with("tax_amount", money(self.tax_amount))
            .with("shipping_amount", money(self.shipping_amount))
            .with("status", &self.status)
            .with("notes", self.notes.clone())
            .with("order_date", self.order_date)
            .with("shipped_date", self.shipped_date)
            .with("delivered_date", self.delivered_date)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            order_number: record.take("order_number")?,
            user_id: record.take("user_id")?,
            total_amount: record.take("total_amount")?,
            tax_amount: record.take("tax_amount")?,
            shipping_amount: record.take("shipping_amount")?,
            status: record.take("status")?,
            notes: record.take("notes")?,
            order_date: record.take("order_date")?,
            shipped_date: record.take("shipped_date")?,
            delivered_date: record.take("delivered_date")?,
        })
    }
}

/// One line of an order. Deleted together with its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl OrderItem {
    /// Line for a product; the total is `quantity * unit_price`. The order
    /// id is filled in when the item is staged with its order.
    pub fn new(product_id: i64, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            id: 0,
            order_id: 0,
            product_id,
            quantity,
            unit_price: money(unit_price),
            total_price: money(unit_price * Decimal::from(quantity)),
        }
    }
}

impl Entity for OrderItem {
    const TABLE: Table = Table::OrderItems;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("order_id", self.order_id)
            .with("product_id", self.product_id)
            .with("quantity", self.quantity)
            .with("unit_price", money(self.unit_price))
            .with("total_price", money(self.total_price))
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            order_id: record.take("order_id")?,
            product_id: record.take("product_id")?,
            quantity: record.take("quantity")?,
            unit_price: record.take("unit_price")?,
            total_price: record.take("total_price")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_item_total_is_exact() {
        let item = OrderItem::new(1, 3, dec!(0.10));
        assert_eq!(item.total_price, dec!(0.30));
    }

    #[test]
    fn test_status_transitions_stamp_dates() {
        let mut order = Order::new("ORD-1", 1);
        assert_eq!(order.status, "Pending");
        order.set_status(OrderStatus::Shipped);
        assert_eq!(order.status, "Shipped");
        assert!(order.shipped_date.is_some());
        assert!(order.delivered_date.is_none());
    }
}
