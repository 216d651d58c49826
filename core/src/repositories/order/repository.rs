//! Order repository. Detail reads attach the ordering user and every line
//! with its product.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::entities::{Order, OrderItem, Product, User};
use crate::domain::value_objects::{OrderDetails, OrderLine};
use crate::errors::StoreError;
use crate::repositories::generic::{Queryable, Repository};
use crate::repositories::unit_of_work::{Staged, UnitOfWork};
use crate::store::{Direction, Entity, Filter, Table};

pub struct OrderRepository<'u> {
    uow: &'u mut UnitOfWork,
}

impl<'u> OrderRepository<'u> {
    pub(crate) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self { uow }
    }

    fn base(&mut self) -> Repository<'_, Order> {
        Repository::new(self.uow)
    }

    pub async fn get_all(&mut self) -> Result<Vec<Order>, StoreError> {
        self.base().get_all().await
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<OrderDetails>, StoreError> {
        let order = self.base().get_by_id(id).await?;
        self.attach_one(order).await
    }

    pub fn add(&mut self, order: Order) -> Result<Staged<Order>, StoreError> {
        self.base().add(order)
    }

    pub fn update(&mut self, order: Order) -> Result<Order, StoreError> {
        self.base().update(order)
    }

    /// Removes the order and, on save, its items with it
    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().delete(id).await
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().exists(id).await
    }

    pub fn query(&mut self) -> Queryable<'_, Order> {
        Queryable::new(self.uow)
    }

    /// Newest first
    pub async fn get_by_user(&mut self, user_id: i64) -> Result<Vec<OrderDetails>, StoreError> {
        let orders = self
            .query()
            .filter(Filter::eq("user_id", user_id))
            .order_by("order_date", Direction::Desc)
            .fetch_all()
            .await?;
        self.attach(orders).await
    }

    pub async fn get_by_order_number(
        &mut self,
        order_number: &str,
    ) -> Result<Option<OrderDetails>, StoreError> {
        let order = self
            .query()
            .filter(Filter::eq("order_number", order_number))
            .first()
            .await?;
        self.attach_one(order).await
    }

    pub async fn get_by_status(&mut self, status: &str) -> Result<Vec<OrderDetails>, StoreError> {
        let orders = self
            .query()
            .filter(Filter::eq("status", status))
            .fetch_all()
            .await?;
        self.attach(orders).await
    }

    /// Orders placed within `[start, end]`, both ends inclusive
    pub async fn get_by_date_range(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderDetails>, StoreError> {
        let orders = self
            .query()
            .filter(Filter::between("order_date", start, end))
            .fetch_all()
            .await?;
        self.attach(orders).await
    }

    /// Stages an order and its items in one batch; the items receive the
    /// order's id when the batch is applied.
    pub fn add_with_items(
        &mut self,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<Staged<Order>, StoreError> {
        let position = self.uow.next_position();
        let staged = self.add(order)?;
        for item in items {
            let mut record = item.to_record();
            record.id = None;
            self.uow.stage_child(record, position, "order_id")?;
        }
        Ok(staged)
    }

    async fn attach_one(&mut self, order: Option<Order>) -> Result<Option<OrderDetails>, StoreError> {
        match order {
            Some(order) => Ok(self.attach(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Three queries regardless of how many orders are attached
    async fn attach(&mut self, orders: Vec<Order>) -> Result<Vec<OrderDetails>, StoreError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let user_ids: BTreeSet<i64> = orders.iter().map(|o| o.user_id).collect();

        let users: HashMap<i64, User> = Queryable::<User>::new(self.uow)
            .filter(Filter::in_list("id", user_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let items = Queryable::<OrderItem>::new(self.uow)
            .filter(Filter::in_list("order_id", order_ids))
            .fetch_all()
            .await?;
        let product_ids: BTreeSet<i64> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<i64, Product> = Queryable::<Product>::new(self.uow)
            .filter(Filter::in_list("id", product_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for item in items {
            let product = products
                .get(&item.product_id)
                .cloned()
                .ok_or(StoreError::MissingRow {
                    table: Table::Products,
                    id: item.product_id,
                })?;
            lines
                .entry(item.order_id)
                .or_default()
                .push(OrderLine { item, product });
        }

        orders
            .into_iter()
            .map(|order| {
                let user = users.get(&order.user_id).cloned().ok_or(StoreError::MissingRow {
                    table: Table::Users,
                    id: order.user_id,
                })?;
                Ok(OrderDetails {
                    items: lines.remove(&order.id).unwrap_or_default(),
                    user,
                    order,
                })
            })
            .collect()
    }
}
