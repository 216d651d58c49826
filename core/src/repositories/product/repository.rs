//! Product repository. Every read except `get_all` attaches the category.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{Category, Product};
use crate::domain::value_objects::ProductDetails;
use crate::errors::StoreError;
use crate::repositories::generic::{Queryable, Repository};
use crate::repositories::unit_of_work::{Staged, UnitOfWork};
use crate::store::{Case, Filter, Table};

pub struct ProductRepository<'u> {
    uow: &'u mut UnitOfWork,
}

impl<'u> ProductRepository<'u> {
    pub(crate) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self { uow }
    }

    fn base(&mut self) -> Repository<'_, Product> {
        Repository::new(self.uow)
    }

    pub async fn get_all(&mut self) -> Result<Vec<Product>, StoreError> {
        self.base().get_all().await
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<ProductDetails>, StoreError> {
        let product = self.base().get_by_id(id).await?;
        self.attach_one(product).await
    }

    pub fn add(&mut self, product: Product) -> Result<Staged<Product>, StoreError> {
        self.base().add(product)
    }

    pub fn update(&mut self, product: Product) -> Result<Product, StoreError> {
        self.base().update(product)
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().delete(id).await
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().exists(id).await
    }

    pub fn query(&mut self) -> Queryable<'_, Product> {
        Queryable::new(self.uow)
    }

    pub async fn get_by_category(&mut self, category_id: i64) -> Result<Vec<ProductDetails>, StoreError> {
        let products = self
            .query()
            .filter(Filter::eq("category_id", category_id))
            .fetch_all()
            .await?;
        self.attach(products).await
    }

    pub async fn get_active_products(&mut self) -> Result<Vec<ProductDetails>, StoreError> {
        let products = self
            .query()
            .filter(Filter::eq("is_active", true))
            .fetch_all()
            .await?;
        self.attach(products).await
    }

    /// Exact SKU match
    pub async fn get_by_sku(&mut self, sku: &str) -> Result<Option<ProductDetails>, StoreError> {
        let product = self.query().filter(Filter::eq("sku", sku)).first().await?;
        self.attach_one(product).await
    }

    /// Case-insensitive substring match on name, description or SKU
    pub async fn search(&mut self, term: &str) -> Result<Vec<ProductDetails>, StoreError> {
        self.search_with_case(term, Case::Insensitive).await
    }

    pub async fn search_with_case(
        &mut self,
        term: &str,
        case: Case,
    ) -> Result<Vec<ProductDetails>, StoreError> {
        let matches = Filter::contains("name", term, case)
            .or(Filter::contains("description", term, case))
            .or(Filter::contains("sku", term, case));
        let products = self.query().filter(matches).fetch_all().await?;
        self.attach(products).await
    }

    async fn attach_one(&mut self, product: Option<Product>) -> Result<Option<ProductDetails>, StoreError> {
        match product {
            Some(product) => Ok(self.attach(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn attach(&mut self, products: Vec<Product>) -> Result<Vec<ProductDetails>, StoreError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let category_ids: BTreeSet<i64> = products.iter().map(|p| p.category_id).collect();
        let categories: HashMap<i64, Category> = Queryable::<Category>::new(self.uow)
            .filter(Filter::in_list("id", category_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        products
            .into_iter()
            .map(|product| {
                let category = categories
                    .get(&product.category_id)
                    .cloned()
                    .ok_or(StoreError::MissingRow {
                        table: Table::Categories,
                        id: product.category_id,
                    })?;
                Ok(ProductDetails { product, category })
            })
            .collect()
    }
}
