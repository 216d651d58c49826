//! Category repository. Detail reads attach the parent and direct children.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::Category;
use crate::domain::value_objects::CategoryDetails;
use crate::errors::StoreError;
use crate::repositories::generic::{Queryable, Repository};
use crate::repositories::unit_of_work::{Staged, UnitOfWork};
use crate::store::{Filter, Table};

pub struct CategoryRepository<'u> {
    uow: &'u mut UnitOfWork,
}

impl<'u> CategoryRepository<'u> {
    pub(crate) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self { uow }
    }

    fn base(&mut self) -> Repository<'_, Category> {
        Repository::new(self.uow)
    }

    pub async fn get_all(&mut self) -> Result<Vec<Category>, StoreError> {
        self.base().get_all().await
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<CategoryDetails>, StoreError> {
        let category = self.base().get_by_id(id).await?;
        self.attach_one(category).await
    }

    pub fn add(&mut self, category: Category) -> Result<Staged<Category>, StoreError> {
        self.base().add(category)
    }

    pub fn update(&mut self, category: Category) -> Result<Category, StoreError> {
        self.base().update(category)
    }

    /// Deleting a category that still has children or products fails at
    /// save time; it never cascades.
    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().delete(id).await
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, StoreError> {
        self.base().exists(id).await
    }

    pub fn query(&mut self) -> Queryable<'_, Category> {
        Queryable::new(self.uow)
    }

    /// Categories without a parent, with their children attached
    pub async fn get_main_categories(&mut self) -> Result<Vec<CategoryDetails>, StoreError> {
        let categories = self
            .query()
            .filter(Filter::is_null("parent_category_id"))
            .fetch_all()
            .await?;
        self.attach(categories).await
    }

    /// Direct children only
    pub async fn get_sub_categories(&mut self, parent_id: i64) -> Result<Vec<Category>, StoreError> {
        self.query()
            .filter(Filter::eq("parent_category_id", parent_id))
            .fetch_all()
            .await
    }

    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<CategoryDetails>, StoreError> {
        let category = self.query().filter(Filter::eq("name", name)).first().await?;
        self.attach_one(category).await
    }

    async fn attach_one(&mut self, category: Option<Category>) -> Result<Option<CategoryDetails>, StoreError> {
        match category {
            Some(category) => Ok(self.attach(vec![category]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn attach(&mut self, categories: Vec<Category>) -> Result<Vec<CategoryDetails>, StoreError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        let parent_ids: BTreeSet<i64> = categories
            .iter()
            .filter_map(|c| c.parent_category_id)
            .collect();

        let parents: HashMap<i64, Category> = self
            .query()
            .filter(Filter::in_list("id", parent_ids))
            .fetch_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let mut children: HashMap<i64, Vec<Category>> = HashMap::new();
        for child in self
            .query()
            .filter(Filter::in_list("parent_category_id", ids))
            .fetch_all()
            .await?
        {
            if let Some(parent_id) = child.parent_category_id {
                children.entry(parent_id).or_default().push(child);
            }
        }

        categories
            .into_iter()
            .map(|category| {
                let parent = match category.parent_category_id {
                    Some(parent_id) => Some(parents.get(&parent_id).cloned().ok_or(
                        StoreError::MissingRow {
                            table: Table::Categories,
                            id: parent_id,
                        },
                    )?),
                    None => None,
                };
                Ok(CategoryDetails {
                    sub_categories: children.remove(&category.id).unwrap_or_default(),
                    parent,
                    category,
                })
            })
            .collect()
    }
}
