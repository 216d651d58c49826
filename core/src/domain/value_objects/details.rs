//! Aggregates returned by eager repository reads.
//!
//! Every related entity is attached before the aggregate is handed out;
//! there is no lazy loading and no partially filled variant.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Category, Order, OrderItem, Product, Role, User, UserProfile, UserRole,
};

/// A role assignment together with the role it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedRole {
    pub assignment: UserRole,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<AssignedRole>,
    pub profile: Option<UserProfile>,
}

impl UserDetails {
    /// Names of the roles granted by active assignments
    pub fn active_role_names(&self) -> Vec<&str> {
        self.roles
            .iter()
            .filter(|r| r.assignment.is_active)
            .map(|r| r.role.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetails {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Option<Category>,
    pub sub_categories: Vec<Category>,
}

/// An order line with its product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub user: User,
    pub items: Vec<OrderLine>,
}
