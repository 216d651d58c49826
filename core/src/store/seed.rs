//! Fixed rows present after first initialisation of any store

use rust_decimal::Decimal;

use super::record::{Entity, Record};
use crate::domain::entities::{Category, Product, Role, User};

pub fn categories() -> Vec<Category> {
    [
        (1, "Electronics", "Electronic devices and gadgets"),
        (2, "Books", "Books and literature"),
        (3, "Clothing", "Clothing and accessories"),
        (4, "Home & Garden", "Home and garden items"),
    ]
    .into_iter()
    .map(|(id, name, description)| {
        let mut category = Category::new(name).with_description(description);
        category.id = id;
        category
    })
    .collect()
}

pub fn roles() -> Vec<Role> {
    [
        (1, "Admin", "System administrator"),
        (2, "User", "Regular user"),
        (3, "Manager", "Manager role"),
    ]
    .into_iter()
    .map(|(id, name, description)| {
        let mut role = Role::new(name).with_description(description);
        role.id = id;
        role
    })
    .collect()
}

pub fn users() -> Vec<User> {
    let mut john = User::new("John", "Doe", "john.doe@example.com").with_phone("123-456-7890");
    john.id = 1;
    let mut jane = User::new("Jane", "Smith", "jane.smith@example.com").with_phone("098-765-4321");
    jane.id = 2;
    vec![john, jane]
}

pub fn products() -> Vec<Product> {
    let mut laptop = Product::new("Laptop", Decimal::new(99999, 2), 1)
        .with_description("High-performance laptop")
        .with_sku("LAP001")
        .with_stock(50);
    laptop.id = 1;
    let mut book = Product::new("Programming Book", Decimal::new(2999, 2), 2)
        .with_description("Learn programming fundamentals")
        .with_sku("BOOK001")
        .with_stock(100);
    book.id = 2;
    vec![laptop, book]
}

/// Every seed row in dependency order, ids included
pub fn seed_records() -> Vec<Record> {
    let mut records = Vec::new();
    records.extend(categories().iter().map(Entity::to_record));
    records.extend(roles().iter().map(Entity::to_record));
    records.extend(users().iter().map(Entity::to_record));
    records.extend(products().iter().map(Entity::to_record));
    records
}
