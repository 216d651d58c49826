use std::fmt::Debug;

use rust_decimal_macros::dec;

use super::seeded;
use crate::domain::entities::{
    Category, Order, OrderItem, Product, Role, User, UserProfile, UserRole,
};
use crate::errors::{ConstraintKind, StoreError};
use crate::repositories::{Repository, UnitOfWork};
use crate::store::{Direction, Entity, Filter, Table};

async fn round_trip<T: Entity + PartialEq + Debug>(uow: &mut UnitOfWork, entity: T) -> T {
    let staged = Repository::<T>::new(uow).add(entity.clone()).unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 1);

    let saved = uow.persisted(&staged).expect("id assigned on save");
    assert!(saved.id() > 0);

    let loaded = Repository::<T>::new(uow).get_by_id(saved.id()).await.unwrap();
    let mut expected = entity;
    expected.set_id(saved.id());
    assert_eq!(loaded.as_ref(), Some(&expected));
    saved
}

#[tokio::test]
async fn test_add_save_get_round_trips_every_entity() {
    let (_store, mut uow) = seeded().await;

    let user = round_trip(&mut uow, User::new("Ada", "Lovelace", "ada@example.com")).await;
    let role = round_trip(&mut uow, Role::new("Auditor").with_description("Reads books")).await;
    round_trip(&mut uow, UserRole::new(user.id, role.id)).await;
    let mut profile = UserProfile::new(user.id);
    profile.company = Some("Analytical Engines".to_string());
    round_trip(&mut uow, profile).await;

    let category = round_trip(&mut uow, Category::new("Tools").with_parent(4)).await;
    let product = round_trip(
        &mut uow,
        Product::new("Drill", dec!(49.90), category.id).with_sku("DRL01").with_stock(3),
    )
    .await;
    let order = round_trip(
        &mut uow,
        Order::new("ORD-100", user.id).with_amounts(dec!(54.89), dec!(4.99), dec!(0.00)),
    )
    .await;
    let mut item = OrderItem::new(product.id, 1, dec!(49.90));
    item.order_id = order.id;
    round_trip(&mut uow, item).await;
}

#[tokio::test]
async fn test_store_assigns_ids_after_seed_rows() {
    let (_store, mut uow) = seeded().await;
    let staged = uow.categories().add(Category::new("Toys")).unwrap();
    assert_eq!(staged.entity().id, 0);
    assert!(uow.persisted(&staged).is_none());

    uow.save_changes().await.unwrap();
    assert_eq!(uow.persisted(&staged).unwrap().id, 5);
}

#[tokio::test]
async fn test_get_by_id_absent_is_none() {
    let (_store, mut uow) = seeded().await;
    assert!(uow.users().get_by_id(999).await.unwrap().is_none());
    assert!(uow.roles().get_by_id(999).await.unwrap().is_none());
    assert!(!uow.products().exists(999).await.unwrap());
    assert!(uow.products().exists(1).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_row_returns_false_and_stages_nothing() {
    let (_store, mut uow) = seeded().await;
    assert!(!uow.products().delete(12345).await.unwrap());
    assert!(!uow.has_pending_changes());
    assert_eq!(uow.save_changes().await.unwrap(), 0);
}

#[tokio::test]
async fn test_repository_writes_wait_for_save() {
    let (store, mut uow) = seeded().await;
    uow.roles().add(Role::new("Support")).unwrap();
    assert!(uow.has_pending_changes());
    assert_eq!(store.row_count(Table::Roles).await, 3);

    uow.save_changes().await.unwrap();
    assert_eq!(store.row_count(Table::Roles).await, 4);
}

#[tokio::test]
async fn test_update_replaces_whole_row() {
    let (_store, mut uow) = seeded().await;
    let mut laptop = uow.products().get_by_id(1).await.unwrap().unwrap().product;
    laptop.description = None;
    laptop.price = dec!(899.00);
    laptop.touch();
    uow.products().update(laptop.clone()).unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 1);

    let reloaded = uow.products().get_by_id(1).await.unwrap().unwrap().product;
    assert_eq!(reloaded, laptop);
    assert_eq!(reloaded.description, None);
}

#[tokio::test]
async fn test_update_requires_saved_entity() {
    let (_store, mut uow) = seeded().await;
    let error = uow.roles().update(Role::new("Ghost")).unwrap_err();
    assert!(matches!(error, StoreError::MissingRow { id: 0, .. }));

    let mut ghost = Role::new("Ghost");
    ghost.id = 77;
    uow.roles().update(ghost).unwrap();
    assert!(matches!(
        uow.save_changes().await,
        Err(StoreError::MissingRow { id: 77, .. })
    ));
}

#[tokio::test]
async fn test_unique_email_rejected_at_save() {
    let (_store, mut uow) = seeded().await;
    uow.users()
        .add(User::new("Johnny", "Doe", "john.doe@example.com"))
        .unwrap();
    let error = uow.save_changes().await.unwrap_err();
    assert!(matches!(
        error,
        StoreError::ConstraintViolation {
            kind: ConstraintKind::Unique,
            table: Table::Users,
            ..
        }
    ));
}

#[tokio::test]
async fn test_products_without_sku_do_not_collide() {
    let (_store, mut uow) = seeded().await;
    uow.products().add(Product::new("Pen", dec!(1.50), 2)).unwrap();
    uow.products().add(Product::new("Pencil", dec!(0.90), 2)).unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 2);

    uow.products()
        .add(Product::new("Other laptop", dec!(1.00), 1).with_sku("LAP001"))
        .unwrap();
    assert!(uow.save_changes().await.unwrap_err().is_constraint_violation());
}

#[tokio::test]
async fn test_foreign_key_must_exist() {
    let (_store, mut uow) = seeded().await;
    uow.products().add(Product::new("Orphan", dec!(1.00), 42)).unwrap();
    assert!(matches!(
        uow.save_changes().await,
        Err(StoreError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            ..
        })
    ));
}

#[tokio::test]
async fn test_deleting_category_with_children_is_restricted() {
    let (store, mut uow) = seeded().await;
    let staged = uow.categories().add(Category::new("Phones").with_parent(1)).unwrap();
    uow.save_changes().await.unwrap();
    let phones = uow.persisted(&staged).unwrap();

    // Category 3 has neither products nor children
    assert!(uow.categories().delete(3).await.unwrap());
    uow.save_changes().await.unwrap();

    // Category 1 has a child and a product
    assert!(uow.categories().delete(1).await.unwrap());
    let error = uow.save_changes().await.unwrap_err();
    assert!(matches!(
        error,
        StoreError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            table: Table::Categories,
            ..
        }
    ));
    uow.discard_changes();
    assert!(uow.categories().exists(phones.id).await.unwrap());
    assert_eq!(store.row_count(Table::Categories).await, 4);
}

#[tokio::test]
async fn test_deleting_category_with_products_is_restricted() {
    let (_store, mut uow) = seeded().await;
    // Category 2 only holds the programming book
    assert!(uow.categories().get_sub_categories(2).await.unwrap().is_empty());
    uow.categories().delete(2).await.unwrap();
    assert!(uow.save_changes().await.unwrap_err().is_constraint_violation());
    assert!(uow.products().exists(2).await.unwrap());
}

#[tokio::test]
async fn test_deleting_order_cascades_to_items() {
    let (store, mut uow) = seeded().await;
    let staged = uow
        .orders()
        .add_with_items(
            Order::new("ORD-CASCADE", 1),
            vec![
                OrderItem::new(1, 1, dec!(999.99)),
                OrderItem::new(2, 2, dec!(29.99)),
            ],
        )
        .unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 3);
    let order = uow.persisted(&staged).unwrap();
    assert_eq!(store.row_count(Table::OrderItems).await, 2);

    assert!(uow.orders().delete(order.id).await.unwrap());
    assert_eq!(uow.save_changes().await.unwrap(), 1);
    assert_eq!(store.row_count(Table::OrderItems).await, 0);
    assert_eq!(store.row_count(Table::Orders).await, 0);
}

#[tokio::test]
async fn test_deleting_user_cascades_roles_and_profile() {
    let (store, mut uow) = seeded().await;
    uow.user_roles().add(UserRole::new(2, 1)).unwrap();
    uow.user_roles().add(UserRole::new(2, 3)).unwrap();
    uow.user_profiles().add(UserProfile::new(2)).unwrap();
    uow.save_changes().await.unwrap();

    assert!(uow.users().delete(2).await.unwrap());
    uow.save_changes().await.unwrap();

    assert_eq!(store.row_count(Table::UserRoles).await, 0);
    assert_eq!(store.row_count(Table::UserProfiles).await, 0);
    assert_eq!(store.row_count(Table::Roles).await, 3);
}

#[tokio::test]
async fn test_user_with_orders_cannot_be_deleted() {
    let (_store, mut uow) = seeded().await;
    uow.orders().add(Order::new("ORD-KEEP", 1)).unwrap();
    uow.save_changes().await.unwrap();

    uow.users().delete(1).await.unwrap();
    assert!(uow.save_changes().await.unwrap_err().is_constraint_violation());
}

#[tokio::test]
async fn test_queryable_composes_before_loading() {
    let (_store, mut uow) = seeded().await;
    let cheap = uow
        .products()
        .query()
        .filter(Filter::between("price", dec!(0), dec!(100)))
        .order_by("name", Direction::Asc)
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(cheap.len(), 1);
    assert_eq!(cheap[0].sku.as_deref(), Some("BOOK001"));

    assert_eq!(uow.categories().query().count().await.unwrap(), 4);
    assert!(uow
        .users()
        .query()
        .filter(Filter::eq("email", "jane.smith@example.com"))
        .any()
        .await
        .unwrap());

    let error = uow
        .products()
        .query()
        .filter(Filter::eq("colour", "red"))
        .fetch_all()
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::UnknownColumn { .. }));
}
