use std::sync::atomic::Ordering;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use super::{seeded, CountingSession};
use crate::domain::entities::{Category, Order, OrderItem, OrderStatus, Product, User, UserRole};
use crate::repositories::{UnitOfWork, UnitOfWorkFactory};
use crate::store::{Case, MemoryStore};

#[tokio::test]
async fn test_new_category_product_is_found_with_category() {
    let (_store, mut uow) = seeded().await;
    let staged = uow.categories().add(Category::new("Tools")).unwrap();
    uow.save_changes().await.unwrap();
    let tools = uow.persisted(&staged).unwrap();

    uow.products()
        .add(Product::new("Hammer", dec!(19.99), tools.id))
        .unwrap();
    uow.save_changes().await.unwrap();

    let found = uow.products().get_by_category(tools.id).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].product.name, "Hammer");
    assert_eq!(found[0].category.name, "Tools");
}

#[tokio::test]
async fn test_search_matches_name_description_and_sku() {
    let (_store, mut uow) = seeded().await;

    let upper = uow.products().search("LAPTOP").await.unwrap();
    assert_eq!(upper.len(), 1);
    assert_eq!(upper[0].category.name, "Electronics");

    // "fundamentals" only appears in the book's description
    let by_description = uow.products().search("fundamentals").await.unwrap();
    assert_eq!(by_description[0].product.sku.as_deref(), Some("BOOK001"));

    assert_eq!(uow.products().search("book0").await.unwrap().len(), 1);
    assert!(uow.products().search("tractor").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_case_sensitive_search() {
    let (_store, mut uow) = seeded().await;
    let upper = uow
        .products()
        .search_with_case("LAPTOP", Case::Sensitive)
        .await
        .unwrap();
    assert!(upper.is_empty());
    let exact = uow
        .products()
        .search_with_case("Laptop", Case::Sensitive)
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(
        uow.products()
            .search_with_case("LAPTOP", Case::Insensitive)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_product_lookups() {
    let (_store, mut uow) = seeded().await;
    let laptop = uow.products().get_by_sku("LAP001").await.unwrap().unwrap();
    assert_eq!(laptop.product.id, 1);
    assert!(uow.products().get_by_sku("lap001").await.unwrap().is_none());

    let mut book = uow.products().get_by_id(2).await.unwrap().unwrap().product;
    book.is_active = false;
    uow.products().update(book).unwrap();
    uow.save_changes().await.unwrap();

    let active = uow.products().get_active_products().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].product.name, "Laptop");
    assert_eq!(uow.products().get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_category_hierarchy() {
    let (_store, mut uow) = seeded().await;
    uow.categories()
        .add(Category::new("Laptops").with_parent(1))
        .unwrap();
    uow.categories()
        .add(Category::new("Phones").with_parent(1))
        .unwrap();
    uow.save_changes().await.unwrap();

    let main = uow.categories().get_main_categories().await.unwrap();
    assert_eq!(main.len(), 4);
    let electronics = main.iter().find(|c| c.category.id == 1).unwrap();
    assert_eq!(electronics.sub_categories.len(), 2);
    assert!(electronics.parent.is_none());
    assert!(main
        .iter()
        .filter(|c| c.category.id != 1)
        .all(|c| c.sub_categories.is_empty()));

    let laptops = uow.categories().get_by_name("Laptops").await.unwrap().unwrap();
    assert_eq!(laptops.parent.map(|p| p.name), Some("Electronics".to_string()));
    assert!(!laptops.category.is_main());

    let names: Vec<String> = uow
        .categories()
        .get_sub_categories(1)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Laptops", "Phones"]);
    assert!(uow.categories().get_by_name("laptops").await.unwrap().is_none());
}

#[tokio::test]
async fn test_users_by_role_uses_active_assignments_only() {
    let (_store, mut uow) = seeded().await;
    uow.user_roles().add(UserRole::new(1, 1)).unwrap();
    let mut revoked = UserRole::new(2, 1);
    revoked.revoke();
    uow.user_roles().add(revoked).unwrap();
    uow.save_changes().await.unwrap();

    let admins = uow.users().get_users_by_role("Admin").await.unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].user.email, "john.doe@example.com");
    assert_eq!(admins[0].active_role_names(), vec!["Admin"]);

    assert!(uow.users().get_users_by_role("Manager").await.unwrap().is_empty());
    assert!(uow.users().get_users_by_role("Nobody").await.unwrap().is_empty());

    let jane = uow.users().get_by_id(2).await.unwrap().unwrap();
    assert_eq!(jane.roles.len(), 1);
    assert!(jane.active_role_names().is_empty());
}

#[tokio::test]
async fn test_add_with_roles_links_assignments() {
    let (_store, mut uow) = seeded().await;
    let staged = uow
        .users()
        .add_with_roles(User::new("Grace", "Hopper", "grace@example.com"), &[2, 3])
        .unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 3);
    let grace = uow.persisted(&staged).unwrap();

    let details = uow.users().get_by_email("grace@example.com").await.unwrap().unwrap();
    assert_eq!(details.user.id, grace.id);
    let mut names = details.active_role_names();
    names.sort_unstable();
    assert_eq!(names, vec!["Manager", "User"]);
    assert!(details.roles.iter().all(|r| r.assignment.user_id == grace.id));
    assert!(details.profile.is_none());

    assert!(uow.users().get_by_email("GRACE@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_add_with_roles_is_atomic() {
    let (store, mut uow) = seeded().await;
    uow.users()
        .add_with_roles(User::new("Bad", "Role", "bad@example.com"), &[2, 99])
        .unwrap();
    assert!(uow.save_changes().await.is_err());
    let mut fresh = store.create().await.unwrap();
    assert!(fresh.users().get_by_email("bad@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_active_users() {
    let (_store, mut uow) = seeded().await;
    let mut jane = uow.users().get_by_id(2).await.unwrap().unwrap().user;
    jane.deactivate();
    uow.users().update(jane).unwrap();
    uow.save_changes().await.unwrap();

    let active = uow.users().get_active_users().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user.first_name, "John");
}

#[tokio::test]
async fn test_order_aggregate_reads() {
    let (_store, mut uow) = seeded().await;
    let staged = uow
        .orders()
        .add_with_items(
            Order::new("ORD-001", 1).with_amounts(dec!(1059.97), dec!(0), dec!(0)),
            vec![
                OrderItem::new(1, 1, dec!(999.99)),
                OrderItem::new(2, 2, dec!(29.99)),
            ],
        )
        .unwrap();
    uow.save_changes().await.unwrap();
    let order = uow.persisted(&staged).unwrap();

    let details = uow.orders().get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(details.user.email, "john.doe@example.com");
    assert_eq!(details.items.len(), 2);
    let book_line = details.items.iter().find(|l| l.product.id == 2).unwrap();
    assert_eq!(book_line.item.total_price, dec!(59.98));
    assert_eq!(book_line.item.order_id, order.id);

    let by_number = uow.orders().get_by_order_number("ORD-001").await.unwrap().unwrap();
    assert_eq!(by_number.order.id, order.id);
    assert!(uow.orders().get_by_order_number("ORD-404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_orders_by_user_newest_first_and_date_range_inclusive() {
    let (_store, mut uow) = seeded().await;
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for (number, days) in [("ORD-A", 0), ("ORD-C", 20), ("ORD-B", 10)] {
        uow.orders()
            .add(Order::new(number, 1).with_order_date(base + Duration::days(days)))
            .unwrap();
    }
    uow.orders()
        .add(Order::new("ORD-JANE", 2).with_order_date(base))
        .unwrap();
    uow.save_changes().await.unwrap();

    let numbers: Vec<String> = uow
        .orders()
        .get_by_user(1)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.order.order_number)
        .collect();
    assert_eq!(numbers, vec!["ORD-C", "ORD-B", "ORD-A"]);

    let in_range = uow
        .orders()
        .get_by_date_range(base, base + Duration::days(10))
        .await
        .unwrap();
    let mut numbers: Vec<String> = in_range.into_iter().map(|d| d.order.order_number).collect();
    numbers.sort();
    assert_eq!(numbers, vec!["ORD-A", "ORD-B", "ORD-JANE"]);
}

#[tokio::test]
async fn test_orders_by_status() {
    let (_store, mut uow) = seeded().await;
    let staged = uow.orders().add(Order::new("ORD-S", 2)).unwrap();
    uow.orders().add(Order::new("ORD-P", 2)).unwrap();
    uow.save_changes().await.unwrap();

    let mut shipped = uow.persisted(&staged).unwrap();
    shipped.set_status(OrderStatus::Shipped);
    uow.orders().update(shipped).unwrap();
    uow.save_changes().await.unwrap();

    let found = uow.orders().get_by_status("Shipped").await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].order.shipped_date.is_some());
    assert_eq!(uow.orders().get_by_status("Pending").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_eager_loading_uses_constant_number_of_queries() {
    let store = MemoryStore::seeded().unwrap();
    let (session, selects) = CountingSession::new(&store);
    let mut uow = UnitOfWork::new(Box::new(session));

    for n in 0..5 {
        uow.orders()
            .add_with_items(
                Order::new(format!("ORD-{}", n), 1),
                vec![
                    OrderItem::new(1, 1, dec!(999.99)),
                    OrderItem::new(2, 1, dec!(29.99)),
                ],
            )
            .unwrap();
    }
    uow.save_changes().await.unwrap();

    selects.store(0, Ordering::SeqCst);
    let orders = uow.orders().get_by_user(1).await.unwrap();
    assert_eq!(orders.len(), 5);
    assert!(orders.iter().all(|o| o.items.len() == 2));
    // orders, users, items, products
    assert_eq!(selects.load(Ordering::SeqCst), 4);

    selects.store(0, Ordering::SeqCst);
    uow.users().get_active_users().await.unwrap();
    // users, assignments, roles, profiles
    assert_eq!(selects.load(Ordering::SeqCst), 4);
}
