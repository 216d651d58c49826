use std::time::Duration;

use rust_decimal_macros::dec;

use super::seeded;
use crate::domain::entities::{Category, Order, OrderItem, Role, User};
use crate::errors::StoreError;
use crate::repositories::{UnitOfWorkFactory, UnitState};
use crate::store::{MemoryStore, Table};

#[tokio::test]
async fn test_rollback_discards_staged_and_saved_changes() {
    let (_store, mut uow) = seeded().await;
    uow.begin_transaction().await.unwrap();
    assert_eq!(uow.state(), UnitState::InTransaction);

    uow.categories().add(Category::new("Saved")).unwrap();
    uow.save_changes().await.unwrap();
    uow.categories().add(Category::new("Staged")).unwrap();
    assert_eq!(uow.categories().get_all().await.unwrap().len(), 5);

    uow.rollback_transaction().await.unwrap();
    assert_eq!(uow.state(), UnitState::Idle);
    assert!(!uow.has_pending_changes());

    let names: Vec<String> = uow
        .categories()
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(!names.contains(&"Saved".to_string()));
    assert!(!names.contains(&"Staged".to_string()));
}

#[tokio::test]
async fn test_commit_makes_transaction_visible_to_other_units() {
    let (store, mut uow) = seeded().await;
    let mut observer = store.create().await.unwrap();

    uow.begin_transaction().await.unwrap();
    uow.roles().add(Role::new("Auditor")).unwrap();
    uow.categories().add(Category::new("Garden Tools").with_parent(4)).unwrap();
    uow.save_changes().await.unwrap();
    assert_eq!(observer.roles().get_all().await.unwrap().len(), 3);

    uow.commit_transaction().await.unwrap();
    assert_eq!(observer.roles().get_all().await.unwrap().len(), 4);
    assert_eq!(store.row_count(Table::Categories).await, 5);
}

#[tokio::test]
async fn test_rolled_back_ids_are_not_reused() {
    let (_store, mut uow) = seeded().await;
    uow.begin_transaction().await.unwrap();
    let first = uow.categories().add(Category::new("Temp")).unwrap();
    uow.save_changes().await.unwrap();
    let temp_id = uow.persisted(&first).unwrap().id;
    uow.rollback_transaction().await.unwrap();

    let second = uow.categories().add(Category::new("Kept")).unwrap();
    uow.save_changes().await.unwrap();
    assert!(uow.persisted(&second).unwrap().id > temp_id);
}

#[tokio::test]
async fn test_committed_items_stay_with_their_order() {
    let (store, mut uow) = seeded().await;
    uow.begin_transaction().await.unwrap();

    let first = uow.orders().add(Order::new("ORD-A", 1)).unwrap();
    uow.save_changes().await.unwrap();
    let second = uow
        .orders()
        .add_with_items(
            Order::new("ORD-B", 1),
            vec![OrderItem::new(1, 2, dec!(5.00))],
        )
        .unwrap();
    uow.save_changes().await.unwrap();
    let first_id = uow.persisted(&first).unwrap().id;
    let second_id = uow.persisted(&second).unwrap().id;

    uow.commit_transaction().await.unwrap();

    let mut reader = store.create().await.unwrap();
    let b = reader.orders().get_by_id(second_id).await.unwrap().unwrap();
    assert_eq!(b.items.len(), 1);
    assert_eq!(b.items[0].item.order_id, second_id);
    let a = reader.orders().get_by_id(first_id).await.unwrap().unwrap();
    assert!(a.items.is_empty());
}

#[tokio::test]
async fn test_rollback_forgets_assigned_ids() {
    let (_store, mut uow) = seeded().await;
    let before = uow.categories().add(Category::new("Before")).unwrap();
    uow.save_changes().await.unwrap();

    uow.begin_transaction().await.unwrap();
    let inside = uow.categories().add(Category::new("Inside")).unwrap();
    uow.save_changes().await.unwrap();
    assert!(uow.persisted(&inside).is_some());
    uow.rollback_transaction().await.unwrap();

    assert!(uow.persisted(&inside).is_none());
    assert!(uow.persisted(&before).is_some());

    uow.begin_transaction().await.unwrap();
    let committed = uow.categories().add(Category::new("Committed")).unwrap();
    uow.save_changes().await.unwrap();
    uow.commit_transaction().await.unwrap();
    assert!(uow.persisted(&committed).is_some());
}

#[tokio::test]
async fn test_invalid_transitions_are_errors() {
    let (_store, mut uow) = seeded().await;
    assert!(matches!(
        uow.commit_transaction().await,
        Err(StoreError::InvalidTransactionState { state: "idle", .. })
    ));
    assert!(matches!(
        uow.rollback_transaction().await,
        Err(StoreError::InvalidTransactionState { .. })
    ));

    uow.begin_transaction().await.unwrap();
    let error = uow.begin_transaction().await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "Cannot begin a transaction while the unit of work is in transaction"
    );
    assert_eq!(uow.state(), UnitState::InTransaction);
}

#[tokio::test]
async fn test_dispose_is_terminal_and_idempotent() {
    let (store, mut uow) = seeded().await;
    uow.begin_transaction().await.unwrap();
    uow.roles().add(Role::new("Temp")).unwrap();
    uow.save_changes().await.unwrap();

    uow.dispose().await.unwrap();
    uow.dispose().await.unwrap();
    assert_eq!(uow.state(), UnitState::Disposed);
    assert_eq!(store.row_count(Table::Roles).await, 3);

    assert!(matches!(uow.roles().get_all().await, Err(StoreError::Disposed)));
    assert!(matches!(uow.roles().add(Role::new("Late")), Err(StoreError::Disposed)));
    assert!(matches!(uow.save_changes().await, Err(StoreError::Disposed)));
    assert!(matches!(uow.begin_transaction().await, Err(StoreError::Disposed)));
}

#[tokio::test]
async fn test_failed_save_keeps_changes_and_transaction() {
    let (store, mut uow) = seeded().await;
    uow.begin_transaction().await.unwrap();
    let staged = uow
        .users()
        .add(User::new("Dup", "Licate", "jane.smith@example.com"))
        .unwrap();

    assert!(uow.save_changes().await.unwrap_err().is_constraint_violation());
    assert!(uow.has_pending_changes());
    assert!(uow.persisted(&staged).is_none());
    assert_eq!(uow.state(), UnitState::InTransaction);

    uow.discard_changes();
    assert_eq!(uow.save_changes().await.unwrap(), 0);
    uow.commit_transaction().await.unwrap();
    assert_eq!(store.row_count(Table::Users).await, 2);
}

#[tokio::test]
async fn test_batch_spanning_repositories_is_atomic() {
    let (store, mut uow) = seeded().await;
    let mut laptop = uow.products().get_by_id(1).await.unwrap().unwrap().product;
    laptop.price = dec!(1.00);
    uow.products().update(laptop).unwrap();
    uow.orders().add(Order::new("ORD-X", 1)).unwrap();
    uow.orders().add(Order::new("ORD-X", 2)).unwrap();

    assert!(uow.save_changes().await.is_err());

    let mut fresh = store.create().await.unwrap();
    let price = fresh.products().get_by_id(1).await.unwrap().unwrap().product.price;
    assert_eq!(price, dec!(999.99));
    assert_eq!(store.row_count(Table::Orders).await, 0);
}

#[tokio::test]
async fn test_expired_deadline_fails_reads_and_saves() {
    let store = MemoryStore::seeded().unwrap();
    let mut uow = store.create().await.unwrap().with_deadline(Duration::ZERO);

    assert!(matches!(
        uow.products().get_all().await,
        Err(StoreError::DeadlineExceeded)
    ));
    uow.roles().add(Role::new("Late")).unwrap();
    assert!(matches!(uow.save_changes().await, Err(StoreError::DeadlineExceeded)));
    assert!(uow.has_pending_changes());
    assert_eq!(store.row_count(Table::Roles).await, 3);
}

#[tokio::test]
async fn test_generous_deadline_allows_work() {
    let store = MemoryStore::seeded().unwrap();
    let mut uow = store
        .create()
        .await
        .unwrap()
        .with_deadline(Duration::from_secs(30));
    uow.ping().await.unwrap();
    assert_eq!(uow.backend(), "memory");
    assert_eq!(uow.roles().get_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_concurrent_duplicate_email_only_one_wins() {
    let store = MemoryStore::seeded().unwrap();

    let attempts: Vec<_> = (0..2)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                let mut uow = store.create().await?;
                uow.users()
                    .add(User::new("Racer", n.to_string(), "racer@example.com"))?;
                let result = uow.save_changes().await;
                uow.dispose().await?;
                result
            })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => successes += 1,
            Err(error) if error.is_constraint_violation() => conflicts += 1,
            Err(error) => panic!("unexpected error: {}", error),
        }
    }
    assert_eq!((successes, conflicts), (1, 1));
    assert_eq!(store.row_count(Table::Users).await, 3);
}
