//! Unit tests for the authentication service

use std::sync::Arc;

use crate::domain::entities::Claims;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::UnitOfWorkFactory;
use crate::services::auth::AuthService;
use crate::services::password::PasswordHasher;
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::store::MemoryStore;

fn setup() -> (MemoryStore, AuthService) {
    let store = MemoryStore::seeded().unwrap();
    let tokens = TokenService::new(TokenServiceConfig::new(
        "storefront-test-signing-key-0123456789abcdef",
        "storefront",
        "storefront-api",
    ))
    .unwrap();
    let service = AuthService::new(Arc::new(store.clone()), Arc::new(tokens))
        .with_hasher(PasswordHasher::with_cost(4));
    (store, service)
}

#[tokio::test]
async fn test_register_creates_user_with_default_role() {
    let (store, service) = setup();
    let response = service
        .register("Ada", "Lovelace", "ada@example.com", "difference-engine")
        .await
        .unwrap();
    assert_eq!(response.email, "ada@example.com");
    assert_eq!(response.user_id, 3);

    let claims = service.token_service().validate(&response.token).unwrap();
    assert_eq!(claims.user_id(), Some(response.user_id));
    assert_eq!(claims.expires_at(), response.expires_at);

    let mut uow = store.create().await.unwrap();
    let details = uow.users().get_by_id(response.user_id).await.unwrap().unwrap();
    assert_eq!(details.active_role_names(), vec!["User"]);
    let hash = details.user.password_hash.unwrap();
    assert!(hash.starts_with("$2"));
    assert!(!hash.contains("difference-engine"));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let (_store, service) = setup();
    let result = service
        .register("John", "Again", "john.doe@example.com", "password123")
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
}

#[tokio::test]
async fn test_register_validates_input() {
    let (store, service) = setup();
    assert!(matches!(
        service.register("A", "B", "not-an-email", "password123").await,
        Err(DomainError::Auth(AuthError::InvalidEmail))
    ));
    assert!(matches!(
        service.register("A", "B", "a@b.com", "short").await,
        Err(DomainError::Auth(AuthError::WeakPassword { min_length: 8 }))
    ));
    assert!(matches!(
        service.register(" ", "B", "a@b.com", "password123").await,
        Err(DomainError::Validation { .. })
    ));
    assert_eq!(store.row_count(crate::store::Table::Users).await, 2);
}

#[tokio::test]
async fn test_login_round_trip() {
    let (_store, service) = setup();
    let registered = service
        .register("Grace", "Hopper", "grace@example.com", "cobol-forever")
        .await
        .unwrap();

    let response = service.login("grace@example.com", "cobol-forever").await.unwrap();
    assert_eq!(response.user_id, registered.user_id);
    assert!(service.token_service().validate(&response.token).is_some());
}

#[tokio::test]
async fn test_login_failures_are_invalid_credentials() {
    let (_store, service) = setup();
    service
        .register("Grace", "Hopper", "grace@example.com", "cobol-forever")
        .await
        .unwrap();

    for (email, password) in [
        ("grace@example.com", "fortran-forever"),
        ("nobody@example.com", "cobol-forever"),
        // seeded users have no password
        ("john.doe@example.com", "anything-at-all"),
    ] {
        assert!(matches!(
            service.login(email, password).await,
            Err(DomainError::Auth(AuthError::InvalidCredentials))
        ));
    }
}

#[tokio::test]
async fn test_login_inactive_user() {
    let (store, service) = setup();
    let registered = service
        .register("Old", "Account", "old@example.com", "password123")
        .await
        .unwrap();

    let mut uow = store.create().await.unwrap();
    let mut user = uow.users().get_by_id(registered.user_id).await.unwrap().unwrap().user;
    user.deactivate();
    uow.users().update(user).unwrap();
    uow.save_changes().await.unwrap();

    assert!(matches!(
        service.login("old@example.com", "password123").await,
        Err(DomainError::Auth(AuthError::UserInactive))
    ));
}

#[tokio::test]
async fn test_current_user_and_refresh() {
    let (_store, service) = setup();
    let registered = service
        .register("Ada", "Lovelace", "ada@example.com", "difference-engine")
        .await
        .unwrap();
    let claims = service.token_service().validate(&registered.token).unwrap();

    let me = service.current_user(&claims).await.unwrap();
    assert_eq!(me.user.email, "ada@example.com");

    let refreshed = service.refresh(&claims).unwrap();
    assert_ne!(refreshed.token, registered.token);
    let new_claims = service.token_service().validate(&refreshed.token).unwrap();
    assert_eq!(new_claims.sub, claims.sub);
    assert_eq!(new_claims.email, "ada@example.com");
}

#[tokio::test]
async fn test_current_user_for_unknown_or_malformed_subject() {
    let (_store, service) = setup();
    let lifetime = chrono::Duration::minutes(5);
    let ghost = Claims::new("999", "ghost@example.com", "storefront", "storefront-api", lifetime);
    assert!(matches!(
        service.current_user(&ghost).await,
        Err(DomainError::Auth(AuthError::UserNotFound))
    ));

    let malformed = Claims::new("abc", "x@example.com", "storefront", "storefront-api", lifetime);
    assert!(matches!(
        service.refresh(&malformed),
        Err(DomainError::Token(TokenError::InvalidSubject))
    ));
}
