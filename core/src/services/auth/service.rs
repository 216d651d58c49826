//! Main authentication service implementation

use std::sync::Arc;

use tracing::{info, warn};

use sf_shared::validation::{is_acceptable_password, is_valid_email, not_blank, MIN_PASSWORD_LENGTH};

use crate::domain::entities::{Claims, Role, User, DEFAULT_ROLE};
use crate::domain::value_objects::{AuthResponse, UserDetails};
use crate::errors::{AuthError, ConstraintKind, DomainError, DomainResult, StoreError, TokenError};
use crate::repositories::{UnitOfWork, UnitOfWorkFactory};
use crate::services::password::PasswordHasher;
use crate::services::token::TokenService;
use crate::store::{Filter, Table};

/// Authentication service for the register / login / refresh flow
pub struct AuthService {
    /// Opens a unit of work per call
    units: Arc<dyn UnitOfWorkFactory>,
    /// Service for JWT token management
    token_service: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(units: Arc<dyn UnitOfWorkFactory>, token_service: Arc<TokenService>) -> Self {
        Self {
            units,
            token_service,
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Register a new user with the default role and sign them in
    ///
    /// The user row and its role assignment are saved in one batch. A
    /// duplicate email, whether found up front or raced at save time, is
    /// `UserAlreadyExists`.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthResponse> {
        if !not_blank(first_name) || !not_blank(last_name) {
            return Err(DomainError::validation("First and last name are required"));
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail.into());
        }
        if !is_acceptable_password(password) {
            return Err(AuthError::WeakPassword {
                min_length: MIN_PASSWORD_LENGTH,
            }
            .into());
        }

        let password_hash = self.hash(password).await?;
        let user = User::new(first_name.trim(), last_name.trim(), email)
            .with_password_hash(password_hash);

        let mut uow = self.units.create().await?;
        let result = Self::create_user(&mut uow, user).await;
        release(uow).await;
        let user = result?;

        info!(user_id = user.id, "User registered");
        self.respond(user.id, &user.email)
    }

    async fn create_user(uow: &mut UnitOfWork, user: User) -> DomainResult<User> {
        let taken = uow
            .users()
            .query()
            .filter(Filter::eq("email", user.email.as_str()))
            .any()
            .await?;
        if taken {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let default_role = uow
            .roles()
            .query()
            .filter(Filter::eq("name", DEFAULT_ROLE))
            .first()
            .await?;
        let role_ids: Vec<i64> = default_role.iter().map(|role: &Role| role.id).collect();
        if role_ids.is_empty() {
            warn!(role = DEFAULT_ROLE, "Default role missing, registering without it");
        }

        let staged = uow.users().add_with_roles(user, &role_ids)?;
        match uow.save_changes().await {
            Ok(_) => {}
            Err(StoreError::ConstraintViolation {
                kind: ConstraintKind::Unique,
                table: Table::Users,
                ..
            }) => return Err(AuthError::UserAlreadyExists.into()),
            Err(error) => return Err(error.into()),
        }

        uow.persisted(&staged).ok_or_else(|| DomainError::Internal {
            message: "Saved user has no id".to_string(),
        })
    }

    /// Check credentials and issue a token
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResponse> {
        let mut uow = self.units.create().await?;
        let found = uow
            .users()
            .query()
            .filter(Filter::eq("email", email))
            .first()
            .await;
        release(uow).await;

        let user = found?.ok_or(AuthError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.verify(password, hash).await? {
            warn!(user_id = user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::UserInactive.into());
        }

        info!(user_id = user.id, "User logged in");
        self.respond(user.id, &user.email)
    }

    /// The user named by validated claims, with roles and profile
    pub async fn current_user(&self, claims: &Claims) -> DomainResult<UserDetails> {
        let user_id = claims.user_id().ok_or(TokenError::InvalidSubject)?;
        let mut uow = self.units.create().await?;
        let found = uow.users().get_by_id(user_id).await;
        release(uow).await;

        Ok(found?.ok_or(AuthError::UserNotFound)?)
    }

    /// Re-issue a token for the subject of still-valid claims
    pub fn refresh(&self, claims: &Claims) -> DomainResult<AuthResponse> {
        let user_id = claims.user_id().ok_or(TokenError::InvalidSubject)?;
        self.respond(user_id, &claims.email)
    }

    fn respond(&self, user_id: i64, email: &str) -> DomainResult<AuthResponse> {
        let claims = self.token_service.claims_for(user_id, email);
        let token = self.token_service.sign(&claims)?;
        Ok(AuthResponse::new(
            token,
            claims.expires_at(),
            user_id,
            email.to_string(),
        ))
    }

    async fn hash(&self, password: &str) -> DomainResult<String> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Internal {
                message: e.to_string(),
            })?
    }

    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let hasher = self.hasher;
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: e.to_string(),
            })
    }
}

async fn release(mut uow: UnitOfWork) {
    if let Err(error) = uow.dispose().await {
        warn!(error = %error, "Failed to dispose unit of work");
    }
}
