//! Conversion of domain failures into HTTP responses
//!
//! Every error leaves the API as the shared [`ErrorResponse`] envelope.
//! Internal details of 5xx failures are logged, never returned.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sf_core::{AuthError, DomainError, StoreError, TokenError};
use sf_shared::{error_codes, ErrorResponse};

/// Error type returned by every handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::Domain(error.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Domain(error.into())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn store_status(error: &StoreError) -> (StatusCode, &'static str) {
    match error {
        StoreError::ConstraintViolation { .. } => (StatusCode::CONFLICT, error_codes::CONFLICT),
        StoreError::MissingRow { .. } => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        StoreError::UnknownColumn { .. } => (StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST),
        StoreError::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, error_codes::TIMEOUT),
        StoreError::Backend { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::DATABASE_ERROR,
        ),
        StoreError::InvalidTransactionState { .. }
        | StoreError::Disposed
        | StoreError::Mapping { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
        ),
    }
}

fn domain_status(error: &DomainError) -> (StatusCode, &'static str) {
    match error {
        DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        DomainError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED),
        DomainError::ConfigurationMissing { .. } | DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
        ),
        DomainError::Store(store) => store_status(store),
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials | AuthError::UserInactive | AuthError::UserNotFound => {
                (StatusCode::UNAUTHORIZED, error_codes::INVALID_CREDENTIALS)
            }
            AuthError::UserAlreadyExists => (StatusCode::CONFLICT, error_codes::CONFLICT),
            AuthError::InvalidEmail | AuthError::WeakPassword { .. } => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
            }
        },
        DomainError::Token(token) => match token {
            TokenError::GenerationFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
            TokenError::InvalidSubject | TokenError::Invalid => {
                (StatusCode::UNAUTHORIZED, error_codes::TOKEN_INVALID)
            }
        },
    }
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Domain(error) => domain_status(error),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (status, code) = self.classify();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
            let message = if status == StatusCode::GATEWAY_TIMEOUT {
                self.to_string()
            } else {
                "An internal error occurred".to_string()
            };
            return ErrorResponse::new(code, message);
        }

        let response = ErrorResponse::new(code, self.to_string());
        match self {
            ApiError::Validation(errors) => response.add_detail("fields", errors),
            ApiError::Domain(DomainError::Store(StoreError::ConstraintViolation {
                kind,
                table,
                ..
            })) => response
                .add_detail("constraint", kind.to_string())
                .add_detail("table", table.name()),
            _ => response,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_error_response())
    }
}

/// Rejects undecodable JSON bodies with the shared error envelope
pub fn json_error_handler(
    error: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::BadRequest(error.to_string()).into()
}
