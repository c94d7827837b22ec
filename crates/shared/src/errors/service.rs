use crate::errors::repository::RepositoryError;
use jsonwebtoken::errors::Error as JwtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("No cart line is selected for checkout")]
    NoSelection,

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Payment method {0} is not available")]
    PaymentMethodUnavailable(String),

    #[error("Payment setup failed: {0}")]
    PaymentSetupFailed(String),

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Paid amount {actual} does not match order amount {expected}")]
    AmountMismatch { expected: i64, actual: i64 },

    #[error("Idempotency key {0} was already used for a different checkout")]
    IdempotencyConflict(String),

    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid Token")]
    InvalidTokenType,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable name of the failure, echoed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Repo(RepositoryError::NotFound) => "NotFound",
            ServiceError::Repo(_) => "RepositoryError",
            ServiceError::Validation(_) => "ValidationError",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::EmptyCart => "EmptyCart",
            ServiceError::NoSelection => "NoSelection",
            ServiceError::InvalidPaymentMethod(_) => "InvalidPaymentMethod",
            ServiceError::PaymentMethodUnavailable(_) => "PaymentMethodUnavailable",
            ServiceError::PaymentSetupFailed(_) => "PaymentSetupFailed",
            ServiceError::InvalidSignature => "InvalidSignature",
            ServiceError::AmountMismatch { .. } => "AmountMismatch",
            ServiceError::IdempotencyConflict(_) => "IdempotencyConflict",
            ServiceError::InvalidTransition { .. } => "InvalidTransition",
            ServiceError::Jwt(_) | ServiceError::TokenExpired | ServiceError::InvalidTokenType => {
                "Unauthorized"
            }
            ServiceError::Internal(_) => "Internal",
        }
    }
}
