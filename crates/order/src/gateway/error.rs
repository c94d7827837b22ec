use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Invalid amount {0}: must be greater than zero")]
    InvalidAmount(i64),

    #[error("Payment gateway is not configured: {0} is missing")]
    ConfigurationMissing(&'static str),

    #[error("Invalid gateway base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Transaction reference is empty after sanitizing")]
    InvalidTransactionRef,

    #[error("Callback field {0} is missing or malformed")]
    InvalidField(&'static str),

    #[error("Callback signature does not match")]
    InvalidSignature,
}
