use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest { kind: &'static str, message: String },
    Unauthorized { kind: &'static str, message: String },
    NotFound { kind: &'static str, message: String },
    Conflict { kind: &'static str, message: String },
    Internal { kind: &'static str, message: String },
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();

        match err {
            ServiceError::Validation(errors) => HttpError::BadRequest {
                kind,
                message: format!("Validation failed: {}", errors.join("; ")),
            },

            ServiceError::EmptyCart
            | ServiceError::NoSelection
            | ServiceError::InvalidPaymentMethod(_)
            | ServiceError::PaymentMethodUnavailable(_)
            | ServiceError::InvalidSignature
            | ServiceError::AmountMismatch { .. } => HttpError::BadRequest {
                kind,
                message: err.to_string(),
            },

            ServiceError::NotFound(_) | ServiceError::Repo(RepositoryError::NotFound) => {
                HttpError::NotFound {
                    kind,
                    message: err.to_string(),
                }
            }

            ServiceError::InvalidTransition { .. }
            | ServiceError::IdempotencyConflict(_)
            | ServiceError::Repo(RepositoryError::Conflict(_)) => HttpError::Conflict {
                kind,
                message: err.to_string(),
            },

            ServiceError::Jwt(_) | ServiceError::TokenExpired | ServiceError::InvalidTokenType => {
                HttpError::Unauthorized {
                    kind,
                    message: err.to_string(),
                }
            }

            ServiceError::PaymentSetupFailed(_) => HttpError::Internal {
                kind,
                message: err.to_string(),
            },

            ServiceError::Repo(repo_err) => {
                error!("❌ Repository failure surfaced to client: {repo_err}");
                HttpError::Internal {
                    kind,
                    message: "Repository error".into(),
                }
            }

            ServiceError::Internal(msg) => HttpError::Internal { kind, message: msg },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            HttpError::BadRequest { kind, message } => (StatusCode::BAD_REQUEST, kind, message),
            HttpError::Unauthorized { kind, message } => (StatusCode::UNAUTHORIZED, kind, message),
            HttpError::NotFound { kind, message } => (StatusCode::NOT_FOUND, kind, message),
            HttpError::Conflict { kind, message } => (StatusCode::CONFLICT, kind, message),
            HttpError::Internal { kind, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, kind, message)
            }
        };

        (status, Json(ErrorResponse::new(kind, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        HttpError::from(err).into_response().status()
    }

    #[test]
    fn checkout_input_errors_are_bad_requests() {
        assert_eq!(status_of(ServiceError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::NoSelection), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ServiceError::PaymentMethodUnavailable("Credit".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn payment_setup_failure_is_distinct_from_validation() {
        assert_eq!(
            status_of(ServiceError::PaymentSetupFailed("missing secret".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_order_maps_to_not_found() {
        assert_eq!(
            status_of(ServiceError::NotFound("Order".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::Repo(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn illegal_transition_maps_to_conflict() {
        let err = ServiceError::InvalidTransition {
            from: "Canceled".into(),
            to: "Processing".into(),
        };
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn reused_idempotency_key_maps_to_conflict() {
        let err = ServiceError::IdempotencyConflict("client-retry-0001".into());
        assert_eq!(err.kind(), "IdempotencyConflict");
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }
}
