use crate::errors::ServiceError;
use std::sync::Arc;

pub type DynJwtService = Arc<dyn JwtServiceTrait + Send + Sync>;

/// Verifies tokens issued by the auth collaborator.
///
/// `generate_token` exists for local tooling and tests; tokens in production are
/// minted by the auth service with the same secret.
pub trait JwtServiceTrait: Send + Sync + std::fmt::Debug {
    fn generate_token(&self, user_id: i64, token_type: &str) -> Result<String, ServiceError>;
    fn verify_token(&self, token: &str, expected_type: &str) -> Result<i64, ServiceError>;
}
