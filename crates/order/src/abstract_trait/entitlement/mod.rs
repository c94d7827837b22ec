use crate::domain::response::{api::ApiResponse, payment::EntitlementResponse};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynEntitlementService = Arc<dyn EntitlementServiceTrait + Send + Sync>;

#[async_trait]
pub trait EntitlementServiceTrait {
    async fn check(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<ApiResponse<EntitlementResponse>, ServiceError>;
}
