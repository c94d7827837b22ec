use crate::domain::{
    requests::checkout::{CheckoutRequest, RequestOrigin},
    response::{api::ApiResponse, checkout::CheckoutResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynCheckoutService = Arc<dyn CheckoutServiceTrait + Send + Sync>;

#[async_trait]
pub trait CheckoutServiceTrait {
    async fn checkout(
        &self,
        owner_user_id: i64,
        req: &CheckoutRequest,
        origin: &RequestOrigin,
    ) -> Result<ApiResponse<CheckoutResponse>, ServiceError>;
}
