use crate::domain::{
    requests::order::UpdateOrderStatusRequest,
    response::{api::ApiResponse, order::OrderResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn update_status(
        &self,
        order_id: &str,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
