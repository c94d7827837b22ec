use crate::domain::{
    requests::order::FindOrdersQuery,
    response::{
        api::{ApiResponse, ApiResponsePagination},
        order::OrderResponse,
    },
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_all(
        &self,
        owner_user_id: i64,
        req: &FindOrdersQuery,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError>;
    async fn find_by_id(
        &self,
        owner_user_id: i64,
        order_id: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
