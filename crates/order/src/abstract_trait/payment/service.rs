use crate::domain::response::{
    api::ApiResponse,
    order::OrderResponse,
    payment::{CallbackResponse, PaymentStatusResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::{collections::HashMap, sync::Arc};

pub type DynPaymentService = Arc<dyn PaymentServiceTrait + Send + Sync>;

#[async_trait]
pub trait PaymentServiceTrait {
    async fn handle_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<ApiResponse<CallbackResponse>, ServiceError>;
    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatusResponse, ServiceError>;
    async fn mark_paid(&self, order_id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
