use crate::model::{order::PaymentMethod, status::OrderStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// True when a pending order from an earlier attempt was returned.
    pub reused: bool,
}
