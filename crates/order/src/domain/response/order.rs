use crate::model::order::{Order, OrderLineItem, PaymentMethod};
use crate::model::status::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderResponse {
    pub id: String,
    pub owner_user_id: i64,
    pub line_items: Vec<OrderLineItem>,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(rename = "updated_at")]
    pub updated_at: String,
}

// model to response
impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        OrderResponse {
            id: value.id,
            owner_user_id: value.owner_user_id,
            line_items: value.line_items,
            total_amount: value.total_amount,
            payment_method: value.payment_method,
            status: value.status,
            cancel_reason: value.cancel_reason,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}
