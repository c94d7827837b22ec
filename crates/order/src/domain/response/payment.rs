use crate::model::status::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub order_id: String,
    pub status: OrderStatus,
    pub paid: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct CallbackResponse {
    pub message: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub transaction_ref: String,
    pub transaction_no: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct EntitlementResponse {
    pub product_id: String,
    pub entitled: bool,
}
