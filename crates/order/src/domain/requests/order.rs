use crate::model::status::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindOrdersQuery {
    pub status: Option<OrderStatus>,

    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i32,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

impl Default for FindOrdersQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,

    #[validate(length(max = 500))]
    #[serde(default)]
    pub cancel_reason: Option<String>,
}
