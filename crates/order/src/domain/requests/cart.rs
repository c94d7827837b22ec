use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddCartItemsRequest {
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub products: Vec<CartItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetSelectedRequest {
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetQuantityRequest {
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}
