use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A product picked for an immediate checkout. Only the id and quantity are
/// read; name and price always come from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    /// One of `GatewayRedirect`, `Credit`, `Bank`, `CashOnDelivery`.
    #[validate(length(min = 1))]
    pub payment_method: String,

    #[validate(nested)]
    #[serde(default)]
    pub items: Option<Vec<CheckoutItemRequest>>,

    #[validate(length(min = 8, max = 128))]
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Where the checkout call came from; feeds the gateway redirect.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub client_ip: Option<String>,
    pub return_url: Option<String>,
}
