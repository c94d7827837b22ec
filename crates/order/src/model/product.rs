use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Price-of-record for a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub image_ref: String,
}
