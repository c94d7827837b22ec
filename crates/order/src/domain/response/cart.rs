use crate::model::cart::{Cart, CartLine};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CartResponse {
    pub owner_user_id: i64,
    pub lines: Vec<CartLine>,
    pub total: i64,
    pub updated_at: Option<String>,
}

impl From<Cart> for CartResponse {
    fn from(value: Cart) -> Self {
        CartResponse {
            owner_user_id: value.owner_user_id,
            total: value.cached_total,
            lines: value.lines,
            updated_at: value.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SelectedCartResponse {
    pub lines: Vec<CartLine>,
    pub total: i64,
}

impl From<&Cart> for SelectedCartResponse {
    fn from(value: &Cart) -> Self {
        SelectedCartResponse {
            lines: value.selected_lines().cloned().collect(),
            total: value.cached_total,
        }
    }
}
