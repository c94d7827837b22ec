use crate::model::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use thiserror::Error;
use utoipa::ToSchema;

/// Upper bound for the quantity of one line, merged or not.
pub const MAX_LINE_QUANTITY: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("quantity of {product_id} would exceed {limit}")]
pub struct QuantityLimitExceeded {
    pub product_id: String,
    pub limit: i32,
}

/// Adds two line quantities, refusing results outside `1..=MAX_LINE_QUANTITY`.
pub fn merge_quantity(
    product_id: &str,
    current: i32,
    extra: i32,
) -> Result<i32, QuantityLimitExceeded> {
    current
        .checked_add(extra)
        .filter(|quantity| (1..=MAX_LINE_QUANTITY).contains(quantity))
        .ok_or_else(|| QuantityLimitExceeded {
            product_id: product_id.to_string(),
            limit: MAX_LINE_QUANTITY,
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub image_ref: String,
    pub selected: bool,
}

impl CartLine {
    pub fn subtotal(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Per-user staging area for checkout.
///
/// `cached_total` always equals the sum over selected lines; every mutator
/// recomputes it before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub owner_user_id: i64,
    pub lines: Vec<CartLine>,
    pub cached_total: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    pub fn new(owner_user_id: i64) -> Self {
        Self {
            owner_user_id,
            lines: Vec::new(),
            cached_total: 0,
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn selected_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.selected)
    }

    pub fn selected_total(&self) -> i64 {
        self.selected_lines().map(CartLine::subtotal).sum()
    }

    fn recompute(&mut self) {
        self.cached_total = self.selected_total();
    }

    /// Adds `quantity` of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: i32) -> Result<(), QuantityLimitExceeded> {
        match self.line_mut(&product.product_id) {
            Some(line) => {
                line.quantity = merge_quantity(&product.product_id, line.quantity, quantity)?;
            }
            None => {
                let quantity = merge_quantity(&product.product_id, 0, quantity)?;
                self.lines.push(CartLine {
                    product_id: product.product_id.clone(),
                    name: product.name.clone(),
                    quantity,
                    unit_price: product.price,
                    image_ref: product.image_ref.clone(),
                    selected: true,
                });
            }
        }
        self.recompute();
        Ok(())
    }

    pub fn set_selected(&mut self, product_id: &str, selected: bool) -> bool {
        let found = self.line_mut(product_id).map(|line| line.selected = selected);
        self.recompute();
        found.is_some()
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: i32) -> bool {
        let found = self.line_mut(product_id).map(|line| line.quantity = quantity);
        self.recompute();
        found.is_some()
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.recompute();
        self.lines.len() != before
    }

    /// Drops every line whose product is in `product_ids`.
    pub fn remove_products(&mut self, product_ids: &[String]) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|line| !product_ids.contains(&line.product_id));
        self.recompute();
        self.lines.len() != before
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

#[derive(Debug, FromRow)]
pub struct CartRow {
    pub owner_user_id: i64,
    pub lines: Json<Vec<CartLine>>,
    pub cached_total: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            owner_user_id: row.owner_user_id,
            lines: row.lines.0,
            cached_total: row.cached_total,
            updated_at: Some(row.updated_at),
        }
    }
}
