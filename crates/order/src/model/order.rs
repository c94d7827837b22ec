use crate::model::status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::errors::RepositoryError;
use sqlx::{FromRow, types::Json};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[serde(alias = "VNPay")]
    GatewayRedirect,
    Credit,
    #[serde(alias = "Banking")]
    Bank,
    #[serde(alias = "COD")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::GatewayRedirect => "GatewayRedirect",
            PaymentMethod::Credit => "Credit",
            PaymentMethod::Bank => "Bank",
            PaymentMethod::CashOnDelivery => "CashOnDelivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GatewayRedirect" | "VNPay" => Ok(PaymentMethod::GatewayRedirect),
            "Credit" => Ok(PaymentMethod::Credit),
            "Bank" | "Banking" => Ok(PaymentMethod::Bank),
            "CashOnDelivery" | "COD" => Ok(PaymentMethod::CashOnDelivery),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

/// Snapshot of a purchased product, frozen when the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub image_ref: String,
}

impl OrderLineItem {
    pub fn subtotal(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub owner_user_id: i64,
    pub line_items: Vec<OrderLineItem>,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn contains_product(&self, product_id: &str) -> bool {
        self.line_items.iter().any(|item| item.product_id == product_id)
    }
}

/// Row shape of the `orders` table.
#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: String,
    pub owner_user_id: i64,
    pub line_items: Json<Vec<OrderLineItem>>,
    pub total_amount: i64,
    pub payment_method: String,
    pub status: String,
    pub cancel_reason: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_method = row
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(RepositoryError::Custom)?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(RepositoryError::Custom)?;

        Ok(Order {
            id: row.id,
            owner_user_id: row.owner_user_id,
            line_items: row.line_items.0,
            total_amount: row.total_amount,
            payment_method,
            status,
            cancel_reason: row.cancel_reason,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_payment_method_names_are_accepted() {
        assert_eq!(
            "VNPay".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::GatewayRedirect
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"COD\"").unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert!("Bitcoin".parse::<PaymentMethod>().is_err());
    }
}
