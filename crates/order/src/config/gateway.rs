use anyhow::{Context, Result};
use std::fmt;

const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;
const DEFAULT_ORDER_INFO_PREFIX: &str = "Thanh toán đơn hàng";

/// Settings of the hosted payment page. Values are optional at load time so the
/// service can still serve non-gateway checkouts when the merchant account is
/// not configured; the adapter reports `ConfigurationMissing` on use.
#[derive(Clone)]
pub struct GatewayConfig {
    pub merchant_code: Option<String>,
    pub hash_secret: Option<String>,
    pub base_url: Option<String>,
    pub return_url: Option<String>,
    pub utc_offset_hours: i32,
    pub order_info_prefix: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let utc_offset_hours = match non_empty_var("VNP_UTC_OFFSET_HOURS") {
            Some(raw) => raw
                .parse::<i32>()
                .context("VNP_UTC_OFFSET_HOURS must be a valid i32 integer")?,
            None => DEFAULT_UTC_OFFSET_HOURS,
        };

        Ok(Self {
            merchant_code: non_empty_var("VNP_TMNCODE"),
            hash_secret: non_empty_var("VNP_HASHSECRET"),
            base_url: non_empty_var("VNP_URL"),
            return_url: non_empty_var("VNP_RETURN_URL"),
            utc_offset_hours,
            order_info_prefix: non_empty_var("VNP_ORDER_INFO_PREFIX")
                .unwrap_or_else(|| DEFAULT_ORDER_INFO_PREFIX.to_string()),
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_code: None,
            hash_secret: None,
            base_url: None,
            return_url: None,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            order_info_prefix: DEFAULT_ORDER_INFO_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_code", &self.merchant_code)
            .field("hash_secret", &self.hash_secret.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("return_url", &self.return_url)
            .field("utc_offset_hours", &self.utc_offset_hours)
            .field("order_info_prefix", &self.order_info_prefix)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
