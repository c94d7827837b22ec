use crate::config::GatewayConfig;
use crate::gateway::{GatewayError, canonical_query, sanitize_txn_ref, to_ascii};
use chrono::{DateTime, FixedOffset, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use url::Url;

type HmacSha512 = Hmac<Sha512>;

const VERSION: &str = "2.1.0";
const COMMAND: &str = "pay";
const LOCALE: &str = "vn";
const CURRENCY: &str = "VND";
const ORDER_TYPE: &str = "billpayment";
const FALLBACK_IP: &str = "127.0.0.1";
const ACCEPTED_CODE: &str = "00";

pub const SECURE_HASH: &str = "vnp_SecureHash";
pub const SECURE_HASH_TYPE: &str = "vnp_SecureHashType";

#[derive(Debug, Clone)]
pub struct RedirectRequest<'a> {
    pub order_id: &'a str,
    pub amount: i64,
    pub client_ip: Option<&'a str>,
    pub return_url: Option<&'a str>,
}

/// Outcome of a callback whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackVerdict {
    pub txn_ref: String,
    pub response_code: String,
    pub accepted: bool,
    /// `vnp_Amount` as reported, already multiplied by 100.
    pub amount: Option<i64>,
    pub transaction_no: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VnPayGateway {
    config: GatewayConfig,
}

impl VnPayGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn secret(&self) -> Result<&str, GatewayError> {
        self.config
            .hash_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(GatewayError::ConfigurationMissing("VNP_HASHSECRET"))
    }

    fn mac(&self, canonical: &str) -> Result<HmacSha512, GatewayError> {
        let mut mac = HmacSha512::new_from_slice(self.secret()?.as_bytes())
            .map_err(|_| GatewayError::ConfigurationMissing("VNP_HASHSECRET"))?;
        mac.update(canonical.as_bytes());
        Ok(mac)
    }

    /// Lowercase hex HMAC-SHA512 of an already canonical query string.
    pub fn signature(&self, canonical: &str) -> Result<String, GatewayError> {
        Ok(hex::encode(self.mac(canonical)?.finalize().into_bytes()))
    }

    pub fn build_redirect_url(&self, req: &RedirectRequest<'_>) -> Result<String, GatewayError> {
        self.build_redirect_url_at(req, Utc::now())
    }

    pub fn build_redirect_url_at(
        &self,
        req: &RedirectRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<String, GatewayError> {
        if req.amount <= 0 {
            return Err(GatewayError::InvalidAmount(req.amount));
        }

        let merchant_code = self
            .config
            .merchant_code
            .as_deref()
            .ok_or(GatewayError::ConfigurationMissing("VNP_TMNCODE"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(GatewayError::ConfigurationMissing("VNP_URL"))?;
        self.secret()?;

        let parsed =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;
        if parsed.query().is_some() {
            return Err(GatewayError::InvalidBaseUrl(
                "base URL must not carry a query string".into(),
            ));
        }

        let return_url = self
            .config
            .return_url
            .as_deref()
            .or(req.return_url)
            .ok_or(GatewayError::ConfigurationMissing("VNP_RETURN_URL"))?;

        let txn_ref = sanitize_txn_ref(req.order_id);
        if txn_ref.is_empty() {
            return Err(GatewayError::InvalidTransactionRef);
        }

        let amount = req
            .amount
            .checked_mul(100)
            .ok_or(GatewayError::InvalidAmount(req.amount))?;

        let client_ip = req
            .client_ip
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(FALLBACK_IP);

        let order_info = to_ascii(&format!("{} {}", self.config.order_info_prefix, txn_ref));

        let mut params = BTreeMap::new();
        params.insert("vnp_Version".to_string(), VERSION.to_string());
        params.insert("vnp_Command".to_string(), COMMAND.to_string());
        params.insert("vnp_TmnCode".to_string(), merchant_code.to_string());
        params.insert("vnp_Locale".to_string(), LOCALE.to_string());
        params.insert("vnp_CurrCode".to_string(), CURRENCY.to_string());
        params.insert("vnp_TxnRef".to_string(), txn_ref.clone());
        params.insert("vnp_OrderInfo".to_string(), order_info);
        params.insert("vnp_OrderType".to_string(), ORDER_TYPE.to_string());
        params.insert("vnp_Amount".to_string(), amount.to_string());
        params.insert("vnp_ReturnUrl".to_string(), return_url.to_string());
        params.insert("vnp_IpAddr".to_string(), client_ip.to_string());
        params.insert("vnp_CreateDate".to_string(), self.create_date(now));

        let canonical = canonical_query(&params);
        let signature = self.signature(&canonical)?;

        info!("💳 Built payment redirect for txn_ref={txn_ref} amount={amount}");

        Ok(format!("{base_url}?{canonical}&{SECURE_HASH}={signature}"))
    }

    fn create_date(&self, now: DateTime<Utc>) -> String {
        const FORMAT: &str = "%Y%m%d%H%M%S";
        match FixedOffset::east_opt(self.config.utc_offset_hours * 3600) {
            Some(offset) => now.with_timezone(&offset).format(FORMAT).to_string(),
            None => now.format(FORMAT).to_string(),
        }
    }

    pub fn verify_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<CallbackVerdict, GatewayError> {
        let provided = params
            .get(SECURE_HASH)
            .ok_or(GatewayError::InvalidSignature)?;

        let signed: BTreeMap<String, String> = params
            .iter()
            .filter(|(k, _)| k.as_str() != SECURE_HASH && k.as_str() != SECURE_HASH_TYPE)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let expected = hex::decode(provided.trim()).map_err(|_| GatewayError::InvalidSignature)?;
        let canonical = canonical_query(&signed);
        if self.mac(&canonical)?.verify_slice(&expected).is_err() {
            warn!("❌ Callback signature mismatch");
            return Err(GatewayError::InvalidSignature);
        }

        let txn_ref = signed
            .get("vnp_TxnRef")
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or(GatewayError::InvalidField("vnp_TxnRef"))?;
        let response_code = signed
            .get("vnp_ResponseCode")
            .cloned()
            .ok_or(GatewayError::InvalidField("vnp_ResponseCode"))?;
        let amount = match signed.get("vnp_Amount") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| GatewayError::InvalidField("vnp_Amount"))?,
            ),
            None => None,
        };

        Ok(CallbackVerdict {
            accepted: response_code == ACCEPTED_CODE,
            transaction_no: signed.get("vnp_TransactionNo").cloned(),
            txn_ref,
            response_code,
            amount,
        })
    }
}
