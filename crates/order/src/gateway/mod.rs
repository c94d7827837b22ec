mod encode;
mod error;
mod vnpay;

pub use self::encode::{canonical_query, sanitize_txn_ref, to_ascii};
pub use self::error::GatewayError;
pub use self::vnpay::{CallbackVerdict, RedirectRequest, VnPayGateway};
