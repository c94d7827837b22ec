mod command;
mod query;

pub use self::command::OrderCommandRepository;
pub use self::query::OrderQueryRepository;

pub(crate) const ORDER_COLUMNS: &str = "id, owner_user_id, line_items, total_amount, payment_method, \
     status, cancel_reason, idempotency_key, created_at, updated_at";
