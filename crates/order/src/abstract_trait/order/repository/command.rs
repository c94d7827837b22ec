use crate::model::{order::Order as OrderModel, status::OrderStatus};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    /// Fails with `RepositoryError::Conflict` when the id is taken or another
    /// pending order of the same owner holds the idempotency key.
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, RepositoryError>;

    /// Drops the idempotency key of a still-pending order so a new checkout
    /// can claim it. Returns whether a key was released.
    async fn release_idempotency_key(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Compare-and-set on the status column. Returns `None` when the order is
    /// missing or its current status is not in `expected`.
    async fn transition_status(
        &self,
        id: &str,
        expected: &[OrderStatus],
        status: OrderStatus,
        cancel_reason: Option<&str>,
    ) -> Result<Option<OrderModel>, RepositoryError>;
}
