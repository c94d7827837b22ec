use crate::{domain::requests::order::FindOrdersQuery, model::order::Order as OrderModel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, id: &str) -> Result<Option<OrderModel>, RepositoryError>;

    async fn find_by_owner(
        &self,
        owner_user_id: i64,
        req: &FindOrdersQuery,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;

    async fn find_pending_by_idempotency_key(
        &self,
        owner_user_id: i64,
        key: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Option<OrderModel>, RepositoryError>;

    async fn has_entitlement(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<bool, RepositoryError>;
}
