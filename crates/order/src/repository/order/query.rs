use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::requests::order::FindOrdersQuery,
    model::{
        order::{Order as OrderModel, OrderRow},
        status::OrderStatus,
    },
    repository::order::ORDER_COLUMNS,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::FromRow;
use tracing::{error, info};

#[derive(FromRow)]
struct OrderPageRow {
    #[sqlx(flatten)]
    order: OrderRow,
    total_count: i64,
}

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<OrderModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order {id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        row.map(OrderModel::try_from).transpose()
    }

    async fn find_by_owner(
        &self,
        owner_user_id: i64,
        req: &FindOrdersQuery,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!(
            "🔍 Fetching orders of user {owner_user_id} with status: {:?}",
            req.status
        );

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let limit = i64::from(req.page_size);
        let offset = i64::from((req.page - 1).max(0)) * limit;

        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM orders
            WHERE owner_user_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, OrderPageRow>(&sql)
            .bind(owner_user_id)
            .bind(req.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch orders: {:?}", e);
                RepositoryError::from(e)
            })?;

        let total = rows.first().map(|r| r.total_count).unwrap_or(0);

        let orders = rows
            .into_iter()
            .map(|r| OrderModel::try_from(r.order))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, total))
    }

    async fn find_pending_by_idempotency_key(
        &self,
        owner_user_id: i64,
        key: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE owner_user_id = $1
              AND idempotency_key = $2
              AND status = $3
              AND created_at >= $4
            ORDER BY created_at DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(owner_user_id)
            .bind(key)
            .bind(OrderStatus::Pending.as_str())
            .bind(created_after)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to look up idempotency key: {:?}", e);
                RepositoryError::from(e)
            })?;

        row.map(OrderModel::try_from).transpose()
    }

    async fn has_entitlement(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let granting: Vec<&str> = OrderStatus::ALL
            .iter()
            .filter(|s| s.grants_entitlement())
            .map(OrderStatus::as_str)
            .collect();

        let entitled: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM orders
                WHERE owner_user_id = $1
                  AND status = ANY($3)
                  AND line_items @> jsonb_build_array(jsonb_build_object('product_id', $2::TEXT))
            )
            "#,
        )
        .bind(owner_user_id)
        .bind(product_id)
        .bind(&granting)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to check entitlement: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(entitled)
    }
}
