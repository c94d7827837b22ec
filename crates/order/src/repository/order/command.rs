use crate::{
    abstract_trait::order::repository::OrderCommandRepositoryTrait,
    model::{
        order::{Order as OrderModel, OrderRow},
        status::OrderStatus,
    },
    repository::order::ORDER_COLUMNS,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::types::Json;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            INSERT INTO orders (
                id, owner_user_id, line_items, total_amount, payment_method,
                status, cancel_reason, idempotency_key, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(&order.id)
            .bind(order.owner_user_id)
            .bind(Json(&order.line_items))
            .bind(order.total_amount)
            .bind(order.payment_method.as_str())
            .bind(order.status.as_str())
            .bind(order.cancel_reason.as_deref())
            .bind(order.idempotency_key.as_deref())
            .bind(order.created_at)
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    let constraint = db.constraint().unwrap_or("orders_pkey").to_string();
                    warn!(
                        "⚠️ Order {} for user {} collides on {constraint}",
                        order.id, order.owner_user_id
                    );
                    RepositoryError::Conflict(constraint)
                }
                err => {
                    error!(
                        "❌ Failed to create order for user {}: {:?}",
                        order.owner_user_id, err
                    );
                    RepositoryError::from(err)
                }
            })?;

        let created = OrderModel::try_from(row)?;
        info!(
            "✅ Created order {} for user {} ({} {})",
            created.id, created.owner_user_id, created.total_amount, created.payment_method
        );
        Ok(created)
    }

    async fn release_idempotency_key(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET idempotency_key = NULL,
                updated_at      = current_timestamp
            WHERE id = $1 AND status = 'Pending' AND idempotency_key IS NOT NULL
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to release idempotency key of order {id}: {:?}", err);
            RepositoryError::from(err)
        })?;

        let released = result.rows_affected() > 0;
        if released {
            info!("🔓 Released idempotency key of stale order {id}");
        }
        Ok(released)
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: &[OrderStatus],
        status: OrderStatus,
        cancel_reason: Option<&str>,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let expected: Vec<&str> = expected.iter().map(OrderStatus::as_str).collect();

        let sql = format!(
            r#"
            UPDATE orders
            SET status        = $3,
                cancel_reason = $4,
                updated_at    = current_timestamp
            WHERE id = $1 AND status = ANY($2)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(&expected)
            .bind(status.as_str())
            .bind(cancel_reason)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to move order {id} to {status}: {:?}", err);
                RepositoryError::from(err)
            })?;

        match row {
            Some(row) => {
                info!("🔄 Order {id} moved to {status}");
                Ok(Some(OrderModel::try_from(row)?))
            }
            None => {
                info!("⏭️ Order {id} not in {:?}, status left unchanged", expected);
                Ok(None)
            }
        }
    }
}
