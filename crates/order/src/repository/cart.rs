use crate::{
    abstract_trait::cart::CartRepositoryTrait,
    model::cart::{Cart, CartRow},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::types::Json;
use tracing::{error, info};

#[derive(Clone)]
pub struct CartRepository {
    db: ConnectionPool,
}

impl CartRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepositoryTrait for CartRepository {
    async fn find_by_owner(&self, owner_user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT owner_user_id, lines, cached_total, updated_at
            FROM carts
            WHERE owner_user_id = $1
            "#,
        )
        .bind(owner_user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch cart of user {owner_user_id}: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(row.map(Cart::from))
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (owner_user_id, lines, cached_total, updated_at)
            VALUES ($1, $2, $3, current_timestamp)
            ON CONFLICT (owner_user_id) DO UPDATE
            SET lines        = EXCLUDED.lines,
                cached_total = EXCLUDED.cached_total,
                updated_at   = current_timestamp
            RETURNING owner_user_id, lines, cached_total, updated_at
            "#,
        )
        .bind(cart.owner_user_id)
        .bind(Json(&cart.lines))
        .bind(cart.cached_total)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!(
                "❌ Failed to save cart of user {}: {:?}",
                cart.owner_user_id, e
            );
            RepositoryError::from(e)
        })?;

        info!(
            "🛒 Saved cart of user {} ({} lines, total {})",
            cart.owner_user_id,
            cart.lines.len(),
            cart.cached_total
        );
        Ok(Cart::from(row))
    }

    async fn remove_lines(
        &self,
        owner_user_id: i64,
        product_ids: &[String],
    ) -> Result<Option<Cart>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, CartRow>(
            r#"
            UPDATE carts
            SET lines = COALESCE(
                    (SELECT jsonb_agg(line ORDER BY position)
                     FROM jsonb_array_elements(carts.lines) WITH ORDINALITY AS l(line, position)
                     WHERE NOT (line->>'product_id' = ANY($2))),
                    '[]'::jsonb),
                cached_total = COALESCE(
                    (SELECT SUM((line->>'unit_price')::BIGINT * (line->>'quantity')::BIGINT)
                     FROM jsonb_array_elements(carts.lines) AS l(line)
                     WHERE (line->>'selected')::BOOLEAN
                       AND NOT (line->>'product_id' = ANY($2))),
                    0)::BIGINT,
                updated_at = current_timestamp
            WHERE owner_user_id = $1
            RETURNING owner_user_id, lines, cached_total, updated_at
            "#,
        )
        .bind(owner_user_id)
        .bind(product_ids)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to remove lines from cart of user {owner_user_id}: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(row.map(Cart::from))
    }
}
