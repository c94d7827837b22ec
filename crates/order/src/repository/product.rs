use crate::{abstract_trait::product::ProductCatalogTrait, model::product::Product};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct ProductCatalogRepository {
    db: ConnectionPool,
}

impl ProductCatalogRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCatalogTrait for ProductCatalogRepository {
    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, Product>(
            "SELECT product_id, name, price, image_ref FROM products WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch product {product_id}: {:?}", e);
            RepositoryError::from(e)
        })
    }
}
