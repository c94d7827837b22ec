use crate::model::product::Product;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductCatalog = Arc<dyn ProductCatalogTrait + Send + Sync>;

/// Read side of the product catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalogTrait {
    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, RepositoryError>;
}
