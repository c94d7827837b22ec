use crate::model::cart::Cart;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCartRepository = Arc<dyn CartRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CartRepositoryTrait {
    async fn find_by_owner(&self, owner_user_id: i64) -> Result<Option<Cart>, RepositoryError>;
    /// Inserts or replaces the owner's cart document.
    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError>;
    /// Removes the lines of `product_ids` in one atomic step and recomputes the
    /// total; lines written concurrently are kept. `None` when no cart exists.
    async fn remove_lines(
        &self,
        owner_user_id: i64,
        product_ids: &[String],
    ) -> Result<Option<Cart>, RepositoryError>;
}
