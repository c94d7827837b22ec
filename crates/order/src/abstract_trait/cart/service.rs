use crate::domain::{
    requests::cart::AddCartItemsRequest,
    response::{
        api::ApiResponse,
        cart::{CartResponse, SelectedCartResponse},
    },
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynCartService = Arc<dyn CartServiceTrait + Send + Sync>;

#[async_trait]
pub trait CartServiceTrait {
    async fn get_cart(&self, owner_user_id: i64)
    -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn get_selected(
        &self,
        owner_user_id: i64,
    ) -> Result<ApiResponse<SelectedCartResponse>, ServiceError>;
    async fn add_items(
        &self,
        owner_user_id: i64,
        req: &AddCartItemsRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn set_selected(
        &self,
        owner_user_id: i64,
        product_id: &str,
        selected: bool,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn set_quantity(
        &self,
        owner_user_id: i64,
        product_id: &str,
        quantity: i32,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn remove_line(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    /// Removes the lines of the products that were just ordered.
    async fn clear(&self, owner_user_id: i64, product_ids: &[String]) -> Result<(), ServiceError>;
}
