use crate::{
    abstract_trait::{
        cart::{CartServiceTrait, DynCartRepository},
        product::DynProductCatalog,
    },
    domain::{
        requests::cart::AddCartItemsRequest,
        response::{
            api::ApiResponse,
            cart::{CartResponse, SelectedCartResponse},
        },
    },
    model::cart::Cart,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};
use tracing::info;

#[derive(Clone)]
pub struct CartService {
    repo: DynCartRepository,
    catalog: DynProductCatalog,
    tracer: ServiceTracer,
}

impl CartService {
    pub fn new(repo: DynCartRepository, catalog: DynProductCatalog, registry: &mut Registry) -> Self {
        Self {
            repo,
            catalog,
            tracer: ServiceTracer::new("cart_service", registry),
        }
    }

    async fn load(&self, owner_user_id: i64) -> Result<Cart, ServiceError> {
        self.repo
            .find_by_owner(owner_user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart of user {owner_user_id}")))
    }

    /// Loads the cart, applies `change` to one line and saves the result.
    async fn update_line<F>(
        &self,
        owner_user_id: i64,
        product_id: &str,
        change: F,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>
    where
        F: FnOnce(&mut Cart) -> bool + Send,
    {
        let mut cart = self.load(owner_user_id).await?;

        if !change(&mut cart) {
            return Err(ServiceError::NotFound(format!("Cart line {product_id}")));
        }

        let saved = self.repo.save(&cart).await?;
        Ok(ApiResponse::success("Cart updated", CartResponse::from(saved)))
    }

    async fn add_products(
        &self,
        owner_user_id: i64,
        req: &AddCartItemsRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let mut cart = self
            .repo
            .find_by_owner(owner_user_id)
            .await?
            .unwrap_or_else(|| Cart::new(owner_user_id));

        for item in &req.products {
            let product = self
                .catalog
                .find_by_id(&item.product_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Product {}", item.product_id)))?;

            cart.add(&product, item.quantity)
                .map_err(|e| ServiceError::Validation(vec![e.to_string()]))?;
        }

        let saved = self.repo.save(&cart).await?;
        info!(
            "🛒 User {owner_user_id} added {} product(s) to cart",
            req.products.len()
        );
        Ok(ApiResponse::success(
            "Products added to cart",
            CartResponse::from(saved),
        ))
    }

    fn span_attributes(operation: &'static str, owner_user_id: i64) -> Vec<KeyValue> {
        vec![
            KeyValue::new("component", "cart"),
            KeyValue::new("operation", operation),
            KeyValue::new("cart.owner_user_id", owner_user_id),
        ]
    }
}

#[async_trait]
impl CartServiceTrait for CartService {
    async fn get_cart(
        &self,
        owner_user_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let cart = self
            .repo
            .find_by_owner(owner_user_id)
            .await?
            .unwrap_or_else(|| Cart::new(owner_user_id));

        Ok(ApiResponse::success("Cart retrieved", CartResponse::from(cart)))
    }

    async fn get_selected(
        &self,
        owner_user_id: i64,
    ) -> Result<ApiResponse<SelectedCartResponse>, ServiceError> {
        let cart = self
            .repo
            .find_by_owner(owner_user_id)
            .await?
            .unwrap_or_else(|| Cart::new(owner_user_id));

        Ok(ApiResponse::success(
            "Selected cart lines retrieved",
            SelectedCartResponse::from(&cart),
        ))
    }

    async fn add_items(
        &self,
        owner_user_id: i64,
        req: &AddCartItemsRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self
            .tracer
            .start("add_cart_items", Self::span_attributes("add", owner_user_id));

        let result = self.add_products(owner_user_id, req).await;

        self.tracer
            .finish(&tracing_ctx, Method::Post, result, "Cart items added")
    }

    async fn set_selected(
        &self,
        owner_user_id: i64,
        product_id: &str,
        selected: bool,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self
            .tracer
            .start("set_cart_selected", Self::span_attributes("select", owner_user_id));

        let result = self
            .update_line(owner_user_id, product_id, |cart| {
                cart.set_selected(product_id, selected)
            })
            .await;

        self.tracer
            .finish(&tracing_ctx, Method::Put, result, "Cart selection updated")
    }

    async fn set_quantity(
        &self,
        owner_user_id: i64,
        product_id: &str,
        quantity: i32,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self
            .tracer
            .start("set_cart_quantity", Self::span_attributes("quantity", owner_user_id));

        let result = if quantity < 1 {
            Err(ServiceError::Validation(vec![
                "quantity must be at least 1".into(),
            ]))
        } else {
            self.update_line(owner_user_id, product_id, |cart| {
                cart.set_quantity(product_id, quantity)
            })
            .await
        };

        self.tracer
            .finish(&tracing_ctx, Method::Put, result, "Cart quantity updated")
    }

    async fn remove_line(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = self
            .tracer
            .start("remove_cart_line", Self::span_attributes("remove", owner_user_id));

        let result = self
            .update_line(owner_user_id, product_id, |cart| cart.remove(product_id))
            .await;

        self.tracer
            .finish(&tracing_ctx, Method::Delete, result, "Cart line removed")
    }

    async fn clear(&self, owner_user_id: i64, product_ids: &[String]) -> Result<(), ServiceError> {
        if product_ids.is_empty() {
            return Ok(());
        }

        if let Some(cart) = self.repo.remove_lines(owner_user_id, product_ids).await? {
            info!(
                "🧹 Removed {} ordered product(s) from cart of user {owner_user_id}, {} line(s) left",
                product_ids.len(),
                cart.lines.len()
            );
        }
        Ok(())
    }
}
