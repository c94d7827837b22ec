use crate::{
    abstract_trait::{
        cart::{DynCartRepository, DynCartService},
        checkout::CheckoutServiceTrait,
        order::repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        payment::DynPaymentGateway,
        product::DynProductCatalog,
    },
    domain::{
        requests::checkout::{CheckoutItemRequest, CheckoutRequest, RequestOrigin},
        response::{api::ApiResponse, checkout::CheckoutResponse},
    },
    gateway::RedirectRequest,
    model::{
        cart::merge_quantity,
        order::{Order, OrderLineItem, PaymentMethod},
        status::OrderStatus,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use sha2::{Digest, Sha256};
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, ServiceTracer},
};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct CheckoutServiceDeps {
    pub cart: DynCartRepository,
    pub cart_service: DynCartService,
    pub catalog: DynProductCatalog,
    pub order_command: DynOrderCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub gateway: DynPaymentGateway,
    pub idempotency_window: Duration,
}

#[derive(Clone)]
pub struct CheckoutService {
    cart: DynCartRepository,
    cart_service: DynCartService,
    catalog: DynProductCatalog,
    order_command: DynOrderCommandRepository,
    order_query: DynOrderQueryRepository,
    gateway: DynPaymentGateway,
    idempotency_window: Duration,
    tracer: ServiceTracer,
}

/// Line items chosen for one checkout.
struct Selection {
    line_items: Vec<OrderLineItem>,
    total_amount: i64,
}

impl CheckoutService {
    pub fn new(deps: CheckoutServiceDeps, registry: &mut Registry) -> Self {
        let CheckoutServiceDeps {
            cart,
            cart_service,
            catalog,
            order_command,
            order_query,
            gateway,
            idempotency_window,
        } = deps;

        Self {
            cart,
            cart_service,
            catalog,
            order_command,
            order_query,
            gateway,
            idempotency_window,
            tracer: ServiceTracer::new("checkout_service", registry),
        }
    }

    async fn select_explicit(
        &self,
        items: &[CheckoutItemRequest],
    ) -> Result<Selection, ServiceError> {
        let mut line_items: Vec<OrderLineItem> = Vec::with_capacity(items.len());

        for item in items {
            let quantity = merge_quantity(&item.product_id, 0, item.quantity.unwrap_or(1))
                .map_err(|e| ServiceError::Validation(vec![e.to_string()]))?;

            if let Some(existing) = line_items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                existing.quantity = merge_quantity(&item.product_id, existing.quantity, quantity)
                    .map_err(|e| ServiceError::Validation(vec![e.to_string()]))?;
                continue;
            }

            let product = self
                .catalog
                .find_by_id(&item.product_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Product {}", item.product_id)))?;

            line_items.push(OrderLineItem {
                product_id: product.product_id,
                name: product.name,
                unit_price: product.price,
                quantity,
                image_ref: product.image_ref,
            });
        }

        Ok(Selection {
            total_amount: line_items.iter().map(OrderLineItem::subtotal).sum(),
            line_items,
        })
    }

    async fn select_from_cart(&self, owner_user_id: i64) -> Result<Selection, ServiceError> {
        let cart = self
            .cart
            .find_by_owner(owner_user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(ServiceError::EmptyCart)?;

        let line_items: Vec<OrderLineItem> = cart
            .selected_lines()
            .map(|line| OrderLineItem {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                image_ref: line.image_ref.clone(),
            })
            .collect();

        if line_items.is_empty() {
            return Err(ServiceError::NoSelection);
        }

        Ok(Selection {
            line_items,
            total_amount: cart.cached_total,
        })
    }

    /// Returns the pending order for `key` inside the window, or creates one.
    ///
    /// The partial unique index on pending keys decides concurrent first
    /// attempts: the loser re-reads and returns the winner's order.
    async fn find_or_create_order(
        &self,
        owner_user_id: i64,
        payment_method: PaymentMethod,
        selection: Selection,
        key: String,
    ) -> Result<(Order, bool), ServiceError> {
        let since = Utc::now() - self.idempotency_window;

        if let Some(existing) = self
            .order_query
            .find_pending_by_idempotency_key(owner_user_id, &key, since)
            .await?
        {
            return reuse(existing, payment_method, &selection.line_items);
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().simple().to_string(),
            owner_user_id,
            line_items: selection.line_items,
            total_amount: selection.total_amount,
            payment_method,
            status: OrderStatus::Pending,
            cancel_reason: None,
            idempotency_key: Some(key),
            created_at: now,
            updated_at: now,
        };

        match self.order_command.create_order(&order).await {
            Ok(created) => Ok((created, false)),
            Err(RepositoryError::Conflict(constraint)) => {
                warn!("⚠️ Checkout key of user {owner_user_id} is held ({constraint}), re-reading");
                self.resolve_key_conflict(&order, since).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_key_conflict(
        &self,
        order: &Order,
        since: DateTime<Utc>,
    ) -> Result<(Order, bool), ServiceError> {
        let key = order.idempotency_key.as_deref().unwrap_or_default();

        let holder = self
            .order_query
            .find_pending_by_idempotency_key(order.owner_user_id, key, DateTime::<Utc>::UNIX_EPOCH)
            .await?;

        match holder {
            Some(existing) if existing.created_at >= since => {
                reuse(existing, order.payment_method, &order.line_items)
            }
            Some(stale) => {
                self.order_command.release_idempotency_key(&stale.id).await?;
                let created = self.order_command.create_order(order).await?;
                Ok((created, false))
            }
            // the holder left Pending between the insert and the re-read
            None => {
                let created = self.order_command.create_order(order).await?;
                Ok((created, false))
            }
        }
    }

    async fn clear_cart(&self, owner_user_id: i64, order: &Order) {
        let product_ids: Vec<String> = order
            .line_items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();

        // the order is already durable at this point
        if let Err(e) = self.cart_service.clear(owner_user_id, &product_ids).await {
            warn!("⚠️ Order placed but cart of user {owner_user_id} was not cleared: {e}");
        }
    }

    async fn place(
        &self,
        owner_user_id: i64,
        req: &CheckoutRequest,
        origin: &RequestOrigin,
    ) -> Result<ApiResponse<CheckoutResponse>, ServiceError> {
        let payment_method = req
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|_| ServiceError::InvalidPaymentMethod(req.payment_method.clone()))?;

        if payment_method == PaymentMethod::Credit {
            return Err(ServiceError::PaymentMethodUnavailable(
                payment_method.to_string(),
            ));
        }

        let selection = match req.items.as_deref() {
            Some(items) if !items.is_empty() => self.select_explicit(items).await?,
            _ => self.select_from_cart(owner_user_id).await?,
        };

        if payment_method == PaymentMethod::GatewayRedirect && selection.total_amount <= 0 {
            return Err(ServiceError::Validation(vec![
                "total amount must be greater than zero for gateway payments".into(),
            ]));
        }

        let key = req.idempotency_key.clone().unwrap_or_else(|| {
            snapshot_key(owner_user_id, payment_method, &selection.line_items)
        });

        let (order, reused) = self
            .find_or_create_order(owner_user_id, payment_method, selection, key)
            .await?;

        let payment_url = match payment_method {
            PaymentMethod::GatewayRedirect => {
                let url = self
                    .gateway
                    .build_redirect_url(&RedirectRequest {
                        order_id: &order.id,
                        amount: order.total_amount,
                        client_ip: origin.client_ip.as_deref(),
                        return_url: origin.return_url.as_deref(),
                    })
                    .map_err(|e| {
                        error!("❌ Could not build payment URL for order {}: {e}", order.id);
                        ServiceError::PaymentSetupFailed(e.to_string())
                    })?;
                Some(url)
            }
            _ => None,
        };

        self.clear_cart(owner_user_id, &order).await;

        let message = if reused {
            "Pending order already exists for this checkout"
        } else {
            "Order created successfully"
        };

        Ok(ApiResponse::success(
            message,
            CheckoutResponse {
                order_id: order.id,
                status: order.status,
                payment_method: order.payment_method,
                total_amount: order.total_amount,
                payment_url,
                reused,
            },
        ))
    }
}

/// Hands back a pending order found under the caller's key, provided it was
/// placed for the same products, quantities and payment method.
fn reuse(
    existing: Order,
    payment_method: PaymentMethod,
    line_items: &[OrderLineItem],
) -> Result<(Order, bool), ServiceError> {
    let quantities = |items: &[OrderLineItem]| {
        let mut pairs: Vec<(String, i32)> = items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();
        pairs.sort();
        pairs
    };

    if existing.payment_method != payment_method
        || quantities(&existing.line_items) != quantities(line_items)
    {
        warn!(
            "⚠️ Key of order {} replayed with a different checkout",
            existing.id
        );
        return Err(ServiceError::IdempotencyConflict(
            existing.idempotency_key.unwrap_or_default(),
        ));
    }

    info!(
        "♻️ Reusing pending order {} for user {}",
        existing.id, existing.owner_user_id
    );
    Ok((existing, true))
}

/// Digest of who is buying what, how, and at which price.
fn snapshot_key(owner_user_id: i64, payment_method: PaymentMethod, items: &[OrderLineItem]) -> String {
    let mut parts: Vec<String> = items
        .iter()
        .map(|item| format!("{}:{}:{}", item.product_id, item.quantity, item.unit_price))
        .collect();
    parts.sort();

    let mut hasher = Sha256::new();
    hasher.update(format!("{owner_user_id}|{payment_method}|{}", parts.join(",")));
    hex::encode(hasher.finalize())
}

#[async_trait]
impl CheckoutServiceTrait for CheckoutService {
    async fn checkout(
        &self,
        owner_user_id: i64,
        req: &CheckoutRequest,
        origin: &RequestOrigin,
    ) -> Result<ApiResponse<CheckoutResponse>, ServiceError> {
        info!(
            "🧾 Checkout for user {owner_user_id} with {}",
            req.payment_method
        );

        let tracing_ctx = self.tracer.start(
            "checkout",
            vec![
                KeyValue::new("component", "checkout"),
                KeyValue::new("operation", "create"),
                KeyValue::new("checkout.owner_user_id", owner_user_id),
                KeyValue::new("checkout.payment_method", req.payment_method.clone()),
            ],
        );

        let result = self.place(owner_user_id, req, origin).await;

        self.tracer
            .finish(&tracing_ctx, Method::Post, result, "Checkout completed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GatewayConfig,
        gateway::VnPayGateway,
        model::cart::Cart,
        service::{
            CartService,
            test_support::{
                InMemoryCarts, InMemoryOrders, catalog, gateway, order, product, registry,
            },
        },
    };
    use std::{collections::HashMap, sync::Arc};
    use url::Url;

    struct Fixture {
        carts: InMemoryCarts,
        orders: InMemoryOrders,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                carts: InMemoryCarts::default(),
                orders: InMemoryOrders::default(),
            }
        }

        fn service_with(&self, gateway: VnPayGateway) -> CheckoutService {
            let catalog = Arc::new(catalog(vec![
                product("P1", 100_000),
                product("P2", 50_000),
                product("FREE", 0),
            ]));
            let cart_service = Arc::new(CartService::new(
                Arc::new(self.carts.clone()),
                catalog.clone(),
                &mut registry(),
            ));

            CheckoutService::new(
                CheckoutServiceDeps {
                    cart: Arc::new(self.carts.clone()),
                    cart_service,
                    catalog,
                    order_command: Arc::new(self.orders.clone()),
                    order_query: Arc::new(self.orders.clone()),
                    gateway: Arc::new(gateway),
                    idempotency_window: Duration::seconds(900),
                },
                &mut registry(),
            )
        }

        fn service(&self) -> CheckoutService {
            self.service_with(gateway())
        }

        async fn cart(&self, owner: i64, lines: &[(&str, i64, i32, bool)]) {
            let mut cart = Cart::new(owner);
            for (id, price, qty, selected) in lines {
                cart.add(&product(id, *price), *qty).unwrap();
                cart.set_selected(id, *selected);
            }
            self.carts.put(cart).await;
        }
    }

    fn request(method: &str) -> CheckoutRequest {
        CheckoutRequest {
            payment_method: method.into(),
            items: None,
            idempotency_key: None,
        }
    }

    fn explicit(method: &str, items: &[(&str, Option<i32>)]) -> CheckoutRequest {
        CheckoutRequest {
            items: Some(
                items
                    .iter()
                    .map(|(id, qty)| CheckoutItemRequest {
                        product_id: id.to_string(),
                        quantity: *qty,
                    })
                    .collect(),
            ),
            ..request(method)
        }
    }

    #[tokio::test]
    async fn cash_on_delivery_takes_selected_lines_and_keeps_the_rest() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 2, true), ("P2", 50_000, 1, false)])
            .await;

        let resp = fx
            .service()
            .checkout(1, &request("CashOnDelivery"), &RequestOrigin::default())
            .await
            .unwrap();

        assert_eq!(resp.data.status, OrderStatus::Pending);
        assert_eq!(resp.data.total_amount, 200_000);
        assert!(resp.data.payment_url.is_none());
        assert!(!resp.data.reused);

        let order = fx.orders.get(&resp.data.order_id).await.unwrap();
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(
            order.total_amount,
            order.line_items.iter().map(OrderLineItem::subtotal).sum::<i64>()
        );

        let cart = fx.carts.get(1).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product_id, "P2");
        assert_eq!(cart.cached_total, 0);
    }

    #[tokio::test]
    async fn gateway_checkout_empties_fully_selected_cart_only_for_caller() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 1, true), ("P2", 50_000, 2, true)])
            .await;
        fx.cart(2, &[("P1", 100_000, 1, true)]).await;

        let origin = RequestOrigin {
            client_ip: Some("10.0.0.5".into()),
            return_url: None,
        };
        let resp = fx
            .service()
            .checkout(1, &request("GatewayRedirect"), &origin)
            .await
            .unwrap();

        let url = resp.data.payment_url.expect("payment url");
        let params: HashMap<String, String> = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(params["vnp_Amount"], "20000000");
        assert_eq!(params["vnp_TxnRef"], resp.data.order_id);
        assert_eq!(params["vnp_IpAddr"], "10.0.0.5");

        assert!(fx.carts.get(1).await.unwrap().lines.is_empty());
        assert_eq!(fx.carts.get(2).await.unwrap().lines.len(), 1);
    }

    #[tokio::test]
    async fn credit_is_refused_before_anything_is_written() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 1, true)]).await;

        let err = fx
            .service()
            .checkout(1, &request("Credit"), &RequestOrigin::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::PaymentMethodUnavailable(_)));
        assert_eq!(fx.orders.len().await, 0);
        assert_eq!(fx.carts.get(1).await.unwrap().lines.len(), 1);
    }

    #[tokio::test]
    async fn empty_or_unselected_cart_is_rejected() {
        let fx = Fixture::new();
        let service = fx.service();

        let err = service
            .checkout(1, &request("COD"), &RequestOrigin::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyCart));

        fx.cart(1, &[("P1", 100_000, 1, false)]).await;
        let err = service
            .checkout(1, &request("COD"), &RequestOrigin::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoSelection));

        let err = service
            .checkout(1, &request("Bitcoin"), &RequestOrigin::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPaymentMethod(_)));
        assert_eq!(fx.orders.len().await, 0);
    }

    #[tokio::test]
    async fn explicit_items_use_catalog_prices() {
        let fx = Fixture::new();
        fx.cart(1, &[("P2", 50_000, 1, true)]).await;

        let resp = fx
            .service()
            .checkout(
                1,
                &explicit("Bank", &[("P1", None), ("P1", Some(2))]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap();

        let order = fx.orders.get(&resp.data.order_id).await.unwrap();
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.line_items[0].quantity, 3);
        assert_eq!(order.line_items[0].unit_price, 100_000);
        assert_eq!(order.total_amount, 300_000);
        assert_eq!(order.payment_method, PaymentMethod::Bank);
        // P2 was not ordered
        let cart = fx.carts.get(1).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product_id, "P2");
    }

    #[tokio::test]
    async fn explicit_cash_on_delivery_removes_ordered_products_from_cart() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 1, false), ("P2", 50_000, 1, true)])
            .await;
        fx.cart(2, &[("P1", 100_000, 1, true)]).await;

        fx.service()
            .checkout(
                1,
                &explicit("CashOnDelivery", &[("P1", None), ("P2", Some(2))]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap();

        let cart = fx.carts.get(1).await.unwrap();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.cached_total, 0);
        assert_eq!(fx.carts.get(2).await.unwrap().lines.len(), 1);
    }

    #[tokio::test]
    async fn explicit_gateway_checkout_removes_ordered_product_only() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 1, true), ("P2", 50_000, 1, true)])
            .await;

        let resp = fx
            .service()
            .checkout(
                1,
                &explicit("GatewayRedirect", &[("P1", None)]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap();

        assert!(resp.data.payment_url.is_some());
        let cart = fx.carts.get(1).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product_id, "P2");
        assert_eq!(cart.cached_total, 50_000);
    }

    #[tokio::test]
    async fn explicit_quantities_past_the_line_limit_are_rejected() {
        let fx = Fixture::new();

        let err = fx
            .service()
            .checkout(
                1,
                &explicit("COD", &[("P1", Some(600)), ("P1", Some(600))]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(fx.orders.len().await, 0);
    }

    #[tokio::test]
    async fn explicit_unknown_product_creates_nothing() {
        let fx = Fixture::new();

        let err = fx
            .service()
            .checkout(
                1,
                &explicit("COD", &[("P1", None), ("GHOST", None)]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(fx.orders.len().await, 0);
    }

    #[tokio::test]
    async fn zero_total_cannot_go_through_the_gateway() {
        let fx = Fixture::new();

        let err = fx
            .service()
            .checkout(
                1,
                &explicit("GatewayRedirect", &[("FREE", None)]),
                &RequestOrigin::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(fx.orders.len().await, 0);
    }

    #[tokio::test]
    async fn failed_payment_setup_keeps_cart_and_retry_reuses_order() {
        let fx = Fixture::new();
        fx.cart(1, &[("P1", 100_000, 1, true)]).await;

        let broken = fx.service_with(VnPayGateway::new(GatewayConfig::default()));
        for _ in 0..2 {
            let err = broken
                .checkout(1, &request("GatewayRedirect"), &RequestOrigin::default())
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::PaymentSetupFailed(_)));
        }

        assert_eq!(fx.orders.len().await, 1);
        let pending = fx.orders.all().await.remove(0);
        assert_eq!(pending.status, OrderStatus::Pending);
        assert_eq!(fx.carts.get(1).await.unwrap().lines.len(), 1);

        let resp = fx
            .service()
            .checkout(1, &request("GatewayRedirect"), &RequestOrigin::default())
            .await
            .unwrap();
        assert!(resp.data.reused);
        assert_eq!(resp.data.order_id, pending.id);
        assert_eq!(fx.orders.len().await, 1);
        assert!(fx.carts.get(1).await.unwrap().lines.is_empty());
    }

    #[tokio::test]
    async fn caller_supplied_key_collapses_duplicate_submissions() {
        let fx = Fixture::new();
        let service = fx.service();
        let req = CheckoutRequest {
            idempotency_key: Some("client-retry-0001".into()),
            ..explicit("COD", &[("P1", Some(1))])
        };

        let first = service.checkout(1, &req, &RequestOrigin::default()).await.unwrap();
        let second = service.checkout(1, &req, &RequestOrigin::default()).await.unwrap();

        assert!(!first.data.reused);
        assert!(second.data.reused);
        assert_eq!(first.data.order_id, second.data.order_id);
        assert_eq!(fx.orders.len().await, 1);

        // another user with the same key gets an order of their own
        let other = service.checkout(2, &req, &RequestOrigin::default()).await.unwrap();
        assert_ne!(other.data.order_id, first.data.order_id);
    }

    #[tokio::test]
    async fn caller_key_replayed_for_another_checkout_is_refused() {
        let fx = Fixture::new();
        let service = fx.service();
        let first = CheckoutRequest {
            idempotency_key: Some("client-retry-0001".into()),
            ..explicit("COD", &[("P1", Some(1))])
        };
        let second = CheckoutRequest {
            idempotency_key: Some("client-retry-0001".into()),
            ..explicit("GatewayRedirect", &[("P2", Some(3))])
        };

        service.checkout(1, &first, &RequestOrigin::default()).await.unwrap();
        let err = service
            .checkout(1, &second, &RequestOrigin::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::IdempotencyConflict(_)));
        assert_eq!(fx.orders.len().await, 1);
        let kept = fx.orders.all().await.remove(0);
        assert_eq!(kept.payment_method, PaymentMethod::CashOnDelivery);

        let same_items_other_method = CheckoutRequest {
            idempotency_key: Some("client-retry-0001".into()),
            ..explicit("Bank", &[("P1", Some(1))])
        };
        assert!(matches!(
            service
                .checkout(1, &same_items_other_method, &RequestOrigin::default())
                .await,
            Err(ServiceError::IdempotencyConflict(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_identical_checkouts_create_one_order() {
        let fx = Fixture::new();
        let service = fx.service();
        let req = explicit("COD", &[("P1", Some(2))]);

        let origin = RequestOrigin::default();
        let (a, b) = tokio::join!(
            service.checkout(1, &req, &origin),
            service.checkout(1, &req, &origin),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(fx.orders.len().await, 1);
        assert_eq!(a.data.order_id, b.data.order_id);
        assert_ne!(a.data.reused, b.data.reused);
    }

    #[tokio::test]
    async fn stale_pending_order_releases_its_key() {
        let fx = Fixture::new();
        let mut stale = order("STALE1", 1, &[("P1", 100_000, 1)], OrderStatus::Pending);
        stale.payment_method = PaymentMethod::CashOnDelivery;
        stale.idempotency_key = Some("client-retry-0001".into());
        stale.created_at = Utc::now() - Duration::hours(2);
        fx.orders.insert(stale).await;

        let req = CheckoutRequest {
            idempotency_key: Some("client-retry-0001".into()),
            ..explicit("COD", &[("P1", Some(1))])
        };
        let resp = fx
            .service()
            .checkout(1, &req, &RequestOrigin::default())
            .await
            .unwrap();

        assert!(!resp.data.reused);
        assert_ne!(resp.data.order_id, "STALE1");
        assert_eq!(fx.orders.len().await, 2);
        let stale = fx.orders.get("STALE1").await.unwrap();
        assert_eq!(stale.status, OrderStatus::Pending);
        assert_eq!(stale.idempotency_key, None);
    }

    #[test]
    fn snapshot_key_ignores_line_order() {
        let a = OrderLineItem {
            product_id: "P1".into(),
            name: "a".into(),
            unit_price: 10,
            quantity: 1,
            image_ref: String::new(),
        };
        let b = OrderLineItem {
            product_id: "P2".into(),
            ..a.clone()
        };

        let forward = snapshot_key(1, PaymentMethod::Bank, &[a.clone(), b.clone()]);
        let backward = snapshot_key(1, PaymentMethod::Bank, &[b.clone(), a.clone()]);
        assert_eq!(forward, backward);
        assert_ne!(forward, snapshot_key(1, PaymentMethod::CashOnDelivery, &[a, b]));
    }
}
