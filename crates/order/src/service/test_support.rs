use crate::{
    abstract_trait::{
        cart::CartRepositoryTrait,
        order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
        product::MockProductCatalogTrait,
    },
    config::GatewayConfig,
    domain::requests::order::FindOrdersQuery,
    gateway::{VnPayGateway, canonical_query},
    model::{
        cart::Cart,
        order::{Order, OrderLineItem, PaymentMethod},
        product::Product,
        status::OrderStatus,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prometheus_client::registry::Registry;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::Mutex;

pub const SECRET: &str = "TESTSECRET";

/// Order ledger kept in memory; status updates are compare-and-set under one lock.
#[derive(Clone, Default)]
pub struct InMemoryOrders {
    orders: Arc<Mutex<HashMap<String, Order>>>,
    status_writes: Arc<AtomicUsize>,
}

impl InMemoryOrders {
    pub async fn insert(&self, order: Order) {
        self.orders.lock().await.insert(order.id.clone(), order);
    }

    pub async fn get(&self, id: &str) -> Option<Order> {
        self.orders.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.orders.lock().await.len()
    }

    pub async fn all(&self) -> Vec<Order> {
        self.orders.lock().await.values().cloned().collect()
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for InMemoryOrders {
    async fn create_order(&self, order: &Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.lock().await;
        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Conflict("orders_pkey".into()));
        }
        let key_taken = order.idempotency_key.is_some()
            && orders.values().any(|o| {
                o.owner_user_id == order.owner_user_id
                    && o.status == OrderStatus::Pending
                    && o.idempotency_key == order.idempotency_key
            });
        if key_taken {
            return Err(RepositoryError::Conflict(
                "uq_orders_pending_idempotency_key".into(),
            ));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order.clone())
    }

    async fn release_idempotency_key(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut orders = self.orders.lock().await;
        Ok(orders
            .get_mut(id)
            .filter(|o| o.status == OrderStatus::Pending)
            .and_then(|o| o.idempotency_key.take())
            .is_some())
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: &[OrderStatus],
        status: OrderStatus,
        cancel_reason: Option<&str>,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.lock().await;
        let Some(order) = orders.get_mut(id) else {
            return Ok(None);
        };
        if !expected.contains(&order.status) {
            return Ok(None);
        }

        order.status = status;
        order.cancel_reason = cancel_reason.map(str::to_string);
        order.updated_at = Utc::now();
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryOrders {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        Ok(self.get(id).await)
    }

    async fn find_by_owner(
        &self,
        owner_user_id: i64,
        req: &FindOrdersQuery,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let mut matching: Vec<Order> = self
            .all()
            .await
            .into_iter()
            .filter(|o| o.owner_user_id == owner_user_id)
            .filter(|o| req.status.is_none_or(|s| o.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let skip = ((req.page - 1).max(0) * req.page_size) as usize;
        let page = matching
            .into_iter()
            .skip(skip)
            .take(req.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_pending_by_idempotency_key(
        &self,
        owner_user_id: i64,
        key: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .all()
            .await
            .into_iter()
            .filter(|o| {
                o.owner_user_id == owner_user_id
                    && o.status == OrderStatus::Pending
                    && o.idempotency_key.as_deref() == Some(key)
                    && o.created_at >= created_after
            })
            .max_by_key(|o| o.created_at))
    }

    async fn has_entitlement(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.all().await.iter().any(|o| {
            o.owner_user_id == owner_user_id
                && o.status.grants_entitlement()
                && o.contains_product(product_id)
        }))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCarts {
    carts: Arc<Mutex<HashMap<i64, Cart>>>,
}

impl InMemoryCarts {
    pub async fn get(&self, owner_user_id: i64) -> Option<Cart> {
        self.carts.lock().await.get(&owner_user_id).cloned()
    }

    pub async fn put(&self, cart: Cart) {
        self.carts.lock().await.insert(cart.owner_user_id, cart);
    }
}

#[async_trait]
impl CartRepositoryTrait for InMemoryCarts {
    async fn find_by_owner(&self, owner_user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.get(owner_user_id).await)
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let mut saved = cart.clone();
        saved.updated_at = Some(Utc::now());
        self.put(saved.clone()).await;
        Ok(saved)
    }

    async fn remove_lines(
        &self,
        owner_user_id: i64,
        product_ids: &[String],
    ) -> Result<Option<Cart>, RepositoryError> {
        let mut carts = self.carts.lock().await;
        Ok(carts.get_mut(&owner_user_id).map(|cart| {
            cart.remove_products(product_ids);
            cart.updated_at = Some(Utc::now());
            cart.clone()
        }))
    }
}

pub fn product(id: &str, price: i64) -> Product {
    Product {
        product_id: id.into(),
        name: format!("Source package {id}"),
        price,
        image_ref: format!("images/{id}.png"),
    }
}

/// Catalog mock answering from a fixed product list.
pub fn catalog(products: Vec<Product>) -> MockProductCatalogTrait {
    let mut mock = MockProductCatalogTrait::new();
    mock.expect_find_by_id().returning(move |id: &str| {
        Ok(products.iter().find(|p| p.product_id == id).cloned())
    });
    mock
}

pub fn order(id: &str, owner_user_id: i64, items: &[(&str, i64, i32)], status: OrderStatus) -> Order {
    let line_items: Vec<OrderLineItem> = items
        .iter()
        .map(|(product_id, unit_price, quantity)| OrderLineItem {
            product_id: product_id.to_string(),
            name: format!("Source package {product_id}"),
            unit_price: *unit_price,
            quantity: *quantity,
            image_ref: String::new(),
        })
        .collect();
    let now = Utc::now();

    Order {
        id: id.into(),
        owner_user_id,
        total_amount: line_items.iter().map(OrderLineItem::subtotal).sum(),
        line_items,
        payment_method: PaymentMethod::GatewayRedirect,
        cancel_reason: (status == OrderStatus::Canceled).then(|| "test".to_string()),
        status,
        idempotency_key: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        merchant_code: Some("TESTCODE".into()),
        hash_secret: Some(SECRET.into()),
        base_url: Some("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".into()),
        return_url: Some("https://shop.example/api/payment/callback".into()),
        ..Default::default()
    }
}

pub fn gateway() -> VnPayGateway {
    VnPayGateway::new(gateway_config())
}

/// Callback parameters as the gateway would send them, signed with [`SECRET`].
pub fn signed_callback(txn_ref: &str, response_code: &str, amount: i64) -> HashMap<String, String> {
    let mut params = BTreeMap::from([
        ("vnp_TxnRef".to_string(), txn_ref.to_string()),
        ("vnp_ResponseCode".to_string(), response_code.to_string()),
        ("vnp_Amount".to_string(), amount.to_string()),
        ("vnp_TransactionNo".to_string(), "14512345".to_string()),
        ("vnp_BankCode".to_string(), "NCB".to_string()),
    ]);
    let signature = gateway()
        .signature(&canonical_query(&params))
        .expect("configured secret");
    params.insert("vnp_SecureHashType".into(), "HmacSHA512".into());
    params.insert("vnp_SecureHash".into(), signature);
    params.into_iter().collect()
}

pub fn registry() -> Registry {
    Registry::default()
}
