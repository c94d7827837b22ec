use crate::{
    abstract_trait::{
        cart::{DynCartRepository, DynCartService},
        checkout::DynCheckoutService,
        entitlement::DynEntitlementService,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
        payment::{DynPaymentGateway, DynPaymentService},
        product::DynProductCatalog,
    },
    repository::{
        CartRepository, OrderCommandRepository, OrderQueryRepository, ProductCatalogRepository,
    },
    service::{
        CartService, CheckoutService, CheckoutServiceDeps, EntitlementService,
        OrderCommandService, OrderQueryService, PaymentService, PaymentServiceDeps,
    },
};
use chrono::Duration;
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub cart_service: DynCartService,
    pub checkout_service: DynCheckoutService,
    pub payment_service: DynPaymentService,
    pub order_query: DynOrderQueryService,
    pub order_command: DynOrderCommandService,
    pub entitlement_service: DynEntitlementService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("cart_service", &"CartService")
            .field("checkout_service", &"CheckoutService")
            .field("payment_service", &"PaymentService")
            .field("order_query", &"OrderQueryService")
            .field("order_command", &"OrderCommandService")
            .field("entitlement_service", &"EntitlementService")
            .finish()
    }
}

/// Storage seams the services are wired onto.
#[derive(Clone)]
pub struct Repositories {
    pub cart: DynCartRepository,
    pub catalog: DynProductCatalog,
    pub order_command: DynOrderCommandRepository,
    pub order_query: DynOrderQueryRepository,
}

impl Repositories {
    pub fn postgres(pool: ConnectionPool) -> Self {
        Self {
            cart: Arc::new(CartRepository::new(pool.clone())),
            catalog: Arc::new(ProductCatalogRepository::new(pool.clone())),
            order_command: Arc::new(OrderCommandRepository::new(pool.clone())),
            order_query: Arc::new(OrderQueryRepository::new(pool)),
        }
    }
}

impl DependenciesInject {
    pub fn new(
        repos: Repositories,
        gateway: DynPaymentGateway,
        idempotency_window: Duration,
        registry: &mut Registry,
    ) -> Self {
        let Repositories {
            cart,
            catalog,
            order_command,
            order_query,
        } = repos;

        let cart_service: DynCartService = Arc::new(CartService::new(
            cart.clone(),
            catalog.clone(),
            registry,
        ));

        let checkout_service: DynCheckoutService = Arc::new(CheckoutService::new(
            CheckoutServiceDeps {
                cart,
                cart_service: cart_service.clone(),
                catalog,
                order_command: order_command.clone(),
                order_query: order_query.clone(),
                gateway: gateway.clone(),
                idempotency_window,
            },
            registry,
        ));

        let payment_service: DynPaymentService = Arc::new(PaymentService::new(
            PaymentServiceDeps {
                order_command: order_command.clone(),
                order_query: order_query.clone(),
                gateway,
            },
            registry,
        ));

        let order_query_service: DynOrderQueryService =
            Arc::new(OrderQueryService::new(order_query.clone(), registry));

        let order_command_service: DynOrderCommandService = Arc::new(OrderCommandService::new(
            order_command,
            order_query.clone(),
            registry,
        ));

        let entitlement_service: DynEntitlementService =
            Arc::new(EntitlementService::new(order_query, registry));

        Self {
            cart_service,
            checkout_service,
            payment_service,
            order_query: order_query_service,
            order_command: order_command_service,
            entitlement_service,
        }
    }
}
