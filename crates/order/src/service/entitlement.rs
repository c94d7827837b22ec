use crate::{
    abstract_trait::{
        entitlement::EntitlementServiceTrait, order::repository::DynOrderQueryRepository,
    },
    domain::response::{api::ApiResponse, payment::EntitlementResponse},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};

/// Download rights derived from order history: a product is unlocked by any
/// of the user's orders containing it in `Paid` or `Completed`.
#[derive(Clone)]
pub struct EntitlementService {
    query: DynOrderQueryRepository,
    tracer: ServiceTracer,
}

impl EntitlementService {
    pub fn new(query: DynOrderQueryRepository, registry: &mut Registry) -> Self {
        Self {
            query,
            tracer: ServiceTracer::new("entitlement_service", registry),
        }
    }
}

#[async_trait]
impl EntitlementServiceTrait for EntitlementService {
    async fn check(
        &self,
        owner_user_id: i64,
        product_id: &str,
    ) -> Result<ApiResponse<EntitlementResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start(
            "check_entitlement",
            vec![
                KeyValue::new("component", "entitlement"),
                KeyValue::new("entitlement.owner_user_id", owner_user_id),
                KeyValue::new("entitlement.product_id", product_id.to_string()),
            ],
        );

        let result = self
            .query
            .has_entitlement(owner_user_id, product_id)
            .await
            .map_err(ServiceError::from)
            .map(|entitled| {
                ApiResponse::success(
                    if entitled {
                        "Download allowed"
                    } else {
                        "Product has not been purchased"
                    },
                    EntitlementResponse {
                        product_id: product_id.to_string(),
                        entitled,
                    },
                )
            });

        self.tracer
            .finish(&tracing_ctx, Method::Get, result, "Entitlement checked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::payment::PaymentServiceTrait,
        model::status::OrderStatus,
        service::{
            PaymentService, PaymentServiceDeps,
            test_support::{InMemoryOrders, gateway, order, registry},
        },
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn only_settled_orders_grant_downloads() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("A", 1, &[("P1", 10, 1), ("P2", 5, 1)], OrderStatus::Completed))
            .await;
        orders
            .insert(order("B", 1, &[("P3", 10, 1)], OrderStatus::Processing))
            .await;
        let service = EntitlementService::new(Arc::new(orders), &mut registry());

        assert!(service.check(1, "P1").await.unwrap().data.entitled);
        assert!(service.check(1, "P2").await.unwrap().data.entitled);
        assert!(!service.check(1, "P3").await.unwrap().data.entitled);
        assert!(!service.check(2, "P1").await.unwrap().data.entitled);
    }

    #[tokio::test]
    async fn entitlement_survives_later_transitions() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("ORD1", 1, &[("P1", 10, 1)], OrderStatus::Pending))
            .await;
        let entitlement = EntitlementService::new(Arc::new(orders.clone()), &mut registry());
        let payment = PaymentService::new(
            PaymentServiceDeps {
                order_command: Arc::new(orders.clone()),
                order_query: Arc::new(orders.clone()),
                gateway: Arc::new(gateway()),
            },
            &mut registry(),
        );

        assert!(!entitlement.check(1, "P1").await.unwrap().data.entitled);
        payment.mark_paid("ORD1").await.unwrap();
        assert!(entitlement.check(1, "P1").await.unwrap().data.entitled);

        // a late gateway rejection cannot revoke it
        let _ = payment
            .handle_callback(&crate::service::test_support::signed_callback("ORD1", "24", 1_000))
            .await;
        assert!(entitlement.check(1, "P1").await.unwrap().data.entitled);
    }
}
