use crate::{
    abstract_trait::order::{
        repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        service::OrderCommandServiceTrait,
    },
    domain::{
        requests::order::UpdateOrderStatusRequest,
        response::{api::ApiResponse, order::OrderResponse},
    },
    model::status::Transition,
    service::transition::apply_transition,
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
pub struct OrderCommandService {
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    tracer: ServiceTracer,
}

impl OrderCommandService {
    pub fn new(
        command: DynOrderCommandRepository,
        query: DynOrderQueryRepository,
        registry: &mut Registry,
    ) -> Self {
        Self {
            command,
            query,
            tracer: ServiceTracer::new("order_command_service", registry),
        }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn update_status(
        &self,
        order_id: &str,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("✏️ Status override for order {order_id} to {}", req.status);

        let tracing_ctx = self.tracer.start(
            "update_order_status",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "update_status"),
                KeyValue::new("order.id", order_id.to_string()),
                KeyValue::new("order.status", req.status.as_str()),
            ],
        );

        let transition = Transition::AdminOverride {
            status: req.status,
            cancel_reason: req.cancel_reason.clone(),
        };

        let result = apply_transition(&self.command, &self.query, order_id, &transition)
            .await
            .map(|outcome| {
                ApiResponse::success("Order status updated", OrderResponse::from(outcome.order))
            });

        self.tracer
            .finish(&tracing_ctx, Method::Put, result, "Order status updated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::status::OrderStatus,
        service::test_support::{InMemoryOrders, order, registry},
    };
    use std::sync::Arc;

    fn service(orders: &InMemoryOrders) -> OrderCommandService {
        OrderCommandService::new(
            Arc::new(orders.clone()),
            Arc::new(orders.clone()),
            &mut registry(),
        )
    }

    fn to(status: OrderStatus, reason: Option<&str>) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest {
            status,
            cancel_reason: reason.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn cancel_without_reason_keeps_prior_status() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("ORD1", 1, &[("P1", 10, 1)], OrderStatus::Pending))
            .await;

        for reason in [None, Some("  ")] {
            let err = service(&orders)
                .update_status("ORD1", &to(OrderStatus::Canceled, reason))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let stored = orders.get("ORD1").await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert!(stored.cancel_reason.is_none());
        assert_eq!(orders.status_writes(), 0);
    }

    #[tokio::test]
    async fn cancel_with_reason_then_nothing_leaves_canceled() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("ORD1", 1, &[("P1", 10, 1)], OrderStatus::Processing))
            .await;
        let service = service(&orders);

        let resp = service
            .update_status("ORD1", &to(OrderStatus::Canceled, Some("out of stock")))
            .await
            .unwrap();
        assert_eq!(resp.data.status, OrderStatus::Canceled);
        assert_eq!(resp.data.cancel_reason.as_deref(), Some("out of stock"));

        let err = service
            .update_status("ORD1", &to(OrderStatus::Completed, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn paid_order_cannot_lose_entitlement() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("ORD1", 1, &[("P1", 10, 1)], OrderStatus::Paid))
            .await;
        let service = service(&orders);

        for target in [OrderStatus::Canceled, OrderStatus::Pending, OrderStatus::Processing] {
            let err = service
                .update_status("ORD1", &to(target, Some("refund")))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidTransition { .. }));
        }

        let resp = service
            .update_status("ORD1", &to(OrderStatus::Completed, None))
            .await
            .unwrap();
        assert_eq!(resp.data.status, OrderStatus::Completed);
        assert!(resp.data.cancel_reason.is_none());
    }

    #[tokio::test]
    async fn settling_a_gateway_order_and_missing_orders() {
        let orders = InMemoryOrders::default();
        orders
            .insert(order("ORD1", 1, &[("P1", 10, 1)], OrderStatus::Processing))
            .await;
        let service = service(&orders);

        let resp = service
            .update_status("ORD1", &to(OrderStatus::Paid, None))
            .await
            .unwrap();
        assert_eq!(resp.data.status, OrderStatus::Paid);

        assert!(matches!(
            service
                .update_status("ORD404", &to(OrderStatus::Paid, None))
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
