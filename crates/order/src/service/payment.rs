use crate::{
    abstract_trait::{
        order::repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        payment::{DynPaymentGateway, PaymentServiceTrait},
    },
    domain::response::{
        api::ApiResponse,
        order::OrderResponse,
        payment::{CallbackResponse, PaymentStatusResponse},
    },
    gateway::{CallbackVerdict, GatewayError},
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
use std::collections::HashMap;
use tracing::{info, warn};

pub struct PaymentServiceDeps {
    pub order_command: DynOrderCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub gateway: DynPaymentGateway,
}

#[derive(Clone)]
pub struct PaymentService {
    order_command: DynOrderCommandRepository,
    order_query: DynOrderQueryRepository,
    gateway: DynPaymentGateway,
    tracer: ServiceTracer,
}

impl PaymentService {
    pub fn new(deps: PaymentServiceDeps, registry: &mut Registry) -> Self {
        let PaymentServiceDeps {
            order_command,
            order_query,
            gateway,
        } = deps;

        Self {
            order_command,
            order_query,
            gateway,
            tracer: ServiceTracer::new("payment_service", registry),
        }
    }

    fn verify(&self, params: &HashMap<String, String>) -> Result<CallbackVerdict, ServiceError> {
        self.gateway.verify_callback(params).map_err(|e| match e {
            GatewayError::InvalidSignature => ServiceError::InvalidSignature,
            GatewayError::InvalidField(field) => {
                ServiceError::Validation(vec![format!("{field} is missing or malformed")])
            }
            other => ServiceError::PaymentSetupFailed(other.to_string()),
        })
    }

    async fn reconcile(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<ApiResponse<CallbackResponse>, ServiceError> {
        let verdict = self.verify(params)?;

        let order = self
            .order_query
            .find_by_id(&verdict.txn_ref)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {}", verdict.txn_ref)))?;

        let transition = if verdict.accepted {
            let expected = order.total_amount.saturating_mul(100);
            if verdict.amount != Some(expected) {
                warn!(
                    "⚠️ Callback for order {} reports amount {:?}, expected {expected}",
                    order.id, verdict.amount
                );
                return Err(ServiceError::AmountMismatch {
                    expected,
                    actual: verdict.amount.unwrap_or_default(),
                });
            }
            Transition::GatewayAccepted
        } else {
            info!(
                "💔 Gateway rejected order {} with code {}",
                order.id, verdict.response_code
            );
            Transition::GatewayRejected
        };

        let outcome =
            apply_transition(&self.order_command, &self.order_query, &order.id, &transition)
                .await?;

        let message = if verdict.accepted { "success" } else { "failed" };

        Ok(ApiResponse::success(
            message,
            CallbackResponse {
                message: message.to_string(),
                order_id: outcome.order.id,
                status: outcome.order.status,
                transaction_ref: verdict.txn_ref,
                transaction_no: verdict.transaction_no,
                amount: verdict.amount,
            },
        ))
    }
}

#[async_trait]
impl PaymentServiceTrait for PaymentService {
    async fn handle_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<ApiResponse<CallbackResponse>, ServiceError> {
        let txn_ref = params.get("vnp_TxnRef").cloned().unwrap_or_default();
        info!("📩 Payment callback received for txn_ref={txn_ref}");

        let tracing_ctx = self.tracer.start(
            "handle_payment_callback",
            vec![
                KeyValue::new("component", "payment"),
                KeyValue::new("operation", "callback"),
                KeyValue::new("payment.txn_ref", txn_ref),
            ],
        );

        let result = self.reconcile(params).await;

        self.tracer
            .finish(&tracing_ctx, Method::Get, result, "Payment callback reconciled")
    }

    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatusResponse, ServiceError> {
        let order = self
            .order_query
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id}")))?;

        Ok(PaymentStatusResponse {
            success: true,
            order_id: order.id,
            paid: order.status.is_paid(),
            status: order.status,
        })
    }

    async fn mark_paid(&self, order_id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let tracing_ctx = self.tracer.start(
            "mark_order_paid",
            vec![
                KeyValue::new("component", "payment"),
                KeyValue::new("operation", "mark_paid"),
                KeyValue::new("order.id", order_id.to_string()),
            ],
        );

        let result = apply_transition(
            &self.order_command,
            &self.order_query,
            order_id,
            &Transition::MarkPaid,
        )
        .await
        .map(|outcome| {
            let message = if outcome.changed {
                "Order marked as paid"
            } else {
                "Order was already paid"
            };
            ApiResponse::success(message, OrderResponse::from(outcome.order))
        });

        self.tracer
            .finish(&tracing_ctx, Method::Post, result, "Order marked as paid")
    }
}
