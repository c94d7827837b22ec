use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
    domain::{
        requests::order::FindOrdersQuery,
        response::{
            api::{ApiResponse, ApiResponsePagination},
            order::OrderResponse,
            pagination::Pagination,
        },
    },
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
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    tracer: ServiceTracer,
}

impl OrderQueryService {
    pub fn new(query: DynOrderQueryRepository, registry: &mut Registry) -> Self {
        Self {
            query,
            tracer: ServiceTracer::new("order_query_service", registry),
        }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(
        &self,
        owner_user_id: i64,
        req: &FindOrdersQuery,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        let tracing_ctx = self.tracer.start(
            "find_orders",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "find_all"),
                KeyValue::new("order.owner_user_id", owner_user_id),
            ],
        );

        let result = self
            .query
            .find_by_owner(owner_user_id, req)
            .await
            .map_err(ServiceError::from)
            .map(|(orders, total)| {
                info!("📦 Found {} of {total} orders for user {owner_user_id}", orders.len());
                ApiResponsePagination {
                    status: "success".into(),
                    message: "Orders retrieved successfully".into(),
                    data: orders.into_iter().map(OrderResponse::from).collect(),
                    pagination: Pagination::new(req.page, req.page_size, total),
                }
            });

        self.tracer
            .finish(&tracing_ctx, Method::Get, result, "Orders retrieved")
    }

    async fn find_by_id(
        &self,
        owner_user_id: i64,
        order_id: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let order = self
            .query
            .find_by_id(order_id)
            .await?
            .filter(|order| order.owner_user_id == owner_user_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id}")))?;

        Ok(ApiResponse::success(
            "Order retrieved successfully",
            OrderResponse::from(order),
        ))
    }
}
