use crate::{
    abstract_trait::order::service::{DynOrderCommandService, DynOrderQueryService},
    domain::{
        requests::order::{FindOrdersQuery, UpdateOrderStatusRequest},
        response::{
            api::{ApiResponse, ApiResponsePagination},
            order::OrderResponse,
        },
    },
    middleware::{
        jwt::auth_middleware,
        validate::{SimpleValidatedJson, format_validation_errors},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(FindOrdersQuery),
    responses(
        (status = 200, description = "Caller's orders, newest first", body = ApiResponsePagination<Vec<OrderResponse>>),
        (status = 400, description = "Invalid paging"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(user_id): Extension<i64>,
    Query(params): Query<FindOrdersQuery>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| HttpError::BadRequest {
        kind: "ValidationError",
        message: format_validation_errors(&e),
    })?;

    let response = service.find_all(user_id, &params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(user_id): Extension<i64>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(user_id, &order_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{order_id}/status",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_order_status(
    Extension(service): Extension<DynOrderCommandService>,
    Path(order_id): Path<String>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_status(&order_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/orders", get(get_orders))
        .route("/api/orders/{order_id}", get(get_order))
        .route("/api/orders/{order_id}/status", put(update_order_status))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.order_query.clone()))
        .layer(Extension(app_state.di_container.order_command.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
