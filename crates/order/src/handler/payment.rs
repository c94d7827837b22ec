use crate::{
    abstract_trait::payment::DynPaymentService,
    domain::response::{
        api::ApiResponse,
        order::OrderResponse,
        payment::{CallbackResponse, PaymentStatusResponse},
    },
    middleware::jwt::auth_middleware,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shared::errors::HttpError;
use std::{collections::HashMap, sync::Arc};
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/payment/callback",
    tag = "Payment",
    params(
        ("vnp_TxnRef" = String, Query, description = "Order id echoed by the gateway"),
        ("vnp_ResponseCode" = String, Query, description = "Gateway response code, 00 on success"),
        ("vnp_Amount" = Option<i64>, Query, description = "Paid amount in minor units"),
        ("vnp_SecureHash" = String, Query, description = "HMAC-SHA512 over the other parameters")
    ),
    responses(
        (status = 200, description = "Callback reconciled", body = ApiResponse<CallbackResponse>),
        (status = 400, description = "Invalid signature or amount mismatch"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order cannot take the reported outcome")
    )
)]
pub async fn payment_callback(
    Extension(service): Extension<DynPaymentService>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.handle_callback(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/payment/status/{order_id}",
    tag = "Payment",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Payment status", body = PaymentStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn payment_status(
    Extension(service): Extension<DynPaymentService>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.payment_status(&order_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/payment/mark-paid/{order_id}",
    tag = "Payment",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order marked as paid", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending")
    )
)]
pub async fn mark_paid(
    Extension(service): Extension<DynPaymentService>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.mark_paid(&order_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn payment_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let service = app_state.di_container.payment_service.clone();

    let callback = OpenApiRouter::new()
        .route("/api/payment/callback", get(payment_callback))
        .layer(Extension(service.clone()));

    let protected = OpenApiRouter::new()
        .route("/api/payment/status/{order_id}", get(payment_status))
        .route("/api/payment/mark-paid/{order_id}", post(mark_paid))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(service))
        .layer(Extension(app_state.jwt_config.clone()));

    callback.merge(protected)
}
