use crate::{
    abstract_trait::cart::DynCartService,
    domain::{
        requests::cart::{AddCartItemsRequest, SetQuantityRequest, SetSelectedRequest},
        response::{
            api::ApiResponse,
            cart::{CartResponse, SelectedCartResponse},
        },
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's cart", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_cart(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_cart(user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/cart/selected",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lines selected for checkout", body = ApiResponse<SelectedCartResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_selected(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_selected(user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = AddCartItemsRequest,
    responses(
        (status = 200, description = "Products added", body = ApiResponse<CartResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_items(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<AddCartItemsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.add_items(user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{product_id}/selected",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    request_body = SetSelectedRequest,
    responses(
        (status = 200, description = "Selection updated", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Line not in cart")
    )
)]
pub async fn set_selected(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
    Path(product_id): Path<String>,
    SimpleValidatedJson(body): SimpleValidatedJson<SetSelectedRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .set_selected(user_id, &product_id, body.selected)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{product_id}/quantity",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Line not in cart")
    )
)]
pub async fn set_quantity(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
    Path(product_id): Path<String>,
    SimpleValidatedJson(body): SimpleValidatedJson<SetQuantityRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .set_quantity(user_id, &product_id, body.quantity)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Line not in cart")
    )
)]
pub async fn remove_line(
    Extension(service): Extension<DynCartService>,
    Extension(user_id): Extension<i64>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.remove_line(user_id, &product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn cart_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/selected", get(get_selected))
        .route("/api/cart/items", post(add_items))
        .route("/api/cart/items/{product_id}/selected", put(set_selected))
        .route("/api/cart/items/{product_id}/quantity", put(set_quantity))
        .route("/api/cart/items/{product_id}", delete(remove_line))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.cart_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
