use crate::{
    abstract_trait::entitlement::DynEntitlementService,
    domain::response::{api::ApiResponse, payment::EntitlementResponse},
    middleware::jwt::auth_middleware,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/entitlements/{product_id}",
    tag = "Entitlement",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Whether the caller owns the product", body = ApiResponse<EntitlementResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn check_entitlement(
    Extension(service): Extension<DynEntitlementService>,
    Extension(user_id): Extension<i64>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.check(user_id, &product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn entitlement_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/entitlements/{product_id}", get(check_entitlement))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.entitlement_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
