mod cart;
mod checkout;
mod entitlement;
mod order;
mod payment;

use crate::state::AppState;
use anyhow::Result;
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{Modify, OpenApi, openapi::security::SecurityScheme};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::cart::cart_routes;
pub use self::checkout::{checkout_routes, request_origin};
pub use self::entitlement::entitlement_routes;
pub use self::order::order_routes;
pub use self::payment::payment_routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::checkout,

        payment::payment_callback,
        payment::payment_status,
        payment::mark_paid,

        order::get_orders,
        order::get_order,
        order::update_order_status,

        cart::get_cart,
        cart::get_selected,
        cart::add_items,
        cart::set_selected,
        cart::set_quantity,
        cart::remove_line,

        entitlement::check_entitlement,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Checkout", description = "Checkout endpoints"),
        (name = "Payment", description = "Payment gateway and settlement endpoints"),
        (name = "Order", description = "Order endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Entitlement", description = "Ownership check endpoints"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut buffer = String::new();

    if let Err(e) = encode(&mut buffer, &state.registry) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}

pub struct AppRouter;

impl AppRouter {
    pub fn build(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);

        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(checkout_routes(shared_state.clone()))
            .merge(payment_routes(shared_state.clone()))
            .merge(order_routes(shared_state.clone()))
            .merge(cart_routes(shared_state.clone()))
            .merge(entitlement_routes(shared_state));

        let router_with_layers = api_router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(1024 * 1024));

        let (app_router, api) = router_with_layers.split_for_parts();

        app_router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::build(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;

        info!("🚀 Server running on http://{}", listener.local_addr()?);
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}
