use crate::{
    abstract_trait::checkout::DynCheckoutService,
    domain::{
        requests::checkout::{CheckoutRequest, RequestOrigin},
        response::{api::ApiResponse, checkout::CheckoutResponse},
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::post,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

const CALLBACK_PATH: &str = "/api/payment/callback";

#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Checkout",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<CheckoutResponse>),
        (status = 200, description = "Pending order from an earlier attempt returned", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, nothing selected, invalid or unavailable payment method"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Payment setup failed")
    )
)]
pub async fn checkout(
    Extension(service): Extension<DynCheckoutService>,
    Extension(user_id): Extension<i64>,
    headers: HeaderMap,
    SimpleValidatedJson(body): SimpleValidatedJson<CheckoutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let origin = request_origin(&headers);
    let response = service.checkout(user_id, &body, &origin).await?;

    let status = if response.data.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(response)))
}

/// Client address and gateway return URL as seen through a reverse proxy.
pub fn request_origin(headers: &HeaderMap) -> RequestOrigin {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let client_ip = header_str("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_str("x-real-ip"))
        .map(str::to_owned);

    let return_url = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .map(|host| {
            let proto = header_str("x-forwarded-proto").unwrap_or("http");
            format!("{proto}://{host}{CALLBACK_PATH}")
        });

    RequestOrigin {
        client_ip,
        return_url,
    }
}

pub fn checkout_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/checkout", post(checkout))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.checkout_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn first_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        let origin = request_origin(&headers);

        assert_eq!(origin.client_ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn real_ip_is_used_without_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        assert_eq!(
            request_origin(&headers).client_ip.as_deref(),
            Some("198.51.100.4")
        );
    }

    #[test]
    fn return_url_follows_host_and_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("shop.example"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let origin = request_origin(&headers);

        assert_eq!(
            origin.return_url.as_deref(),
            Some("https://shop.example/api/payment/callback")
        );
        assert_eq!(origin.client_ip, None);
    }

    #[test]
    fn no_headers_means_no_origin() {
        let origin = request_origin(&HeaderMap::new());

        assert_eq!(origin.client_ip, None);
        assert_eq!(origin.return_url, None);
    }
}
