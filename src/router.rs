use crate::handlers::{
    auth::{login, refresh, signup},
    health::health_check,
    orders::{
        delete_order, get_own_order, list_all_orders, list_own_orders, place_order, update_order,
        update_order_status,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account and token routes
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        // Order routes
        .route("/orders/order", post(place_order))
        .route("/orders/orders", get(list_all_orders))
        .route("/orders/user/orders", get(list_own_orders))
        .route("/orders/user/order/:id", get(get_own_order))
        .route(
            "/orders/order/update/:id",
            put(update_order).patch(update_order_status),
        )
        .route("/orders/order/delete/:id", delete(delete_order))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
