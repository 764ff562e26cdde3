use model::entities::order::{OrderStatus, PizzaSize};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{
    Modify, OpenApi, ToSchema,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::auth::JwtService;
use crate::handlers::{
    auth::{AccessTokenResponse, LoginRequest, SignupRequest, TokenPairResponse, UserResponse},
    orders::{OrderRequest, OrderResponse, OrderStatusRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Issues and verifies access and refresh tokens
    pub jwt: JwtService,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error detail
    pub error: String,
    /// Stable error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Registers the bearer token scheme referenced by protected paths
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::orders::place_order,
        crate::handlers::orders::list_all_orders,
        crate::handlers::orders::list_own_orders,
        crate::handlers::orders::get_own_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::delete_order,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            SignupRequest,
            LoginRequest,
            UserResponse,
            TokenPairResponse,
            AccessTokenResponse,
            OrderRequest,
            OrderStatusRequest,
            OrderResponse,
            PizzaSize,
            OrderStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup, login and token refresh"),
        (name = "orders", description = "Placing and managing pizza orders"),
    ),
    info(
        title = "Pizzeria API",
        description = "Pizza delivery backend - accounts, tokens and order management",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
