#[cfg(test)]
pub mod test_utils {
    use crate::auth::JwtService;
    use crate::handlers::auth::{SignupRequest, TokenPairResponse};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Duration;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use tracing_subscriber::EnvFilter;

    pub const TEST_JWT_SECRET: &str = "test_secret_key";
    pub const TEST_PASSWORD: &str = "password";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub fn test_jwt_service() -> JwtService {
        JwtService::new(TEST_JWT_SECRET, Duration::minutes(15), Duration::days(30))
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState {
            db,
            jwt: test_jwt_service(),
        }
    }

    /// Install a global stderr subscriber filtered by RUST_LOG (WARN when unset).
    ///
    /// Safe to call from every test; only the first call installs it.
    pub fn init_test_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Start a test server around a fresh app
    pub async fn setup_test_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).unwrap()
    }

    pub fn signup_request(username: &str, is_staff: bool) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: format!("{}@gmail.com", username),
            password: TEST_PASSWORD.to_string(),
            is_staff,
            is_active: true,
        }
    }

    /// Register a user and return its ID
    pub async fn signup_user(server: &TestServer, username: &str, is_staff: bool) -> i64 {
        let response = server
            .post("/auth/signup")
            .json(&signup_request(username, is_staff))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        body["id"].as_i64().unwrap()
    }

    /// Log a registered user in
    pub async fn login_user(server: &TestServer, username: &str) -> TokenPairResponse {
        let response = server
            .post("/auth/login")
            .json(&serde_json::json!({"username": username, "password": TEST_PASSWORD}))
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    /// Register and log in, returning an access token
    pub async fn access_token_for(server: &TestServer, username: &str, is_staff: bool) -> String {
        signup_user(server, username, is_staff).await;
        login_user(server, username).await.access
    }

    pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
    }

    /// Place an order as the token holder and return its ID
    pub async fn place_order(server: &TestServer, token: &str, quantity: i32, size: &str) -> i64 {
        let (name, value) = bearer(token);
        let response = server
            .post("/orders/order")
            .add_header(name, value)
            .json(&serde_json::json!({"quantity": quantity, "pizza_size": size}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        body["id"].as_i64().unwrap()
    }
}
