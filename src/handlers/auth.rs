use crate::auth::{TokenKind, bearer_token, hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;
use crate::schemas::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a user
#[derive(Deserialize, Serialize, ToSchema, Validate)]
#[schema(example = json!({
    "username": "johndoe",
    "email": "johndoe@gmail.com",
    "password": "password",
    "is_staff": false,
    "is_active": true
}))]
pub struct SignupRequest {
    /// Username (unique, at most 25 characters)
    #[validate(length(max = 25, message = "length of username exceeds the limit 25"))]
    pub username: String,
    /// Email (unique, at most 80 characters)
    #[validate(length(max = 80, message = "length of email exceeds the limit 80"))]
    pub email: String,
    pub password: String,
    /// Grants access to every order (default: false)
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_active: bool,
}

/// Request body for logging in
#[derive(Deserialize, Serialize, ToSchema)]
#[schema(example = json!({"username": "johndoe", "password": "password"}))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User response model. The password hash is never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_staff: model.is_staff,
            is_active: model.is_active,
        }
    }
}

/// Tokens issued at login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    /// Short-lived access token
    pub access: String,
    /// Long-lived token for minting new access tokens
    pub refresh: String,
}

/// Fresh access token minted from a refresh token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Duplicate or invalid username/email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    trace!("Entering signup function");
    debug!("Registering user with email: {}", request.email);

    let txn = state.db.begin().await?;

    trace!("Checking whether email is already registered");
    let existing_email = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(&txn)
        .await?;
    if existing_email.is_some() {
        warn!("Signup rejected, email '{}' already exists", request.email);
        return Err(ApiError::EmailTaken);
    }

    trace!("Checking whether username is already taken");
    let existing_username = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&txn)
        .await?;
    if existing_username.is_some() {
        warn!("Signup rejected, username '{}' already exists", request.username);
        return Err(ApiError::UsernameTaken);
    }

    request.validate()?;

    let password_hash = hash_password_blocking(request.password.clone()).await?;

    let new_user = user::ActiveModel {
        username: Set(request.username.clone()),
        email: Set(request.email.clone()),
        password: Set(password_hash),
        is_staff: Set(request.is_staff),
        is_active: Set(request.is_active),
        ..Default::default()
    };

    trace!("Attempting to insert new user into database");
    let user_model = new_user.insert(&txn).await?;
    txn.commit().await?;

    info!(
        "User created successfully with ID: {}, username: {}, staff: {}",
        user_model.id, user_model.username, user_model.is_staff
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(user_model))))
}

/// Log in and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenPairResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    trace!("Entering login function");

    let db_user = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&state.db)
        .await?;

    let Some(user_model) = db_user else {
        warn!("Login failed, unknown username '{}'", request.username);
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    };

    if !verify_password_blocking(request.password, user_model.password.clone()).await {
        warn!("Login failed, wrong password for '{}'", user_model.username);
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    }

    let response = TokenPairResponse {
        access: state.jwt.create_access_token(&user_model.username)?,
        refresh: state.jwt.create_refresh_token(&user_model.username)?,
    };

    info!("User '{}' logged in", user_model.username);
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Missing, expired or invalid refresh token", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    trace!("Entering refresh function");
    let invalid = || ApiError::Unauthorized("Please provide a valid refresh token".to_string());

    let token = bearer_token(&headers).ok_or_else(invalid)?;
    let claims = state.jwt.verify(token, TokenKind::Refresh).map_err(|e| {
        debug!("Rejected refresh token: {}", e);
        invalid()
    })?;

    let subject_exists = user::Entity::find()
        .filter(user::Column::Username.eq(claims.sub.as_str()))
        .one(&state.db)
        .await?
        .is_some();
    if !subject_exists {
        warn!("Refresh token subject '{}' does not match any user", claims.sub);
        return Err(invalid());
    }

    let access = state.jwt.create_access_token(&claims.sub)?;
    info!("Issued new access token for '{}'", claims.sub);
    Ok(Json(AccessTokenResponse { access }))
}
