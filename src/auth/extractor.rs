use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use model::entities::user;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::{debug, warn};

use super::TokenKind;
use crate::error::ApiError;
use crate::schemas::AppState;

/// The stored user behind a verified bearer access token.
///
/// Rejects with 401 when the header is missing, the token is not a valid
/// access token, or its subject no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn invalid_token() -> ApiError {
    ApiError::Unauthorized("Invalid Token".to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            debug!("Request without bearer token");
            invalid_token()
        })?;

        let claims = state.jwt.verify(token, TokenKind::Access).map_err(|e| {
            debug!("Rejected access token: {}", e);
            invalid_token()
        })?;

        let user = user::Entity::find()
            .filter(user::Column::Username.eq(claims.sub.as_str()))
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Token subject '{}' does not match any user", claims.sub);
                invalid_token()
            })?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
