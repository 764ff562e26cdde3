use axum::extract::{FromRequestParts, rejection::PathRejection};

use crate::error::ApiError;

/// `axum::extract::Path` whose rejection renders as a JSON `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
