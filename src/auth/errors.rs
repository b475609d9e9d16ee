use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use super::{jwt::TokenError, validator::ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("bad request")]
    BadRequest(#[from] JsonRejection),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing token")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UserExists => StatusCode::CONFLICT,
            Self::UserNotFound | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Token(TokenError::Signing(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingToken | Self::Token(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(rejection) => {
                warn!(error = %rejection.body_text(), "request body rejected");
                json!({ "error": "bad request" })
            }
            Self::Validation(v) => json!({ "error": v.to_string(), "code": v.code() }),
            // unknown email and wrong password must look the same from outside
            Self::UserNotFound | Self::InvalidCredentials => {
                json!({ "error": "invalid credentials" })
            }
            Self::Token(TokenError::Signing(e)) => {
                error!(error = %e, "token signing failed");
                json!({ "error": "internal error" })
            }
            Self::Internal(e) => {
                error!(error = ?e, "request failed");
                json!({ "error": "internal error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_user_and_bad_password_are_indistinguishable() {
        let a = body_of(AuthError::UserNotFound).await;
        let b = body_of(AuthError::InvalidCredentials).await;
        assert_eq!(a, b);
        assert_eq!(a.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn validation_error_carries_reason_code() {
        let (status, body) = body_of(ValidationError::PasswordTooShort.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "password_too_short");
    }

    #[tokio::test]
    async fn internal_error_is_opaque() {
        let (status, body) = body_of(anyhow::anyhow!("lock poisoned at 0xdead").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal error");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AuthError::UserExists.status(), StatusCode::CONFLICT);
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Token(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Token(TokenError::Invalid).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
