use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{
    errors::AuthError,
    jwt::{Claims, TokenError},
    service::AuthService,
};

/// Verified claims of the bearer token on the request.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        // Expect "Bearer <token>"
        let mut fields = auth_header.split_whitespace();
        let token = match (fields.next(), fields.next(), fields.next()) {
            (Some("Bearer"), Some(token), None) => token,
            _ => {
                warn!("malformed Authorization header");
                return Err(AuthError::Token(TokenError::Invalid));
            }
        };

        let claims = AuthService::from_ref(state).verify_token(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            AuthError::Token(e)
        })?;

        Ok(AuthUser(claims))
    }
}
