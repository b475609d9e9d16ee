use crate::auth::{
    jwt::{JwtKeys, TokenManager},
    password::{Argon2Hasher, PasswordHasher},
    repo::{InMemoryUserRepository, UserRepository},
    service::AuthService,
};
use crate::config::AppConfig;
use axum::extract::FromRef;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub started_at: OffsetDateTime,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_config(config))
    }

    /// Wires the default in-memory store, Argon2 hasher and JWT keys.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let users = Arc::new(InMemoryUserRepository::new()) as Arc<dyn UserRepository>;
        let hasher = Arc::new(Argon2Hasher::new()) as Arc<dyn PasswordHasher>;
        let tokens = Arc::new(JwtKeys::from_config(&config.jwt)) as Arc<dyn TokenManager>;
        Self::from_parts(config, AuthService::new(users, hasher, tokens))
    }

    pub fn from_parts(config: Arc<AppConfig>, auth: AuthService) -> Self {
        Self {
            config,
            auth,
            started_at: OffsetDateTime::now_utc(),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_ttl(crate::config::DEFAULT_TOKEN_TTL_SECONDS)
    }

    #[cfg(test)]
    pub fn fake_with_ttl(ttl_seconds: u64) -> Self {
        Self::from_config(Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test-secret-key".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_seconds,
            },
        }))
    }
}
