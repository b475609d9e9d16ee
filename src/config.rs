use anyhow::{bail, Context};

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 900;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = get("JWT_SECRET").context("missing required env JWT_SECRET")?;

        let ttl_seconds = match get("TOKEN_TTL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid TOKEN_TTL_SECONDS: {raw:?}"))?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };
        if i64::try_from(ttl_seconds).is_err() {
            bail!("TOKEN_TTL_SECONDS out of range: {ttl_seconds}");
        }

        let port = match get("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid APP_PORT: {raw:?}"))?,
            None => 8080,
        };

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "identity-service".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "identity-service-users".into()),
            ttl_seconds,
        };
        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
        })
    }
}
