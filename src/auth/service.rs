use std::sync::{Arc, OnceLock};

use anyhow::Context;
use tracing::{info, instrument, warn};

use super::{
    errors::AuthError,
    jwt::{Claims, TokenError, TokenManager},
    password::PasswordHasher,
    repo::{NewUser, UserRepository},
    validator,
};

/// Signup/signin orchestration. Holds only capability traits.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenManager>,
    decoy_hash: Arc<OnceLock<String>>,
}

const DECOY_PASSWORD: &str = "decoy-password-0";

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenManager>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Registers a new user and returns a bearer token for them.
    #[instrument(skip_all)]
    pub async fn signup(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let creds = validator::validate(email, password)?;

        // cheap pre-check so a duplicate never pays for hashing
        if self.users.get_by_email(&creds.email).await?.is_some() {
            warn!(email = %creds.email, "email already registered");
            return Err(AuthError::UserExists);
        }

        let hasher = Arc::clone(&self.hasher);
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&creds.password))
            .await
            .context("join hashing task")??;

        let user = self
            .users
            .create_if_absent(NewUser {
                email: creds.email.clone(),
                password_hash,
            })
            .await?
            .ok_or_else(|| {
                warn!(email = %creds.email, "email registered concurrently");
                AuthError::UserExists
            })?;

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(token)
    }

    /// Checks credentials and returns a fresh bearer token.
    #[instrument(skip_all)]
    pub async fn signin(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let creds = validator::validate(email, password)?;

        let Some(user) = self.users.get_by_email(&creds.email).await? else {
            warn!(email = %creds.email, "signin unknown email");
            self.verify_against_decoy(creds.password).await?;
            return Err(AuthError::UserNotFound);
        };

        let hasher = Arc::clone(&self.hasher);
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&stored, &creds.password))
            .await
            .context("join verify task")?;
        if !matches {
            warn!(user_id = %user.id, "signin invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = %user.id, email = %user.email, "user signed in");
        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens.verify(token)
    }

    /// Spends one verify on a throwaway hash so an unknown email costs as much
    /// as a wrong password. The decoy is hashed once, on first use.
    async fn verify_against_decoy(&self, password: String) -> anyhow::Result<()> {
        let hasher = Arc::clone(&self.hasher);
        let decoy = Arc::clone(&self.decoy_hash);
        tokio::task::spawn_blocking(move || {
            let hash = match decoy.get() {
                Some(hash) => hash.clone(),
                None => match hasher.hash(DECOY_PASSWORD) {
                    Ok(fresh) => decoy.get_or_init(|| fresh).clone(),
                    Err(e) => {
                        warn!(error = %e, "decoy hash unavailable");
                        return;
                    }
                },
            };
            let _ = hasher.verify(&hash, &password);
        })
        .await
        .context("join decoy verify task")
    }
}
