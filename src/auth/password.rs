use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Returns a self-describing hash (salt and cost parameters included).
    fn hash(&self, plain: &str) -> anyhow::Result<String>;

    /// Never fails: malformed hashes and empty input are plain mismatches.
    fn verify(&self, hashed: &str, plain: &str) -> bool;
}

/// Argon2id with the crate's default cost (19 MiB, 2 passes, 1 lane).
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, hashed: &str, plain: &str) -> bool {
        if plain.is_empty() {
            return false;
        }
        let parsed = match PasswordHash::new(hashed) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        // parameters come from the stored hash, comparison is constant time
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}
