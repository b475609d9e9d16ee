use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup and signin. Absent fields read as empty so the
/// validator reports them.
#[derive(Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after signup or signin.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Identity carried by the caller's token.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
}
