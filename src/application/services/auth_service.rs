//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses the
/// same function when issuing tokens, so both sides must share the secret.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the key is rejected by the MAC.
pub fn hash_token(signing_secret: &str, token: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|e| AppError::internal("Invalid signing secret", json!({ "reason": e.to_string() })))?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `tokens` - token repository for DB operations
    /// - `users` - user repository resolving the token owner
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        signing_secret: String,
    ) -> Self {
        Self {
            tokens,
            users,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns the user owning it.
    ///
    /// On success, updates the token's `last_used_at` timestamp; a failure to
    /// do so does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if:
    /// - Token hash does not match any stored credentials
    /// - Token has been revoked
    /// - The owning user no longer exists
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let token_hash = hash_token(&self.signing_secret, token)?;

        let rejected = || {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            )
        };

        let user_id = self
            .tokens
            .find_user_id(&token_hash)
            .await?
            .ok_or_else(rejected)?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(rejected)?;

        let _ = self.tokens.update_last_used(&token_hash).await;

        Ok(user)
    }
}
