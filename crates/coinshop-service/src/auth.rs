//! Authentication: token issuance, login, and the `AuthUser` extractor.
//!
//! Tokens are HS256 JWTs signed with the server secret. The `sub` claim
//! carries the account ID so authenticated requests never look the account
//! up by name.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use coinshop_core::{validate, Account, AccountId};

use crate::crypto::CredentialHasher;
use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller extracted from a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The account ID.
    pub account_id: AccountId,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let auth_header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            let claims = state.tokens.verify(token)?;

            let account_id = claims
                .sub
                .parse::<AccountId>()
                .map_err(|_| ApiError::Unauthorized)?;

            Ok(AuthUser { account_id })
        })
    }
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: String,
    /// Username.
    pub name: String,
    /// Issued at.
    pub iat: i64,
    /// Expiration time.
    pub exp: i64,
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenIssuer {
    /// Create an issuer for `secret` whose tokens live `ttl_seconds`.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `account`.
    pub fn issue(&self, account: &Account) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: account.id.to_string(),
            name: account.username.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validate a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            ApiError::Unauthorized
        })?;

        Ok(token_data.claims)
    }
}

/// Log in as `username`, creating the account on first use, and return a
/// fresh token.
///
/// Two concurrent first logins for one username create one account; the
/// loser verifies its password against the winner's row.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<String, ApiError> {
    validate::username(username)?;
    validate::password(password)?;

    let (account, created) = match state.store.account_by_username(username).await? {
        Some(existing) => (existing, false),
        None => {
            let credential_hash = hash_credential(&state.hasher, password).await?;
            state
                .store
                .create_or_fetch(username, &credential_hash)
                .await?
        }
    };

    if !created && !verify_credential(&state.hasher, password, &account.credential_hash).await? {
        tracing::info!(account_id = %account.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized);
    }

    tracing::info!(account_id = %account.id, created, "Login succeeded");

    state.tokens.issue(&account)
}

async fn hash_credential(hasher: &CredentialHasher, password: &str) -> Result<String, ApiError> {
    let hasher = hasher.clone();
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("credential hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("failed to hash credential: {e}")))
}

async fn verify_credential(
    hasher: &CredentialHasher,
    password: &str,
    stored: &str,
) -> Result<bool, ApiError> {
    let hasher = hasher.clone();
    let password = password.to_owned();
    let stored = stored.to_owned();

    tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("credential check task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: AccountId::new(7),
            username: "alice".into(),
            credential_hash: "salt$mac".into(),
            balance: 0,
        }
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let issuer = TokenIssuer::new("secret", 3600);
        let token = issuer.issue(&account()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = TokenIssuer::new("secret", 3600).issue(&account()).unwrap();

        let err = TokenIssuer::new("other", 3600).verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", 0);
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "7".into(),
            name: "alice".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &issuer.encoding).unwrap();

        assert!(matches!(issuer.verify(&token), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = TokenIssuer::new("secret", 3600);
        assert!(issuer.verify("not-a-jwt").is_err());
    }
}
