// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the shared `AUTH_SECRET`. Verification
//! checks signature and expiry, then resolves the subject against the user
//! collection.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedUser, TokenClaims};
use crate::state::AuthConfig;
use crate::storage::{DocumentStore, StorageError, StoredUser, UserRepository};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Mint an access token for a user at its current token version.
pub fn issue_token(config: &AuthConfig, user: &StoredUser) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user.id.clone(),
        tv: user.token_version,
        iat: now,
        exp: now + config.token_ttl_secs as i64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
}

/// Verify signature and expiry, returning the claims.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims)
}

/// Verify a token and load the user it names.
///
/// When token version enforcement is on, a token minted before the user's
/// last logout is rejected.
pub fn authenticate(
    config: &AuthConfig,
    storage: &DocumentStore,
    token: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let claims = verify_token(config, token)?;

    let user = UserRepository::new(storage)
        .get(&claims.sub)
        .map_err(|e| match e {
            StorageError::NotFound(_) => AuthError::UserNotFound,
            other => AuthError::InternalError(other.to_string()),
        })?;

    if config.enforce_token_version && claims.tv < user.token_version {
        return Err(AuthError::TokenRevoked);
    }

    Ok(AuthenticatedUser::from_claims(claims, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn config(enforce_token_version: bool) -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
            enforce_token_version,
        }
    }

    fn setup() -> (TempDir, DocumentStore, StoredUser) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let user = StoredUser::new("ada@example.com", "Ada", None);
        UserRepository::new(&storage).create(&user).unwrap();
        (temp, storage, user)
    }

    fn sign(claims: &TokenClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_authenticates() {
        let (_temp, storage, user) = setup();
        let config = config(false);

        let token = issue_token(&config, &user).unwrap();
        let authenticated = authenticate(&config, &storage, &token).unwrap();
        assert_eq!(authenticated.user_id, user.id);
        assert_eq!(authenticated.user.email, user.email);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (_temp, storage, user) = setup();
        let token = issue_token(&config(false), &user).unwrap();

        let other = AuthConfig {
            secret: "another-secret".to_string(),
            ..config(false)
        };
        assert!(matches!(
            authenticate(&other, &storage, &token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let (_temp, storage, user) = setup();
        let now = Utc::now().timestamp();
        let token = sign(
            &TokenClaims {
                sub: user.id.clone(),
                tv: 0,
                iat: now - 7200,
                exp: now - 3600,
            },
            "test-secret",
        );

        assert!(matches!(
            authenticate(&config(false), &storage, &token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn expiry_within_leeway_is_accepted() {
        let (_temp, storage, user) = setup();
        let now = Utc::now().timestamp();
        let token = sign(
            &TokenClaims {
                sub: user.id.clone(),
                tv: 0,
                iat: now - 100,
                exp: now - 10,
            },
            "test-secret",
        );

        assert!(authenticate(&config(false), &storage, &token).is_ok());
    }

    #[test]
    fn unknown_user_is_rejected() {
        let (_temp, storage, _user) = setup();
        let ghost = StoredUser::new("ghost@example.com", "Ghost", None);
        let token = issue_token(&config(false), &ghost).unwrap();

        assert!(matches!(
            authenticate(&config(false), &storage, &token),
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let (_temp, storage, _user) = setup();
        assert!(matches!(
            authenticate(&config(false), &storage, "not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn legacy_user_id_claim_is_accepted() {
        let (_temp, storage, user) = setup();
        let exp = Utc::now().timestamp() + 600;
        let legacy = serde_json::json!({ "userId": user.id, "exp": exp });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &legacy,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let authenticated = authenticate(&config(false), &storage, &token).unwrap();
        assert_eq!(authenticated.user_id, user.id);
    }

    #[test]
    fn revoked_token_rejected_only_when_enforced() {
        let (_temp, storage, user) = setup();
        let token = issue_token(&config(false), &user).unwrap();

        UserRepository::new(&storage)
            .bump_token_version(&user.id)
            .unwrap();

        assert!(authenticate(&config(false), &storage, &token).is_ok());
        assert!(matches!(
            authenticate(&config(true), &storage, &token),
            Err(AuthError::TokenRevoked)
        ));

        let bumped = UserRepository::new(&storage).get(&user.id).unwrap();
        let fresh = issue_token(&config(true), &bumped).unwrap();
        assert!(authenticate(&config(true), &storage, &fresh).is_ok());
    }
}
