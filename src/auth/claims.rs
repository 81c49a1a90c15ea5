// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use crate::storage::StoredUser;

/// Claims carried by a bounty board access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID). Older tokens name it `userId`.
    #[serde(alias = "userId")]
    pub sub: String,

    /// Token version the user had when the token was issued
    #[serde(default)]
    pub tv: u64,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated user resolved from a verified token.
///
/// This is the primary type used throughout the application to represent
/// the user making a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user ID (token `sub` claim)
    pub user_id: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,

    /// The user document as loaded during authentication
    pub user: StoredUser,
}

impl AuthenticatedUser {
    /// Combine verified claims with the user they name.
    pub fn from_claims(claims: TokenClaims, user: StoredUser) -> Self {
        Self {
            user_id: claims.sub,
            expires_at: claims.exp,
            user,
        }
    }
}
