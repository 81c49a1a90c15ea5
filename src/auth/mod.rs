// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for the bounty board API.
//!
//! ## Auth Flow
//!
//! 1. A user logs in (dev login or the seed tool) and receives an HS256 JWT
//!    signed with `AUTH_SECRET`
//! 2. The client sends `Authorization: Bearer <token>`
//! 3. The server:
//!    - Verifies signature and expiry (60 second clock skew tolerance)
//!    - Extracts `sub` (legacy tokens: `userId`) as the user id
//!    - Loads the user document; unknown users are rejected
//!    - Optionally checks the token version against the user's counter
//!
//! ## Security
//!
//! - Every rejection produces the same 401 body; the cause is only logged
//! - Logout bumps the user's token version, which revokes outstanding tokens
//!   when `ENFORCE_TOKEN_VERSION` is on

pub mod claims;
pub mod error;
pub mod extractor;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{bearer_token, Auth};
pub use token::{authenticate, issue_token, verify_token};
