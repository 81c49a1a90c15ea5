// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are stored one document per user under `users/{user_id}.json`.
//! Email is the natural key: it is normalised (NFKC, trimmed, lower-cased)
//! before it is stored or compared, and at most one user may hold a given
//! normalised email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::super::{DocumentStore, StorageError, StorageResult};

/// User document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Normalised email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Whether the user currently holds a paid subscription
    #[serde(default)]
    pub has_subscription: bool,
    /// Payment provider customer reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub is_waitlisted: bool,
    /// Bumped on logout; tokens carry the version they were issued at
    #[serde(default)]
    pub token_version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Build a fresh user record with a generated id.
    pub fn new(email: &str, name: impl Into<String>, picture: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: name.into(),
            picture,
            has_subscription: false,
            stripe_customer_id: None,
            is_waitlisted: false,
            token_version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form of an email address used for uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Repository for user documents.
pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new user. Fails if the id or the normalised email is taken.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }
        if self.find_by_email(&user.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Update an existing user, stamping `updated_at`.
    pub fn update(&self, user: &mut StoredUser) -> StorageResult<()> {
        if !self.exists(&user.id) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }

        user.updated_at = Utc::now();
        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// List all users.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let user_ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in user_ids {
            match self.get(&id) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!(
                    user_id = %id,
                    error = %e,
                    "Skipping unreadable user document"
                ),
            }
        }

        Ok(users)
    }

    /// Find a user by email (compared in normalised form).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let wanted = normalize_email(email);
        Ok(self.list_all()?.into_iter().find(|u| u.email == wanted))
    }

    /// Find the user bound to a payment-provider customer id.
    pub fn find_by_customer_id(&self, customer_id: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|u| u.stripe_customer_id.as_deref() == Some(customer_id)))
    }

    /// Return the user with this email, creating it on first login.
    ///
    /// The boolean is `true` when a new user was created.
    pub fn find_or_create(
        &self,
        email: &str,
        name: &str,
        picture: Option<String>,
    ) -> StorageResult<(StoredUser, bool)> {
        if let Some(existing) = self.find_by_email(email)? {
            return Ok((existing, false));
        }

        let user = StoredUser::new(email, name, picture);
        self.create(&user)?;
        Ok((user, true))
    }

    /// Invalidate all outstanding tokens of a user by bumping its version.
    pub fn bump_token_version(&self, user_id: &str) -> StorageResult<StoredUser> {
        let mut user = self.get(user_id)?;
        user.token_version += 1;
        self.update(&mut user)?;
        Ok(user)
    }
}
