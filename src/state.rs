// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.

use std::sync::Arc;

use crate::storage::DocumentStore;

/// Token signing and verification settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub secret: String,
    /// Lifetime of issued tokens
    pub token_ttl_secs: u64,
    /// Reject tokens minted before the user's last logout
    pub enforce_token_version: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("enforce_token_version", &self.enforce_token_version)
            .finish()
    }
}

/// Payment provider webhook settings.
#[derive(Clone)]
pub struct PaymentsConfig {
    /// Signing secret for incoming webhook events
    pub webhook_secret: String,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("webhook_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStore>,
    pub auth_config: AuthConfig,
    /// `None` when no webhook secret is configured
    pub payments: Option<PaymentsConfig>,
}

impl AppState {
    pub fn new(storage: DocumentStore, auth_config: AuthConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            auth_config,
            payments: None,
        }
    }

    pub fn with_payments(mut self, payments: PaymentsConfig) -> Self {
        self.payments = Some(payments);
        self
    }

    /// Handle to the document store.
    pub fn storage(&self) -> Arc<DocumentStore> {
        Arc::clone(&self.storage)
    }
}

#[cfg(test)]
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// State over a fresh temporary store, with webhook verification enabled.
#[cfg(test)]
pub fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::storage::StoragePaths;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut storage = DocumentStore::new(StoragePaths::new(temp_dir.path()));
    storage.initialize().expect("Failed to initialize storage");

    let state = AppState::new(
        storage,
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
            enforce_token_version: false,
        },
    )
    .with_payments(PaymentsConfig {
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
    });
    (state, temp_dir)
}
