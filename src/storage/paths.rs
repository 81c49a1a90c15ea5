// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Default root directory for persistent storage.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all users.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Organisation Paths ==========

    /// Directory containing all organisations.
    pub fn organisations_dir(&self) -> PathBuf {
        self.root.join("organisations")
    }

    /// Directory for a specific organisation.
    pub fn organisation_dir(&self, organisation_id: &str) -> PathBuf {
        self.organisations_dir().join(organisation_id)
    }

    /// Path to organisation metadata file.
    pub fn organisation_meta(&self, organisation_id: &str) -> PathBuf {
        self.organisation_dir(organisation_id).join("meta.json")
    }

    /// Path to the raw organisation logo blob.
    pub fn organisation_logo(&self, organisation_id: &str) -> PathBuf {
        self.organisation_dir(organisation_id).join("logo.bin")
    }

    // ========== Bounty Paths ==========

    /// Directory containing all bounties.
    pub fn bounties_dir(&self) -> PathBuf {
        self.root.join("bounties")
    }

    /// Path to a specific bounty document.
    pub fn bounty(&self, bounty_id: &str) -> PathBuf {
        self.bounties_dir().join(format!("{bounty_id}.json"))
    }
}
