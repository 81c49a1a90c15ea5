// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounty repository.
//!
//! Bounties are stored one document per bounty under `bounties/{id}.json`.
//! A bounty references its organisation by id; the repository does not check
//! that the organisation exists, callers do that before writing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{DocumentStore, OwnedResource, StorageError, StorageResult};

fn default_open() -> bool {
    true
}

/// Bounty document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredBounty {
    /// Unique bounty identifier (UUID)
    pub id: String,
    pub name: String,
    /// Open for submissions
    #[serde(default = "default_open")]
    pub open_status: bool,
    /// Owning organisation id
    pub organisation_id: String,
    pub submit_link: String,
    pub contact_link: String,
    /// Comma-separated skill list
    pub skills: String,
    /// Comma-separated prize amounts, stored verbatim
    pub prizes: String,
    pub prize_currency: String,
    /// Markdown
    pub details: String,
    /// User who created the bounty
    pub owner_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredBounty {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }

    fn resource_label(&self) -> String {
        format!("bounty {}", self.id)
    }
}

/// Repository for bounty documents.
pub struct BountyRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> BountyRepository<'a> {
    /// Create a new BountyRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if a bounty exists.
    pub fn exists(&self, bounty_id: &str) -> bool {
        self.storage.exists(self.storage.paths().bounty(bounty_id))
    }

    /// Get a bounty by ID.
    pub fn get(&self, bounty_id: &str) -> StorageResult<StoredBounty> {
        let path = self.storage.paths().bounty(bounty_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Bounty {bounty_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new bounty.
    pub fn create(&self, bounty: &StoredBounty) -> StorageResult<()> {
        let bounty_id = &bounty.id;

        if self.exists(bounty_id) {
            return Err(StorageError::AlreadyExists(format!("Bounty {bounty_id}")));
        }

        self.storage
            .write_json(self.storage.paths().bounty(bounty_id), bounty)
    }

    /// Update an existing bounty.
    pub fn update(&self, bounty: &StoredBounty) -> StorageResult<()> {
        let bounty_id = &bounty.id;

        if !self.exists(bounty_id) {
            return Err(StorageError::NotFound(format!("Bounty {bounty_id}")));
        }

        self.storage
            .write_json(self.storage.paths().bounty(bounty_id), bounty)
    }

    /// Delete a bounty.
    pub fn delete(&self, bounty_id: &str) -> StorageResult<()> {
        if !self.exists(bounty_id) {
            return Err(StorageError::NotFound(format!("Bounty {bounty_id}")));
        }

        self.storage.delete(self.storage.paths().bounty(bounty_id))
    }

    /// List all bounties, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredBounty>> {
        let bounty_ids = self
            .storage
            .list_files(self.storage.paths().bounties_dir(), "json")?;

        let mut bounties = Vec::new();
        for id in bounty_ids {
            match self.get(&id) {
                Ok(bounty) => bounties.push(bounty),
                Err(e) => tracing::warn!(
                    bounty_id = %id,
                    error = %e,
                    "Skipping unreadable bounty document"
                ),
            }
        }

        bounties.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(bounties)
    }

    /// List the bounties of one organisation, newest first.
    pub fn list_by_organisation(&self, organisation_id: &str) -> StorageResult<Vec<StoredBounty>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|b| b.organisation_id == organisation_id)
            .collect())
    }

    /// Delete every bounty referencing an organisation.
    ///
    /// Best-effort and sequential: stops at the first failure, leaving the
    /// bounties not yet visited in place. Returns the number deleted.
    pub fn delete_by_organisation(&self, organisation_id: &str) -> StorageResult<usize> {
        let bounties = self.list_by_organisation(organisation_id)?;
        for bounty in &bounties {
            self.delete(&bounty.id)?;
        }
        Ok(bounties.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn test_bounty(id: &str, organisation_id: &str) -> StoredBounty {
        let now = Utc::now();
        StoredBounty {
            id: id.to_string(),
            name: "Build a light client".to_string(),
            open_status: true,
            organisation_id: organisation_id.to_string(),
            submit_link: "https://acme.io/submit".to_string(),
            contact_link: "https://acme.io/contact".to_string(),
            skills: "Rust, Zcash".to_string(),
            prizes: "1000, 500".to_string(),
            prize_currency: "ZEC".to_string(),
            details: "# Details".to_string(),
            owner_user_id: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_get_update_delete() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);

        let mut bounty = test_bounty("b-1", "org-1");
        repo.create(&bounty).unwrap();
        assert_eq!(repo.get("b-1").unwrap(), bounty);

        bounty.open_status = false;
        repo.update(&bounty).unwrap();
        assert!(!repo.get("b-1").unwrap().open_status);

        repo.delete("b-1").unwrap();
        assert!(matches!(repo.get("b-1"), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete("b-1"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn update_missing_bounty_fails() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);
        assert!(matches!(
            repo.update(&test_bounty("ghost", "org-1")),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn documents_without_open_status_default_to_open() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);

        let mut doc = serde_json::to_value(test_bounty("b-legacy", "org-1")).unwrap();
        doc.as_object_mut().unwrap().remove("open_status");
        storage
            .write_json(storage.paths().bounty("b-legacy"), &doc)
            .unwrap();

        assert!(repo.get("b-legacy").unwrap().open_status);
    }

    #[test]
    fn list_by_organisation_filters_and_orders() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);

        let mut old = test_bounty("b-old", "org-1");
        old.created_at = Utc::now() - Duration::days(1);
        repo.create(&old).unwrap();
        repo.create(&test_bounty("b-new", "org-1")).unwrap();
        repo.create(&test_bounty("b-other", "org-2")).unwrap();

        let ids: Vec<String> = repo
            .list_by_organisation("org-1")
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["b-new".to_string(), "b-old".to_string()]);
    }

    #[test]
    fn unreadable_documents_are_skipped_when_listing() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);

        repo.create(&test_bounty("b-good", "org-1")).unwrap();
        std::fs::write(storage.paths().bounty("b-broken"), b"{ not json").unwrap();

        let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b-good".to_string()]);
        assert_eq!(repo.delete_by_organisation("org-1").unwrap(), 1);
        assert!(storage.paths().bounty("b-broken").exists());
    }

    #[test]
    fn delete_by_organisation_removes_only_matching() {
        let (_temp, storage) = setup();
        let repo = BountyRepository::new(&storage);

        for i in 0..3 {
            repo.create(&test_bounty(&format!("b-{i}"), "org-1")).unwrap();
        }
        repo.create(&test_bounty("b-keep", "org-2")).unwrap();

        assert_eq!(repo.delete_by_organisation("org-1").unwrap(), 3);
        assert!(repo.list_by_organisation("org-1").unwrap().is_empty());
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }
}
