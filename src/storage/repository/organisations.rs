// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Organisation repository.
//!
//! ## Storage Layout
//!
//! Each organisation lives in its own directory:
//! ```text
//! organisations/{organisation_id}/
//!   meta.json       # Organisation document (logo content type only)
//!   logo.bin        # Raw logo bytes, if any
//! ```
//!
//! The logo blob is kept out of `meta.json` so that listing organisations
//! never reads it. Only [`OrganisationRepository::get_logo`] touches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{DocumentStore, OwnedResource, StorageError, StorageResult};

/// Logo metadata kept in the organisation document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredLogo {
    /// MIME type of the blob in `logo.bin`
    pub content_type: String,
}

/// Organisation document stored in meta.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredOrganisation {
    /// Unique organisation identifier (UUID)
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<StoredLogo>,
    pub contact_link: String,
    /// User who created the organisation
    pub owner_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredOrganisation {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }

    fn resource_label(&self) -> String {
        format!("organisation {}", self.id)
    }
}

/// A logo blob together with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Repository for organisation documents and their logos.
pub struct OrganisationRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> OrganisationRepository<'a> {
    /// Create a new OrganisationRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Check if an organisation exists.
    pub fn exists(&self, organisation_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().organisation_meta(organisation_id))
    }

    /// Get an organisation document by ID.
    pub fn get(&self, organisation_id: &str) -> StorageResult<StoredOrganisation> {
        let path = self.storage.paths().organisation_meta(organisation_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Organisation {organisation_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Create a new organisation, with its logo bytes if one was uploaded.
    ///
    /// The blob is written before the document so a visible organisation
    /// that advertises a logo always has one on disk.
    pub fn create(
        &self,
        organisation: &StoredOrganisation,
        logo: Option<&[u8]>,
    ) -> StorageResult<()> {
        let organisation_id = &organisation.id;

        if self.exists(organisation_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Organisation {organisation_id}"
            )));
        }

        if let Some(bytes) = logo {
            self.storage
                .write_raw(self.storage.paths().organisation_logo(organisation_id), bytes)?;
        }

        self.storage.write_json(
            self.storage.paths().organisation_meta(organisation_id),
            organisation,
        )
    }

    /// Update an existing organisation.
    ///
    /// `logo` replaces the stored blob when given; otherwise the existing
    /// blob is left untouched.
    pub fn update(
        &self,
        organisation: &StoredOrganisation,
        logo: Option<&[u8]>,
    ) -> StorageResult<()> {
        let organisation_id = &organisation.id;

        if !self.exists(organisation_id) {
            return Err(StorageError::NotFound(format!(
                "Organisation {organisation_id}"
            )));
        }

        if let Some(bytes) = logo {
            self.storage
                .write_raw(self.storage.paths().organisation_logo(organisation_id), bytes)?;
        }

        self.storage.write_json(
            self.storage.paths().organisation_meta(organisation_id),
            organisation,
        )
    }

    /// Fetch the logo blob. `None` when the organisation or its logo is absent.
    pub fn get_logo(&self, organisation_id: &str) -> StorageResult<Option<LogoBlob>> {
        let organisation = match self.get(organisation_id) {
            Ok(organisation) => organisation,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(logo) = organisation.logo else {
            return Ok(None);
        };

        match self
            .storage
            .read_raw(self.storage.paths().organisation_logo(organisation_id))
        {
            Ok(data) => Ok(Some(LogoBlob {
                data,
                content_type: logo.content_type,
            })),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete an organisation document and its logo blob.
    ///
    /// Bounties are not touched here; the caller runs the cascade first.
    pub fn delete(&self, organisation_id: &str) -> StorageResult<()> {
        if !self.exists(organisation_id) {
            return Err(StorageError::NotFound(format!(
                "Organisation {organisation_id}"
            )));
        }

        self.storage
            .delete_dir(self.storage.paths().organisation_dir(organisation_id))
    }

    /// List all organisations, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredOrganisation>> {
        let organisation_ids = self
            .storage
            .list_dirs(self.storage.paths().organisations_dir())?;

        let mut organisations = Vec::new();
        for id in organisation_ids {
            match self.get(&id) {
                Ok(organisation) => organisations.push(organisation),
                Err(e) => tracing::warn!(
                    organisation_id = %id,
                    error = %e,
                    "Skipping unreadable organisation document"
                ),
            }
        }

        organisations.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(organisations)
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

    fn test_organisation(id: &str) -> StoredOrganisation {
        let now = Utc::now();
        StoredOrganisation {
            id: id.to_string(),
            name: "Acme".to_string(),
            logo: None,
            contact_link: "https://acme.io".to_string(),
            owner_user_id: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_and_get_without_logo() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);

        let organisation = test_organisation("org-1");
        repo.create(&organisation, None).unwrap();

        assert_eq!(repo.get("org-1").unwrap(), organisation);
        assert!(repo.get_logo("org-1").unwrap().is_none());
    }

    #[test]
    fn logo_is_stored_outside_the_document() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);

        let mut organisation = test_organisation("org-1");
        organisation.logo = Some(StoredLogo {
            content_type: "image/png".to_string(),
        });
        repo.create(&organisation, Some(b"png-bytes")).unwrap();

        let meta = std::fs::read_to_string(storage.paths().organisation_meta("org-1")).unwrap();
        assert!(!meta.contains("png-bytes"));

        let logo = repo.get_logo("org-1").unwrap().unwrap();
        assert_eq!(logo.data, b"png-bytes");
        assert_eq!(logo.content_type, "image/png");
    }

    #[test]
    fn update_keeps_logo_unless_replaced() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);

        let mut organisation = test_organisation("org-1");
        organisation.logo = Some(StoredLogo {
            content_type: "image/png".to_string(),
        });
        repo.create(&organisation, Some(b"first")).unwrap();

        organisation.name = "Acme Corp".to_string();
        repo.update(&organisation, None).unwrap();
        assert_eq!(repo.get_logo("org-1").unwrap().unwrap().data, b"first");

        organisation.logo = Some(StoredLogo {
            content_type: "image/jpeg".to_string(),
        });
        repo.update(&organisation, Some(b"second")).unwrap();
        let logo = repo.get_logo("org-1").unwrap().unwrap();
        assert_eq!(logo.data, b"second");
        assert_eq!(logo.content_type, "image/jpeg");
        assert_eq!(repo.get("org-1").unwrap().name, "Acme Corp");
    }

    #[test]
    fn get_logo_of_missing_organisation_is_none() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);
        assert!(repo.get_logo("nope").unwrap().is_none());
    }

    #[test]
    fn delete_removes_document_and_logo() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);

        let mut organisation = test_organisation("org-1");
        organisation.logo = Some(StoredLogo {
            content_type: "image/png".to_string(),
        });
        repo.create(&organisation, Some(b"bytes")).unwrap();

        repo.delete("org-1").unwrap();
        assert!(!repo.exists("org-1"));
        assert!(!storage.paths().organisation_logo("org-1").exists());
        assert!(matches!(repo.delete("org-1"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_all_is_newest_first() {
        let (_temp, storage) = setup();
        let repo = OrganisationRepository::new(&storage);

        let mut older = test_organisation("org-old");
        older.created_at = Utc::now() - Duration::hours(2);
        let mut newer = test_organisation("org-new");
        newer.created_at = Utc::now();
        repo.create(&older, None).unwrap();
        repo.create(&newer, None).unwrap();

        let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["org-new".to_string(), "org-old".to_string()]);
    }
}
