// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the DocumentStore for all file operations.

pub mod bounties;
pub mod organisations;
pub mod users;

pub use bounties::{BountyRepository, StoredBounty};
pub use organisations::{LogoBlob, OrganisationRepository, StoredLogo, StoredOrganisation};
pub use users::{normalize_email, StoredUser, UserRepository};
