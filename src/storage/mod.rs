// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Entity Store
//!
//! Persistent storage for users, organisations and bounties as JSON
//! documents under a single data directory (`DATA_DIR`).
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/
//!     {user_id}.json
//!   organisations/{organisation_id}/
//!     meta.json       # Organisation document
//!     logo.bin        # Raw logo blob (optional)
//!   bounties/
//!     {bounty_id}.json
//! ```
//!
//! ## Consistency
//!
//! - Single-document writes are atomic (temp file + rename)
//! - There are no cross-document transactions; the organisation delete
//!   cascade is sequential and best-effort
//! - No optimistic concurrency: the last writer wins

pub mod document_store;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use document_store::{DocumentStore, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    normalize_email, BountyRepository, LogoBlob, OrganisationRepository, StoredBounty,
    StoredLogo, StoredOrganisation, StoredUser, UserRepository,
};
