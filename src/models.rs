// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the procedure API. Wire names are
//! camelCase. All types derive `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Users**: the authenticated user and subscription status
//! - **Organisations**: organisation records, summaries and logos
//! - **Bounties**: bounty records with their organisation embedded
//!
//! Responses are built from the stored documents and never carry the owner
//! user id, the payment customer id or logo bytes (except [`LogoData`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::prizes::prize_total;
use crate::storage::{StoredBounty, StoredOrganisation, StoredUser};

// =============================================================================
// Shared Models
// =============================================================================

/// Input naming a single record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IdInput {
    pub id: String,
}

/// Acknowledgement of a mutation without a payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub has_subscription: bool,
    pub is_waitlisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredUser> for UserResponse {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
            has_subscription: user.has_subscription,
            is_waitlisted: user.is_waitlisted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input of `auth.getUser`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GetUserRequest {
    /// Bearer token; the Authorization header is used when absent.
    pub token: Option<String>,
}

/// Input of `auth.devLogin`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DevLoginRequest {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Token issued by a login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Subscription flags of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub has_subscription: bool,
    pub is_waitlisted: bool,
}

// =============================================================================
// Organisation Models
// =============================================================================

/// Logo metadata exposed on organisation records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogoInfo {
    pub content_type: String,
}

/// Uploaded or downloaded logo, base64 encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoData {
    /// Standard base64 of the image bytes
    pub data: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
}

/// Organisation record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoInfo>,
    pub contact_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredOrganisation> for OrganisationResponse {
    fn from(organisation: &StoredOrganisation) -> Self {
        Self {
            id: organisation.id.clone(),
            name: organisation.name.clone(),
            logo: logo_info(organisation),
            contact_link: organisation.contact_link.clone(),
            created_at: organisation.created_at,
            updated_at: organisation.updated_at,
        }
    }
}

/// Organisation projection embedded in bounty records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OrganisationSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoInfo>,
}

impl From<&StoredOrganisation> for OrganisationSummary {
    fn from(organisation: &StoredOrganisation) -> Self {
        Self {
            id: organisation.id.clone(),
            name: organisation.name.clone(),
            logo: logo_info(organisation),
        }
    }
}

fn logo_info(organisation: &StoredOrganisation) -> Option<LogoInfo> {
    organisation.logo.as_ref().map(|logo| LogoInfo {
        content_type: logo.content_type.clone(),
    })
}

/// Organisation together with its bounties.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganisationWithBounties {
    #[serde(flatten)]
    pub organisation: OrganisationResponse,
    /// Newest first, without the organisation embedded
    pub bounties: Vec<BountyResponse>,
}

/// Input of `organisation.create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationInput {
    pub name: String,
    pub contact_link: String,
    pub logo: Option<LogoData>,
}

/// Input of `organisation.update`. The logo is replaced only when given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateOrganisationRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: OrganisationInput,
}

// =============================================================================
// Bounty Models
// =============================================================================

/// Bounty record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BountyResponse {
    pub id: String,
    pub name: String,
    pub open_status: bool,
    /// Embedded organisation; omitted inside an organisation's own listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisation: Option<OrganisationSummary>,
    pub submit_link: String,
    pub contact_link: String,
    pub skills: String,
    /// Comma-separated prize amounts, verbatim
    pub prizes: String,
    /// Sum of the prize amounts
    pub prize_total: f64,
    pub prize_currency: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BountyResponse {
    pub fn new(bounty: &StoredBounty, organisation: Option<OrganisationSummary>) -> Self {
        Self {
            id: bounty.id.clone(),
            name: bounty.name.clone(),
            open_status: bounty.open_status,
            organisation,
            submit_link: bounty.submit_link.clone(),
            contact_link: bounty.contact_link.clone(),
            skills: bounty.skills.clone(),
            prizes: bounty.prizes.clone(),
            prize_total: prize_total(&bounty.prizes),
            prize_currency: bounty.prize_currency.clone(),
            details: bounty.details.clone(),
            created_at: bounty.created_at,
            updated_at: bounty.updated_at,
        }
    }
}

/// Input of `bounty.create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BountyInput {
    pub name: String,
    /// Id of the owning organisation
    pub organisation: String,
    pub submit_link: String,
    pub contact_link: String,
    pub skills: String,
    pub prizes: String,
    pub prize_currency: String,
    pub details: String,
    /// Defaults to open
    pub open_status: Option<bool>,
}

/// Input of `bounty.update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateBountyRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: BountyInput,
}
