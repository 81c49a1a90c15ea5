// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Organisation procedures.
//!
//! Reads are public. Create requires authentication; update and delete are
//! reserved to the user who created the organisation.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use base64ct::{Base64, Encoding};
use chrono::Utc;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        BountyResponse, IdInput, LogoData, OrganisationInput, OrganisationResponse,
        OrganisationWithBounties, SuccessResponse, UpdateOrganisationRequest,
    },
    state::AppState,
    storage::{
        BountyRepository, OrganisationRepository, OwnershipCheck, StorageError, StoredLogo,
        StoredOrganisation,
    },
    validation::ValidationErrors,
};

pub(crate) fn organisation_not_found(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(_) => ApiError::not_found("Organisation not found"),
        other => other.into(),
    }
}

/// Create an organisation owned by the caller.
#[utoipa::path(
    post,
    path = "/trpc/organisation.create",
    tag = "Organisations",
    security(("bearer_auth" = [])),
    request_body = OrganisationInput,
    responses(
        (status = 200, description = "Organisation created", body = OrganisationResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_organisation(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<OrganisationInput>, JsonRejection>,
) -> Result<Json<OrganisationResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = ValidationErrors::new();
    let valid = request.validate(&mut errors);
    errors.finish()?;

    let now = Utc::now();
    let organisation = StoredOrganisation {
        id: uuid::Uuid::new_v4().to_string(),
        name: valid.name,
        logo: valid.logo.as_ref().map(|logo| StoredLogo {
            content_type: logo.content_type.clone(),
        }),
        contact_link: valid.contact_link,
        owner_user_id: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    let storage = state.storage();
    OrganisationRepository::new(&storage).create(
        &organisation,
        valid.logo.as_ref().map(|logo| logo.bytes.as_slice()),
    )?;

    tracing::info!(
        organisation_id = %organisation.id,
        user_id = %user.user_id,
        "Organisation created"
    );

    Ok(Json(OrganisationResponse::from(&organisation)))
}

/// List all organisations, newest first. Logo bytes are never included.
#[utoipa::path(
    post,
    path = "/trpc/organisation.getAll",
    tag = "Organisations",
    responses((status = 200, body = [OrganisationResponse]))
)]
pub async fn list_organisations(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganisationResponse>>, ApiError> {
    let storage = state.storage();
    let organisations = OrganisationRepository::new(&storage).list_all()?;

    Ok(Json(
        organisations.iter().map(OrganisationResponse::from).collect(),
    ))
}

/// Get an organisation with its bounties.
#[utoipa::path(
    post,
    path = "/trpc/organisation.getById",
    tag = "Organisations",
    request_body = IdInput,
    responses(
        (status = 200, body = OrganisationWithBounties),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn get_organisation(
    State(state): State<AppState>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<OrganisationWithBounties>, ApiError> {
    let Json(request) = payload?;
    let mut errors = ValidationErrors::new();
    let id = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let organisation = OrganisationRepository::new(&storage)
        .get(&id)
        .map_err(organisation_not_found)?;

    let bounties = BountyRepository::new(&storage)
        .list_by_organisation(&id)?
        .iter()
        .map(|bounty| BountyResponse::new(bounty, None))
        .collect();

    Ok(Json(OrganisationWithBounties {
        organisation: OrganisationResponse::from(&organisation),
        bounties,
    }))
}

/// Download an organisation's logo. `null` when there is none.
#[utoipa::path(
    post,
    path = "/trpc/organisation.getLogo",
    tag = "Organisations",
    request_body = IdInput,
    responses((status = 200, description = "Logo, or null when absent", body = LogoData))
)]
pub async fn get_logo(
    State(state): State<AppState>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<Option<LogoData>>, ApiError> {
    let Json(request) = payload?;
    let mut errors = ValidationErrors::new();
    let id = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let logo = OrganisationRepository::new(&storage).get_logo(&id)?;

    Ok(Json(logo.map(|blob| LogoData {
        data: Base64::encode_string(&blob.data),
        content_type: blob.content_type,
    })))
}

/// Update an organisation. The logo is replaced only when one is supplied.
#[utoipa::path(
    post,
    path = "/trpc/organisation.update",
    tag = "Organisations",
    security(("bearer_auth" = [])),
    request_body = UpdateOrganisationRequest,
    responses(
        (status = 200, description = "Organisation updated", body = OrganisationResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your organisation"),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn update_organisation(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<UpdateOrganisationRequest>, JsonRejection>,
) -> Result<Json<OrganisationResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = ValidationErrors::new();
    let id = IdInput { id: request.id }.validate(&mut errors);
    let valid = request.fields.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let repo = OrganisationRepository::new(&storage);
    let mut organisation = repo
        .get(&id)
        .verify_owner(&user)
        .map_err(organisation_not_found)?;

    organisation.name = valid.name;
    organisation.contact_link = valid.contact_link;
    if let Some(logo) = &valid.logo {
        organisation.logo = Some(StoredLogo {
            content_type: logo.content_type.clone(),
        });
    }
    organisation.updated_at = Utc::now();

    repo.update(
        &organisation,
        valid.logo.as_ref().map(|logo| logo.bytes.as_slice()),
    )?;

    tracing::info!(organisation_id = %organisation.id, "Organisation updated");

    Ok(Json(OrganisationResponse::from(&organisation)))
}

/// Delete an organisation together with all of its bounties.
///
/// Bounties go first, then the organisation. The steps are not atomic: a
/// failure part-way leaves the organisation in place with fewer bounties.
#[utoipa::path(
    post,
    path = "/trpc/organisation.delete",
    tag = "Organisations",
    security(("bearer_auth" = [])),
    request_body = IdInput,
    responses(
        (status = 200, description = "Organisation deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your organisation"),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn delete_organisation(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let mut errors = ValidationErrors::new();
    let id = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let repo = OrganisationRepository::new(&storage);
    let organisation = repo
        .get(&id)
        .verify_owner(&user)
        .map_err(organisation_not_found)?;

    // Bounties reference the stored id
    let removed = BountyRepository::new(&storage).delete_by_organisation(&organisation.id)?;
    repo.delete(&organisation.id).map_err(organisation_not_found)?;

    tracing::info!(
        organisation_id = %organisation.id,
        bounties_removed = removed,
        "Organisation deleted"
    );

    Ok(Json(SuccessResponse::ok()))
}
