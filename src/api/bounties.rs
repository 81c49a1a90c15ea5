// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounty procedures.
//!
//! Every bounty response embeds its organisation projected to
//! `{id, name, logo: {contentType}}`. Writes check that the referenced
//! organisation exists.

use std::collections::HashMap;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;

use super::organisations::organisation_not_found;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        BountyInput, BountyResponse, IdInput, OrganisationSummary, SuccessResponse,
        UpdateBountyRequest,
    },
    state::AppState,
    storage::{
        BountyRepository, DocumentStore, OrganisationRepository, OwnershipCheck, StorageError,
        StorageResult, StoredBounty,
    },
    validation::ValidationErrors,
};

fn bounty_not_found(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(_) => ApiError::not_found("Bounty not found"),
        other => other.into(),
    }
}

/// Load the organisation summary of a bounty; `None` for an orphan.
fn organisation_summary(
    storage: &DocumentStore,
    organisation_id: &str,
) -> StorageResult<Option<OrganisationSummary>> {
    match OrganisationRepository::new(storage).get(organisation_id) {
        Ok(organisation) => Ok(Some(OrganisationSummary::from(&organisation))),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create a bounty under an existing organisation.
#[utoipa::path(
    post,
    path = "/trpc/bounty.create",
    tag = "Bounties",
    security(("bearer_auth" = [])),
    request_body = BountyInput,
    responses(
        (status = 200, description = "Bounty created", body = BountyResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Organisation not found")
    )
)]
pub async fn create_bounty(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<BountyInput>, JsonRejection>,
) -> Result<Json<BountyResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = ValidationErrors::new();
    let valid = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let organisation = OrganisationRepository::new(&storage)
        .get(&valid.organisation_id)
        .map_err(organisation_not_found)?;

    let now = Utc::now();
    let bounty = StoredBounty {
        id: uuid::Uuid::new_v4().to_string(),
        name: valid.name,
        open_status: valid.open_status,
        organisation_id: organisation.id.clone(),
        submit_link: valid.submit_link,
        contact_link: valid.contact_link,
        skills: valid.skills,
        prizes: valid.prizes,
        prize_currency: valid.prize_currency,
        details: valid.details,
        owner_user_id: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };
    BountyRepository::new(&storage).create(&bounty)?;

    tracing::info!(
        bounty_id = %bounty.id,
        organisation_id = %bounty.organisation_id,
        user_id = %user.user_id,
        "Bounty created"
    );

    Ok(Json(BountyResponse::new(
        &bounty,
        Some(OrganisationSummary::from(&organisation)),
    )))
}

/// List all bounties, newest first.
#[utoipa::path(
    post,
    path = "/trpc/bounty.getAll",
    tag = "Bounties",
    responses((status = 200, body = [BountyResponse]))
)]
pub async fn list_bounties(
    State(state): State<AppState>,
) -> Result<Json<Vec<BountyResponse>>, ApiError> {
    let storage = state.storage();
    let bounties = BountyRepository::new(&storage).list_all()?;

    let organisations: HashMap<String, OrganisationSummary> = OrganisationRepository::new(&storage)
        .list_all()?
        .iter()
        .map(|organisation| (organisation.id.clone(), OrganisationSummary::from(organisation)))
        .collect();

    Ok(Json(
        bounties
            .iter()
            .map(|bounty| {
                BountyResponse::new(bounty, organisations.get(&bounty.organisation_id).cloned())
            })
            .collect(),
    ))
}

/// Get a single bounty.
#[utoipa::path(
    post,
    path = "/trpc/bounty.getById",
    tag = "Bounties",
    request_body = IdInput,
    responses(
        (status = 200, body = BountyResponse),
        (status = 404, description = "Bounty not found")
    )
)]
pub async fn get_bounty(
    State(state): State<AppState>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<BountyResponse>, ApiError> {
    let Json(request) = payload?;
    let mut errors = ValidationErrors::new();
    let id = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let bounty = BountyRepository::new(&storage)
        .get(&id)
        .map_err(bounty_not_found)?;
    let organisation = organisation_summary(&storage, &bounty.organisation_id)?;

    Ok(Json(BountyResponse::new(&bounty, organisation)))
}

/// Replace every field of a bounty.
#[utoipa::path(
    post,
    path = "/trpc/bounty.update",
    tag = "Bounties",
    security(("bearer_auth" = [])),
    request_body = UpdateBountyRequest,
    responses(
        (status = 200, description = "Bounty updated", body = BountyResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your bounty"),
        (status = 404, description = "Bounty or organisation not found")
    )
)]
pub async fn update_bounty(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<UpdateBountyRequest>, JsonRejection>,
) -> Result<Json<BountyResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = ValidationErrors::new();
    let id = IdInput { id: request.id }.validate(&mut errors);
    let valid = request.fields.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let repo = BountyRepository::new(&storage);
    let mut bounty = repo
        .get(&id)
        .verify_owner(&user)
        .map_err(bounty_not_found)?;

    let organisation = OrganisationRepository::new(&storage)
        .get(&valid.organisation_id)
        .map_err(organisation_not_found)?;

    bounty.name = valid.name;
    bounty.open_status = valid.open_status;
    bounty.organisation_id = organisation.id.clone();
    bounty.submit_link = valid.submit_link;
    bounty.contact_link = valid.contact_link;
    bounty.skills = valid.skills;
    bounty.prizes = valid.prizes;
    bounty.prize_currency = valid.prize_currency;
    bounty.details = valid.details;
    bounty.updated_at = Utc::now();

    repo.update(&bounty).map_err(bounty_not_found)?;

    tracing::info!(bounty_id = %bounty.id, "Bounty updated");

    Ok(Json(BountyResponse::new(
        &bounty,
        Some(OrganisationSummary::from(&organisation)),
    )))
}

/// Delete a bounty.
#[utoipa::path(
    post,
    path = "/trpc/bounty.delete",
    tag = "Bounties",
    security(("bearer_auth" = [])),
    request_body = IdInput,
    responses(
        (status = 200, description = "Bounty deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your bounty"),
        (status = 404, description = "Bounty not found")
    )
)]
pub async fn delete_bounty(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    let mut errors = ValidationErrors::new();
    let id = request.validate(&mut errors);
    errors.finish()?;

    let storage = state.storage();
    let repo = BountyRepository::new(&storage);
    repo.get(&id)
        .verify_owner(&user)
        .map_err(bounty_not_found)?;
    repo.delete(&id).map_err(bounty_not_found)?;

    tracing::info!(bounty_id = %id, "Bounty deleted");

    Ok(Json(SuccessResponse::ok()))
}
