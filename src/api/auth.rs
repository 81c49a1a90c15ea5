// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session procedures.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use super::optional_input;
use crate::{
    auth::{authenticate, bearer_token, Auth},
    error::ApiError,
    models::{GetUserRequest, SuccessResponse, UserResponse},
    state::AppState,
    storage::UserRepository,
};

/// Resolve a token to its user.
///
/// The token is read from the input, or from the Authorization header when
/// the input has none.
#[utoipa::path(
    post,
    path = "/trpc/auth.getUser",
    tag = "Auth",
    request_body = GetUserRequest,
    responses(
        (status = 200, description = "The token's user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_user(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request: GetUserRequest = match optional_input(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let token = match request.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bearer_token(&headers),
    };

    match token.and_then(|token| authenticate(&state.auth_config, &state.storage(), token)) {
        Ok(user) => Json(UserResponse::from(&user.user)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Revoke the caller's outstanding tokens.
///
/// Tokens are only rejected afterwards when token version enforcement is
/// enabled.
#[utoipa::path(
    post,
    path = "/trpc/auth.logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let storage = state.storage();
    let updated = UserRepository::new(&storage).bump_token_version(&user.user_id)?;

    tracing::info!(
        user_id = %user.user_id,
        token_version = updated.token_version,
        "User logged out"
    );

    Ok(Json(SuccessResponse::ok()))
}

/// Log in by email without a password, creating the user on first use.
#[cfg(feature = "dev")]
#[utoipa::path(
    post,
    path = "/trpc/auth.devLogin",
    tag = "Auth",
    request_body = crate::models::DevLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::models::LoginResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn dev_login(
    State(state): State<AppState>,
    payload: Result<Json<crate::models::DevLoginRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<crate::models::LoginResponse>, ApiError> {
    use crate::validation::ValidationErrors;

    let Json(request) = payload?;

    let mut errors = ValidationErrors::new();
    errors.require_non_empty("name", &request.name);
    if !request.email.contains('@') {
        errors.add("email", "must be an email address");
    }
    if let Some(picture) = &request.picture {
        errors.require_url("picture", picture);
    }
    errors.finish()?;

    let storage = state.storage();
    let (user, created) = UserRepository::new(&storage).find_or_create(
        &request.email,
        request.name.trim(),
        request.picture.clone(),
    )?;
    let token = crate::auth::issue_token(&state.auth_config, &user).map_err(ApiError::internal)?;

    tracing::info!(user_id = %user.id, created, "Development login");

    Ok(Json(crate::models::LoginResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
