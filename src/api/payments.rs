// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subscription status and the Stripe webhook.
//!
//! The webhook is the only writer of `has_subscription`. Deliveries are
//! verified against the raw body before anything is parsed or stored; a
//! verified delivery that matches no user is acknowledged and dropped.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    error::ApiError,
    models::SubscriptionStatus,
    providers::stripe::{self, SubscriptionEvent, WebhookEvent},
    state::AppState,
    storage::{DocumentStore, StorageError, StorageResult, StoredUser, UserRepository},
};

/// Acknowledgement returned to the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
}

/// Subscription flags of the caller.
#[utoipa::path(
    post,
    path = "/trpc/payments.getStatus",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = SubscriptionStatus),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_status(Auth(user): Auth) -> Json<SubscriptionStatus> {
    Json(SubscriptionStatus {
        has_subscription: user.user.has_subscription,
        is_waitlisted: user.user.is_waitlisted,
    })
}

/// Receive a Stripe event.
#[utoipa::path(
    post,
    path = "/api/webhooks/stripe",
    tag = "Payments",
    request_body(content = String, description = "Raw Stripe event", content_type = "application/json"),
    params(
        ("stripe-signature" = String, Header, description = "Stripe signature header")
    ),
    responses(
        (status = 200, description = "Event received", body = WebhookAck),
        (status = 400, description = "Signature or payload rejected"),
        (status = 500, description = "Event could not be applied"),
        (status = 503, description = "Webhook secret not configured")
    )
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(payments) = &state.payments else {
        tracing::warn!("Stripe webhook received but STRIPE_WEBHOOK_SECRET is not set");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Webhook Error: endpoint not configured",
        )
            .into_response();
    };

    let signature = headers
        .get(stripe::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let event = stripe::verify_signature(
        &payments.webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    )
    .and_then(|()| stripe::parse_event(&body));

    let event = match event {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected Stripe webhook");
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
        }
    };

    match apply_event(&state.storage(), &event) {
        Ok(()) => Json(WebhookAck { received: true }).into_response(),
        Err(e) => ApiError::internal(format!(
            "failed to apply Stripe event {}: {e}",
            event.id.as_deref().unwrap_or("<no id>")
        ))
        .into_response(),
    }
}

/// Apply a verified event to the user collection.
pub fn apply_event(storage: &DocumentStore, event: &WebhookEvent) -> StorageResult<()> {
    let users = UserRepository::new(storage);
    let event_id = event.id.as_deref().unwrap_or("<no id>");

    match &event.kind {
        SubscriptionEvent::CheckoutCompleted {
            customer_id,
            client_reference_id,
        } => {
            let Some(customer_id) = customer_id else {
                tracing::warn!(event_id, "Checkout session without a customer, ignoring");
                return Ok(());
            };

            let user = match users.find_by_customer_id(customer_id)? {
                Some(user) => Some(user),
                None => bind_customer(&users, customer_id, client_reference_id.as_deref())?,
            };

            match user {
                Some(user) => set_subscription(&users, user, true),
                None => {
                    tracing::warn!(event_id, customer_id, "No user for Stripe customer");
                    Ok(())
                }
            }
        }
        SubscriptionEvent::SubscriptionDeleted { customer_id } => {
            let Some(customer_id) = customer_id else {
                tracing::warn!(event_id, "Subscription deletion without a customer, ignoring");
                return Ok(());
            };

            match users.find_by_customer_id(customer_id)? {
                Some(user) => set_subscription(&users, user, false),
                None => {
                    tracing::warn!(event_id, customer_id, "No user for Stripe customer");
                    Ok(())
                }
            }
        }
        SubscriptionEvent::Ignored { event_type } => {
            tracing::debug!(event_id, event_type, "Ignoring Stripe event");
            Ok(())
        }
    }
}

/// Attach a customer id to the user a checkout was started for.
fn bind_customer(
    users: &UserRepository<'_>,
    customer_id: &str,
    user_id: Option<&str>,
) -> StorageResult<Option<StoredUser>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    match users.get(user_id) {
        Ok(mut user) => {
            user.stripe_customer_id = Some(customer_id.to_string());
            users.update(&mut user)?;
            tracing::info!(user_id, customer_id, "Bound Stripe customer to user");
            Ok(Some(user))
        }
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn set_subscription(
    users: &UserRepository<'_>,
    mut user: StoredUser,
    has_subscription: bool,
) -> StorageResult<()> {
    if user.has_subscription == has_subscription {
        return Ok(());
    }

    user.has_subscription = has_subscription;
    users.update(&mut user)?;
    tracing::info!(user_id = %user.id, has_subscription, "Subscription updated");
    Ok(())
}
