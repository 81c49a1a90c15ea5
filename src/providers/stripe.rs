// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stripe webhook verification and event decoding.
//!
//! Stripe signs every delivery with a `Stripe-Signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`. The HMAC-SHA256 is
//! computed over `"<t>.<raw body>"` with the endpoint's signing secret.
//! Verification must run on the raw bytes, before any JSON parsing.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age (and future skew) of a signed delivery.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("No signature header")]
    MissingSignature,

    #[error("Unable to extract timestamp and signatures from header")]
    MalformedSignature,

    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,

    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for pair in header.split(',') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedSignature)?,
                );
            }
            // Undecodable entries can never match; skip them
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(WebhookError::MalformedSignature),
    }
}

fn keyed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Verify a delivery against the signing secret.
///
/// `now` is the current Unix time in seconds. Any `v1` entry may match;
/// comparison is constant time.
pub fn verify_signature(
    secret: &str,
    header: Option<&str>,
    payload: &[u8],
    now: i64,
) -> Result<(), WebhookError> {
    let header = parse_header(header.ok_or(WebhookError::MissingSignature)?)?;

    let mac = keyed_mac(secret, header.timestamp, payload);
    let matched = header
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    if (now - header.timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    Ok(())
}

/// Build a valid signature header for a payload.
#[cfg(test)]
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signature = hex::encode(keyed_mac(secret, timestamp, payload).finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: RawObject,
}

/// The subset of checkout session / subscription objects this service reads.
#[derive(Debug, Deserialize)]
struct RawObject {
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
}

/// A verified event, reduced to what the subscription flag depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// `checkout.session.completed`
    CheckoutCompleted {
        customer_id: Option<String>,
        /// User id the checkout was started for
        client_reference_id: Option<String>,
    },
    /// `customer.subscription.deleted`
    SubscriptionDeleted { customer_id: Option<String> },
    /// Any other event type
    Ignored { event_type: String },
}

/// A decoded event together with its provider id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: Option<String>,
    pub kind: SubscriptionEvent,
}

/// Decode a verified payload.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let kind = match raw.event_type.as_str() {
        "checkout.session.completed" => SubscriptionEvent::CheckoutCompleted {
            customer_id: raw.data.object.customer,
            client_reference_id: raw.data.object.client_reference_id,
        },
        "customer.subscription.deleted" => SubscriptionEvent::SubscriptionDeleted {
            customer_id: raw.data.object.customer,
        },
        _ => SubscriptionEvent::Ignored {
            event_type: raw.event_type,
        },
    };

    Ok(WebhookEvent { id: raw.id, kind })
}
