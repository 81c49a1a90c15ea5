// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation.
//!
//! Every procedure input is checked before it reaches the store. Problems
//! are collected per field so a single 400 response can list all of them.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{BountyInput, IdInput, LogoData, OrganisationInput};
use crate::prizes::parse_prizes;

/// Largest accepted logo, after base64 decoding.
pub const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

/// One validation problem.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collector of field errors.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError::new(field, message));
    }

    /// Require a value that is non-empty after trimming.
    pub fn require_non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
        }
    }

    /// Require a record id, returning its canonical hyphenated form.
    ///
    /// Ids name files in the store, so anything that is not a UUID is
    /// rejected. The input is returned trimmed when it does not parse.
    pub fn require_id(&mut self, field: &str, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, "must not be empty");
            return String::new();
        }

        match Uuid::parse_str(value) {
            Ok(id) => id.hyphenated().to_string(),
            Err(_) => {
                self.add(field, "must be a UUID");
                value.to_string()
            }
        }
    }

    /// Require an absolute http or https URL.
    pub fn require_url(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, "must not be empty");
            return;
        }

        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(_) => self.add(field, "must be an http or https URL"),
            Err(e) => self.add(field, format!("is not a valid URL: {e}")),
        }
    }

    /// Require a comma-separated list of non-negative amounts.
    pub fn require_prizes(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
            return;
        }
        if let Err(e) = parse_prizes(value) {
            self.add(field, e.to_string());
        }
    }

    /// Check an uploaded logo, returning the decoded bytes when valid.
    pub fn logo(&mut self, field: &str, logo: &LogoData) -> Option<DecodedLogo> {
        let content_type = logo.content_type.trim();
        let content_type_ok = is_content_type(content_type);
        if !content_type_ok {
            self.add(
                &format!("{field}.contentType"),
                "must be a MIME type such as image/png",
            );
        }

        let data_field = format!("{field}.data");
        let bytes = match Base64::decode_vec(logo.data.trim()) {
            Ok(bytes) if bytes.is_empty() => {
                self.add(&data_field, "must not be empty");
                return None;
            }
            Ok(bytes) => bytes,
            Err(_) => {
                self.add(&data_field, "must be standard base64");
                return None;
            }
        };

        if bytes.len() > MAX_LOGO_BYTES {
            self.add(
                &data_field,
                format!("must be at most {MAX_LOGO_BYTES} bytes once decoded"),
            );
            return None;
        }

        content_type_ok.then(|| DecodedLogo {
            bytes,
            content_type: content_type.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok` when nothing was collected, otherwise the 400 error.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.fields))
        }
    }
}

fn is_content_type(value: &str) -> bool {
    let Some((kind, subtype)) = value.split_once('/') else {
        return false;
    };
    let token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
    };
    token(kind) && token(subtype)
}

/// Logo bytes that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLogo {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Validated organisation fields.
#[derive(Debug, Clone)]
pub struct ValidOrganisation {
    pub name: String,
    pub contact_link: String,
    pub logo: Option<DecodedLogo>,
}

/// Validated bounty fields.
#[derive(Debug, Clone)]
pub struct ValidBounty {
    pub name: String,
    pub organisation_id: String,
    pub submit_link: String,
    pub contact_link: String,
    pub skills: String,
    pub prizes: String,
    pub prize_currency: String,
    pub details: String,
    pub open_status: bool,
}

impl IdInput {
    pub fn validate(&self, errors: &mut ValidationErrors) -> String {
        errors.require_id("id", &self.id)
    }
}

impl OrganisationInput {
    pub fn validate(&self, errors: &mut ValidationErrors) -> ValidOrganisation {
        errors.require_non_empty("name", &self.name);
        errors.require_url("contactLink", &self.contact_link);
        let logo = self.logo.as_ref().and_then(|logo| errors.logo("logo", logo));

        ValidOrganisation {
            name: self.name.trim().to_string(),
            contact_link: self.contact_link.trim().to_string(),
            logo,
        }
    }
}

impl BountyInput {
    /// Skills, prizes and details are kept verbatim.
    pub fn validate(&self, errors: &mut ValidationErrors) -> ValidBounty {
        errors.require_non_empty("name", &self.name);
        let organisation_id = errors.require_id("organisation", &self.organisation);
        errors.require_url("submitLink", &self.submit_link);
        errors.require_url("contactLink", &self.contact_link);
        errors.require_non_empty("skills", &self.skills);
        errors.require_prizes("prizes", &self.prizes);
        errors.require_non_empty("prizeCurrency", &self.prize_currency);
        errors.require_non_empty("details", &self.details);

        ValidBounty {
            name: self.name.trim().to_string(),
            organisation_id,
            submit_link: self.submit_link.trim().to_string(),
            contact_link: self.contact_link.trim().to_string(),
            skills: self.skills.clone(),
            prizes: self.prizes.clone(),
            prize_currency: self.prize_currency.trim().to_string(),
            details: self.details.clone(),
            open_status: self.open_status.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: ValidationErrors) -> Vec<String> {
        match errors.finish() {
            Ok(()) => Vec::new(),
            Err(e) => e.fields.unwrap().into_iter().map(|f| f.field).collect(),
        }
    }

    fn valid_bounty() -> BountyInput {
        BountyInput {
            name: "Build a wallet".into(),
            organisation: "6f1c2a9e-3b4d-4e5f-8a7b-9c0d1e2f3a4b".into(),
            submit_link: "https://acme.io/submit".into(),
            contact_link: "https://acme.io/contact".into(),
            skills: "Rust".into(),
            prizes: "100, 50".into(),
            prize_currency: "ZEC".into(),
            details: "Details".into(),
            open_status: None,
        }
    }

    #[test]
    fn urls_must_be_http() {
        let mut errors = ValidationErrors::new();
        errors.require_url("a", "https://example.com/x");
        errors.require_url("b", "http://example.com");
        assert!(errors.is_empty());

        errors.require_url("c", "ftp://example.com");
        errors.require_url("d", "not a url");
        errors.require_url("e", "   ");
        errors.require_url("f", "javascript:alert(1)");
        assert_eq!(fields(errors), vec!["c", "d", "e", "f"]);
    }

    #[test]
    fn content_types() {
        assert!(is_content_type("image/png"));
        assert!(is_content_type("image/svg+xml"));
        assert!(!is_content_type("png"));
        assert!(!is_content_type("image/"));
        assert!(!is_content_type("image/png; charset=x"));
    }

    #[test]
    fn logo_decodes_standard_base64() {
        let mut errors = ValidationErrors::new();
        let logo = errors
            .logo(
                "logo",
                &LogoData {
                    data: Base64::encode_string(b"\x89PNG"),
                    content_type: "image/png".into(),
                },
            )
            .unwrap();
        assert!(errors.is_empty());
        assert_eq!(logo.bytes, b"\x89PNG");
        assert_eq!(logo.content_type, "image/png");
    }

    #[test]
    fn logo_rejects_bad_payloads() {
        let mut errors = ValidationErrors::new();
        let decoded = errors.logo(
            "logo",
            &LogoData {
                data: "!!not base64!!".into(),
                content_type: "nonsense".into(),
            },
        );
        assert!(decoded.is_none());
        assert_eq!(fields(errors), vec!["logo.contentType", "logo.data"]);

        let mut errors = ValidationErrors::new();
        assert!(errors
            .logo(
                "logo",
                &LogoData {
                    data: String::new(),
                    content_type: "image/png".into(),
                },
            )
            .is_none());
        assert_eq!(fields(errors), vec!["logo.data"]);
    }

    #[test]
    fn logo_size_limit() {
        let oversized = vec![0u8; MAX_LOGO_BYTES + 1];
        let mut errors = ValidationErrors::new();
        assert!(errors
            .logo(
                "logo",
                &LogoData {
                    data: Base64::encode_string(&oversized),
                    content_type: "image/png".into(),
                },
            )
            .is_none());
        assert_eq!(fields(errors), vec!["logo.data"]);
    }

    #[test]
    fn valid_bounty_passes_and_defaults_to_open() {
        let mut errors = ValidationErrors::new();
        let bounty = valid_bounty().validate(&mut errors);
        assert!(errors.is_empty());
        assert!(bounty.open_status);
        assert_eq!(bounty.prizes, "100, 50");
    }

    #[test]
    fn bounty_reports_every_problem() {
        let input = BountyInput {
            name: " ".into(),
            submit_link: "nope".into(),
            prizes: "100, abc".into(),
            prize_currency: "".into(),
            ..valid_bounty()
        };

        let mut errors = ValidationErrors::new();
        input.validate(&mut errors);
        assert_eq!(
            fields(errors),
            vec!["name", "submitLink", "prizes", "prizeCurrency"]
        );
    }

    #[test]
    fn ids_must_be_uuids() {
        let id = uuid::Uuid::new_v4().to_string();

        let mut errors = ValidationErrors::new();
        assert_eq!(errors.require_id("id", &format!("  {id} ")), id);
        assert_eq!(errors.require_id("id", &id.to_uppercase()), id);
        assert!(errors.is_empty());

        let mut errors = ValidationErrors::new();
        for bad in [format!("{id}/"), "../x".to_string(), "org-1".to_string(), " ".to_string()] {
            errors.require_id("id", &bad);
        }
        assert_eq!(fields(errors), vec!["id", "id", "id", "id"]);
    }

    #[test]
    fn bounty_organisation_must_be_an_id() {
        let input = BountyInput {
            organisation: "../organisations/x".into(),
            ..valid_bounty()
        };
        let mut errors = ValidationErrors::new();
        input.validate(&mut errors);
        assert_eq!(fields(errors), vec!["organisation"]);
    }

    #[test]
    fn organisation_trims_fields() {
        let input = OrganisationInput {
            name: "  Acme ".into(),
            contact_link: " https://acme.io ".into(),
            logo: None,
        };
        let mut errors = ValidationErrors::new();
        let organisation = input.validate(&mut errors);
        assert!(errors.is_empty());
        assert_eq!(organisation.name, "Acme");
        assert_eq!(organisation.contact_link, "https://acme.io");
    }
}
