// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounty Board - organisation bounty listing service
//!
//! A procedure-style JSON API over a filesystem document store. Anyone may
//! browse organisations and bounties; creating, editing and deleting them
//! requires a bearer token, and only the creator may change a record.
//!
//! ## Modules
//!
//! - `api` - Procedure handlers, router and OpenAPI document (Axum)
//! - `auth` - HS256 bearer tokens and the `Auth` extractor
//! - `config` - Environment configuration
//! - `providers` - Payment provider webhook verification
//! - `storage` - JSON document store and repositories
//! - `validation` - Input validation producing field-level errors

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod prizes;
pub mod providers;
pub mod state;
pub mod storage;
pub mod validation;
