// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Populate a document store with example organisations and bounties.
//!
//! ```text
//! AUTH_SECRET=... bounty-seed --data-dir ./data --email you@example.com
//! ```
//!
//! The records are owned by the given user, who is created on first use.
//! When an auth secret is available a bearer token for that user is printed.

use std::{path::PathBuf, process::ExitCode};

use chrono::Utc;
use clap::Parser;
use thiserror::Error;

use bounty_board_server::{
    auth::{issue_token, AuthError},
    config::{AUTH_SECRET_ENV, DATA_DIR_ENV, DEFAULT_TOKEN_TTL_SECS},
    state::AuthConfig,
    storage::{
        paths::DATA_ROOT, BountyRepository, DocumentStore, OrganisationRepository, StorageError,
        StoragePaths, StoredBounty, StoredLogo, StoredOrganisation, StoredUser, UserRepository,
    },
};

/// 1x1 transparent PNG used as the example logo.
const EXAMPLE_LOGO: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Debug, Parser)]
#[command(name = "bounty-seed", about = "Seed the bounty board with example data")]
struct Args {
    /// Root directory of the document store
    #[arg(long, env = DATA_DIR_ENV, default_value = DATA_ROOT)]
    data_dir: PathBuf,

    /// Email of the user owning the seeded records
    #[arg(long)]
    email: String,

    /// Display name used if the user has to be created
    #[arg(long, default_value = "Seed User")]
    name: String,

    /// Secret used to print a bearer token for the user
    #[arg(long, env = AUTH_SECRET_ENV, hide_env_values = true)]
    auth_secret: Option<String>,
}

#[derive(Debug, Error)]
enum SeedError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("token: {0}")]
    Token(#[from] AuthError),
}

struct ExampleOrganisation {
    name: &'static str,
    contact_link: &'static str,
    bounty: ExampleBounty,
}

struct ExampleBounty {
    name: &'static str,
    submit_link: &'static str,
    skills: &'static str,
    prizes: &'static str,
    prize_currency: &'static str,
    details: &'static str,
}

const EXAMPLES: [ExampleOrganisation; 3] = [
    ExampleOrganisation {
        name: "MetaWealth",
        contact_link: "https://metawealth.com/contact",
        bounty: ExampleBounty {
            name: "C25 - RWA Revolution (Video)",
            submit_link: "https://metawealth.com/submit",
            skills: "Content Creation, Video Editing",
            prizes: "500,350,150",
            prize_currency: "USDC",
            details: "# Scope\n\nA 60 to 120 second video on tokenised real estate.\n\n\
                      - Posted on YouTube and X\n- English only\n",
        },
    },
    ExampleOrganisation {
        name: "Jupiter",
        contact_link: "https://jupiter.io/contact",
        bounty: ExampleBounty {
            name: "Create memes using your Jupiter Portfolio v2 Dashboard",
            submit_link: "https://jupiter.io/submit",
            skills: "Meme Creation, Creativity",
            prizes: "250,150,100",
            prize_currency: "JUP",
            details: "# Scope\n\nMemes built around a portfolio dashboard screenshot.\n\n\
                      - Static screenshots only\n- Original, family-friendly content\n",
        },
    },
    ExampleOrganisation {
        name: "Tars",
        contact_link: "https://tars.ai/contact",
        bounty: ExampleBounty {
            name: "Tars Creator Competition: Grand Prize",
            submit_link: "https://tars.ai/submit",
            skills: "Content Creation, Writing, Design",
            prizes: "10000,3000,2000",
            prize_currency: "USDC",
            details: "# Scope\n\nAny creative piece introducing the product.\n",
        },
    },
];

fn seed(storage: &DocumentStore, owner: &StoredUser) -> Result<usize, SeedError> {
    let organisations = OrganisationRepository::new(storage);
    let bounties = BountyRepository::new(storage);

    for example in &EXAMPLES {
        let now = Utc::now();
        let organisation = StoredOrganisation {
            id: uuid::Uuid::new_v4().to_string(),
            name: example.name.to_string(),
            logo: Some(StoredLogo {
                content_type: "image/png".to_string(),
            }),
            contact_link: example.contact_link.to_string(),
            owner_user_id: owner.id.clone(),
            created_at: now,
            updated_at: now,
        };
        organisations.create(&organisation, Some(EXAMPLE_LOGO))?;

        let bounty = &example.bounty;
        bounties.create(&StoredBounty {
            id: uuid::Uuid::new_v4().to_string(),
            name: bounty.name.to_string(),
            open_status: true,
            organisation_id: organisation.id.clone(),
            submit_link: bounty.submit_link.to_string(),
            contact_link: example.contact_link.to_string(),
            skills: bounty.skills.to_string(),
            prizes: bounty.prizes.to_string(),
            prize_currency: bounty.prize_currency.to_string(),
            details: bounty.details.to_string(),
            owner_user_id: owner.id.clone(),
            created_at: now,
            updated_at: now,
        })?;

        tracing::info!(organisation = %organisation.name, id = %organisation.id, "Seeded organisation");
    }

    Ok(EXAMPLES.len())
}

fn run(args: Args) -> Result<(), SeedError> {
    let mut storage = DocumentStore::new(StoragePaths::new(&args.data_dir));
    storage.initialize()?;

    let (user, created) =
        UserRepository::new(&storage).find_or_create(&args.email, &args.name, None)?;
    if created {
        tracing::info!(user_id = %user.id, email = %user.email, "Created seed user");
    }

    let count = seed(&storage, &user)?;
    println!("Seeded {count} organisations with one bounty each for {}", user.email);

    match args.auth_secret {
        Some(secret) => {
            let auth = AuthConfig {
                secret,
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                enforce_token_version: false,
            };
            println!("Bearer token: {}", issue_token(&auth, &user)?);
        }
        None => println!("{AUTH_SECRET_ENV} not set, no token printed"),
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            ExitCode::FAILURE
        }
    }
}
