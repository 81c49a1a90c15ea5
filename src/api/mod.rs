// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Procedure API
//!
//! Every operation is a named procedure served at `POST /trpc/<group>.<name>`
//! with a JSON input. [`Procedure`] is the dispatch table: it maps each
//! procedure to its path, its access level and its handler.
//!
//! Protected procedures take the [`Auth`](crate::auth::Auth) extractor, which
//! rejects before the handler or the input parser runs.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        BountyInput, BountyResponse, GetUserRequest, IdInput, LogoData, LogoInfo,
        OrganisationInput, OrganisationResponse, OrganisationSummary, OrganisationWithBounties,
        SubscriptionStatus, SuccessResponse, UpdateBountyRequest, UpdateOrganisationRequest,
        UserResponse,
    },
    state::AppState,
    validation::FieldError,
};

pub mod auth;
pub mod bounties;
pub mod health;
pub mod organisations;
pub mod payments;

/// Largest accepted request body (logo uploads are base64 inside JSON).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Who may call a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a valid bearer token
    Protected,
}

/// The procedure dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    AuthGetUser,
    AuthLogout,
    #[cfg(feature = "dev")]
    AuthDevLogin,
    OrganisationCreate,
    OrganisationGetAll,
    OrganisationGetById,
    OrganisationGetLogo,
    OrganisationUpdate,
    OrganisationDelete,
    BountyCreate,
    BountyGetAll,
    BountyGetById,
    BountyUpdate,
    BountyDelete,
    PaymentsGetStatus,
}

impl Procedure {
    /// Every procedure served by this build.
    pub fn all() -> Vec<Procedure> {
        let mut all = vec![
            Procedure::AuthGetUser,
            Procedure::AuthLogout,
            Procedure::OrganisationCreate,
            Procedure::OrganisationGetAll,
            Procedure::OrganisationGetById,
            Procedure::OrganisationGetLogo,
            Procedure::OrganisationUpdate,
            Procedure::OrganisationDelete,
            Procedure::BountyCreate,
            Procedure::BountyGetAll,
            Procedure::BountyGetById,
            Procedure::BountyUpdate,
            Procedure::BountyDelete,
            Procedure::PaymentsGetStatus,
        ];
        #[cfg(feature = "dev")]
        all.push(Procedure::AuthDevLogin);
        all
    }

    /// Procedure name as clients call it, e.g. `bounty.getAll`.
    pub fn name(self) -> &'static str {
        match self {
            Procedure::AuthGetUser => "auth.getUser",
            Procedure::AuthLogout => "auth.logout",
            #[cfg(feature = "dev")]
            Procedure::AuthDevLogin => "auth.devLogin",
            Procedure::OrganisationCreate => "organisation.create",
            Procedure::OrganisationGetAll => "organisation.getAll",
            Procedure::OrganisationGetById => "organisation.getById",
            Procedure::OrganisationGetLogo => "organisation.getLogo",
            Procedure::OrganisationUpdate => "organisation.update",
            Procedure::OrganisationDelete => "organisation.delete",
            Procedure::BountyCreate => "bounty.create",
            Procedure::BountyGetAll => "bounty.getAll",
            Procedure::BountyGetById => "bounty.getById",
            Procedure::BountyUpdate => "bounty.update",
            Procedure::BountyDelete => "bounty.delete",
            Procedure::PaymentsGetStatus => "payments.getStatus",
        }
    }

    pub fn path(self) -> String {
        format!("/trpc/{}", self.name())
    }

    pub fn access(self) -> Access {
        match self {
            Procedure::AuthLogout
            | Procedure::OrganisationCreate
            | Procedure::OrganisationUpdate
            | Procedure::OrganisationDelete
            | Procedure::BountyCreate
            | Procedure::BountyUpdate
            | Procedure::BountyDelete
            | Procedure::PaymentsGetStatus => Access::Protected,
            _ => Access::Public,
        }
    }

    fn handler(self) -> MethodRouter<AppState> {
        match self {
            Procedure::AuthGetUser => post(auth::get_user),
            Procedure::AuthLogout => post(auth::logout),
            #[cfg(feature = "dev")]
            Procedure::AuthDevLogin => post(auth::dev_login),
            Procedure::OrganisationCreate => post(organisations::create_organisation),
            Procedure::OrganisationGetAll => post(organisations::list_organisations),
            Procedure::OrganisationGetById => post(organisations::get_organisation),
            Procedure::OrganisationGetLogo => post(organisations::get_logo),
            Procedure::OrganisationUpdate => post(organisations::update_organisation),
            Procedure::OrganisationDelete => post(organisations::delete_organisation),
            Procedure::BountyCreate => post(bounties::create_bounty),
            Procedure::BountyGetAll => post(bounties::list_bounties),
            Procedure::BountyGetById => post(bounties::get_bounty),
            Procedure::BountyUpdate => post(bounties::update_bounty),
            Procedure::BountyDelete => post(bounties::delete_bounty),
            Procedure::PaymentsGetStatus => post(payments::get_status),
        }
    }
}

/// Parse an input that may be omitted entirely (empty body or `null`).
pub(crate) fn optional_input<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            ApiError::validation(vec![FieldError::new(
                "body",
                format!("Failed to parse the request body as JSON: {e}"),
            )])
        })
}

pub fn router(state: AppState) -> Router {
    let procedures = Procedure::all()
        .into_iter()
        .fold(Router::new(), |router, procedure| {
            router.route(&procedure.path(), procedure.handler())
        });

    let routes = procedures
        .route("/api/webhooks/stripe", post(payments::stripe_webhook))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::get_user,
        auth::logout,
        organisations::create_organisation,
        organisations::list_organisations,
        organisations::get_organisation,
        organisations::get_logo,
        organisations::update_organisation,
        organisations::delete_organisation,
        bounties::create_bounty,
        bounties::list_bounties,
        bounties::get_bounty,
        bounties::update_bounty,
        bounties::delete_bounty,
        payments::get_status,
        payments::stripe_webhook
    ),
    components(
        schemas(
            UserResponse,
            GetUserRequest,
            SubscriptionStatus,
            SuccessResponse,
            IdInput,
            LogoInfo,
            LogoData,
            OrganisationResponse,
            OrganisationSummary,
            OrganisationWithBounties,
            OrganisationInput,
            UpdateOrganisationRequest,
            BountyResponse,
            BountyInput,
            UpdateBountyRequest,
            FieldError,
            payments::WebhookAck,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session and user lookup"),
        (name = "Organisations", description = "Organisation management"),
        (name = "Bounties", description = "Bounty management"),
        (name = "Payments", description = "Subscription status and payment webhooks"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;


#[cfg(test)]
mod tests {
    use super::test_helpers::signed_in;
    use super::*;
    use crate::auth::issue_token;
    use crate::providers::stripe::SIGNATURE_HEADER;
    use crate::state::test_state;
    use crate::storage::{StoredUser, UserRepository};
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Request, StatusCode},
    };
    use base64ct::{Base64, Encoding};
    use tower::ServiceExt;

    struct Reply {
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    }

    impl Reply {
        fn json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    async fn call(app: &Router, path: &str, body: Option<&str>, token: Option<&str>) -> Reply {
        let mut request = Request::builder().method("POST").uri(path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    fn unauthorized() -> serde_json::Value {
        serde_json::json!({"error": "Unauthorized", "error_code": "unauthorized"})
    }

    #[test]
    fn procedure_names_are_unique() {
        let mut paths: Vec<String> = Procedure::all().into_iter().map(Procedure::path).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _temp) = test_state();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn protected_procedures_share_one_401() {
        let (state, _temp) = test_state();
        let app = router(state);

        for procedure in Procedure::all() {
            if procedure.access() != Access::Protected {
                continue;
            }
            let reply = call(&app, &procedure.path(), Some("{}"), None).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{}", procedure.name());
            assert_eq!(reply.json(), unauthorized(), "{}", procedure.name());
        }
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable_and_mutate_nothing() {
        let (state, _temp) = test_state();
        let ghost = StoredUser::new("ghost@example.com", "Ghost", None);
        let ghost_token = issue_token(&state.auth_config, &ghost).unwrap();

        let expired_token = {
            let (user, _) = signed_in(&state, "ada@example.com");
            let now = chrono::Utc::now().timestamp();
            jsonwebtoken::encode(
                &jsonwebtoken::Header::default(),
                &crate::auth::TokenClaims {
                    sub: user.user_id,
                    tv: 0,
                    iat: now - 7200,
                    exp: now - 3600,
                },
                &jsonwebtoken::EncodingKey::from_secret(state.auth_config.secret.as_bytes()),
            )
            .unwrap()
        };

        let app = router(state);
        let body = r#"{"name":"Acme","contactLink":"https://acme.io"}"#;
        for token in [None, Some("garbage"), Some(ghost_token.as_str()), Some(expired_token.as_str())] {
            let reply = call(&app, "/trpc/organisation.create", Some(body), token).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
            assert_eq!(reply.json(), unauthorized());
        }

        let reply = call(&app, "/trpc/organisation.getAll", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json(), serde_json::json!([]));
    }

    #[tokio::test]
    async fn acme_with_png_logo_scenario() {
        let (state, _temp) = test_state();
        let (_, token) = signed_in(&state, "owner@example.com");
        let app = router(state);

        let png = Base64::encode_string(b"\x89PNG\r\n\x1a\nfake");
        let body = serde_json::json!({
            "name": "Acme",
            "contactLink": "https://acme.io",
            "logo": { "data": png, "contentType": "image/png" },
        })
        .to_string();

        let reply = call(&app, "/trpc/organisation.create", Some(&body), Some(&token)).await;
        assert_eq!(reply.status, StatusCode::OK);
        let created = reply.json();
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(created["contactLink"], "https://acme.io");
        assert_eq!(created["logo"], serde_json::json!({"contentType": "image/png"}));

        let reply = call(
            &app,
            "/trpc/organisation.getLogo",
            Some(&serde_json::json!({ "id": id }).to_string()),
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            reply.json(),
            serde_json::json!({ "data": png, "contentType": "image/png" })
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let (state, _temp) = test_state();
        let (_, token) = signed_in(&state, "owner@example.com");
        let app = router(state);

        let reply = call(&app, "/trpc/organisation.create", Some("{not json"), Some(&token)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let body = reply.json();
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["fields"][0]["field"], "body");

        let reply = call(&app, "/trpc/bounty.getById", None, None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_user_accepts_omitted_input() {
        let (state, _temp) = test_state();
        let (user, token) = signed_in(&state, "ada@example.com");
        let app = router(state);

        let reply = call(&app, "/trpc/auth.getUser", None, Some(&token)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["id"], user.user_id.as_str());

        let reply = call(&app, "/trpc/auth.getUser", Some("null"), None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_with_invalid_signature_never_touches_users() {
        let (state, _temp) = test_state();
        let (user, _) = signed_in(&state, "payer@example.com");
        let storage = state.storage();
        let users = UserRepository::new(&storage);
        let mut stored = users.get(&user.user_id).unwrap();
        stored.stripe_customer_id = Some("cus_1".into());
        users.update(&mut stored).unwrap();
        let before = users.get(&user.user_id).unwrap();

        let app = router(state.clone());
        let payload =
            r#"{"type":"checkout.session.completed","data":{"object":{"customer":"cus_1"}}}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(SIGNATURE_HEADER, "t=1,v1=deadbeef")
            .body(Body::from(payload))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("Webhook Error: "));

        assert_eq!(users.get(&user.user_id).unwrap(), before);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (state, _temp) = test_state();
        let app = router(state);

        let reply = call(&app, "/trpc/bounty.getAll", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn health_probes_are_routed() {
        let (state, _temp) = test_state();
        let app = router(state);

        for path in ["/health", "/health/live", "/health/ready"] {
            let request = Request::builder().uri(path).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _temp) = test_state();
        let app = router(state);

        let request = Request::builder()
            .uri("/api-doc/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/trpc/bounty.create"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
