// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
        Method,
    },
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authentication_filter, enforce_access_policy, entry_point::ErrorBody, Role},
    models::{
        CountResponse, CreateStoreRequest, FindEmailRequest, FindPasswordRequest,
        FindPasswordResponse, LoginRequest, LoginResponse, MemberResponse, PasswordUpdateRequest,
        ScoreRequest, SignUpRequest, StoreResponse, UpdateRequest,
    },
    state::AppState,
};

pub mod health;
pub mod members;
pub mod stores;

#[cfg(test)]
pub(crate) mod testing;

/// Build the application router.
///
/// Layers, outermost first: request id and tracing, CORS, the authentication
/// filter, then the access policy in front of the handlers.
pub fn router(state: AppState) -> Router {
    let authenticator = state.authenticator();
    let policy = state.policy.clone();

    Router::new()
        .route("/member/join", post(members::join))
        .route("/member/login", post(members::login))
        .route("/member/findEmail", post(members::find_email))
        .route("/member/findPassword", post(members::find_password))
        .route("/member/pwUpdate", put(members::password_update))
        .route("/member/findAll", get(members::find_all))
        .route("/member/totalCount", get(members::total_count))
        .route("/member/me", get(members::me))
        .route("/member/update", put(members::update))
        .route("/member/delete", delete(members::delete_me))
        .route("/member/{email}", delete(members::delete_member))
        .route("/store", get(stores::list_stores).post(stores::create_store))
        .route("/store/{id}", get(stores::get_store))
        .route("/store/{id}/score", post(stores::rate_store))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(policy, enforce_access_policy))
        .layer(from_fn_with_state(authenticator, authentication_filter))
        .layer(cors_layer())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::HEAD,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE])
}

/// Registers the `bearer` scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
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
        members::join,
        members::login,
        members::find_email,
        members::find_password,
        members::password_update,
        members::find_all,
        members::total_count,
        members::me,
        members::update,
        members::delete_me,
        members::delete_member,
        stores::list_stores,
        stores::get_store,
        stores::create_store,
        stores::rate_store,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            SignUpRequest,
            LoginRequest,
            LoginResponse,
            FindEmailRequest,
            FindPasswordRequest,
            FindPasswordResponse,
            PasswordUpdateRequest,
            UpdateRequest,
            MemberResponse,
            CountResponse,
            StoreResponse,
            CreateStoreRequest,
            ScoreRequest,
            ErrorBody,
            Role,
            health::HealthReport,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Members", description = "Registration, login and profile maintenance"),
        (name = "Stores", description = "Store directory and ratings"),
        (name = "Health", description = "Liveness and health probes")
    )
)]
struct ApiDoc;
