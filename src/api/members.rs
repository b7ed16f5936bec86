// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member endpoints: registration, login, recovery and profile maintenance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::{check_credentials, entry_point::ErrorBody, AdminOnly, Auth, BadCredentials, Role},
    error::ApiError,
    models::{
        CountResponse, FindEmailRequest, FindPasswordRequest, FindPasswordResponse, LoginRequest,
        LoginResponse, MemberResponse, PasswordUpdateRequest, SignUpRequest, UpdateRequest,
    },
    state::AppState,
    storage::{join_rrn, Member},
};

const IDENTITY_MISMATCH: &str = "Check your name or resident registration number.";

/// Register a new member.
///
/// Emails configured in `ADMIN_EMAILS` also receive the admin authority.
#[utoipa::path(
    post,
    path = "/member/join",
    tag = "Members",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Member registered", body = MemberResponse),
        (status = 400, description = "Missing field or email already registered", body = ErrorBody)
    )
)]
pub async fn join(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    if let Some(field) = request.missing_field() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    if state.members.exists_by_email(&request.email)? {
        return Err(ApiError::bad_request("This email is already registered."));
    }

    let password_hash = state.passwords.encode(&request.password)?;
    let mut member = Member::new(
        request.email,
        password_hash,
        request.name,
        join_rrn(&request.front_rrn, &request.back_rrn),
        request.number,
    );
    if state.is_admin_email(&member.email) {
        member = member.with_role(Role::Admin);
    }

    state.members.insert(&member)?;
    tracing::info!(member_id = %member.id, admin = member.roles.contains(&Role::Admin), "Member registered");

    Ok(Json(member.into()))
}

/// Check credentials and issue a bearer token.
///
/// Unknown email and wrong password are answered identically.
#[utoipa::path(
    post,
    path = "/member/login",
    tag = "Members",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Bad credentials", body = ErrorBody),
        (status = 500, description = "Member store unavailable", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let member = state.members.find_by_email(&request.email)?;
    let principal = check_credentials(
        state.passwords.as_ref(),
        member.as_ref().map(Member::to_principal),
        &request.password,
    )?;
    let member = member.ok_or(BadCredentials)?;

    let issued = state.tokens.issue(principal.subject())?;
    tracing::info!(member_id = %member.id, exp = issued.claims.exp, "Token issued");

    Ok(Json(LoginResponse::new(issued, &member)))
}

/// Look up a member's account by name and resident registration number.
#[utoipa::path(
    post,
    path = "/member/findEmail",
    tag = "Members",
    request_body = FindEmailRequest,
    responses(
        (status = 200, description = "Matching member", body = MemberResponse),
        (status = 400, description = "No member matches", body = ErrorBody)
    )
)]
pub async fn find_email(
    State(state): State<AppState>,
    Json(request): Json<FindEmailRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let rrn = join_rrn(&request.front_rrn, &request.back_rrn);
    let member = state
        .members
        .find_by_name_and_rrn(&request.name, &rrn)?
        .ok_or_else(|| ApiError::bad_request(IDENTITY_MISMATCH))?;

    Ok(Json(member.into()))
}

/// Verify the identity used for a password reset.
#[utoipa::path(
    post,
    path = "/member/findPassword",
    tag = "Members",
    request_body = FindPasswordRequest,
    responses(
        (status = 200, description = "Whether the identity matches", body = FindPasswordResponse)
    )
)]
pub async fn find_password(
    State(state): State<AppState>,
    Json(request): Json<FindPasswordRequest>,
) -> Result<Json<FindPasswordResponse>, ApiError> {
    let rrn = join_rrn(&request.front_rrn, &request.back_rrn);
    let valid = state
        .members
        .exists_by_email_and_name_and_rrn(&request.email, &request.name, &rrn)?;

    Ok(Json(FindPasswordResponse { valid }))
}

/// Reset a password.
///
/// Public, so the identity is checked again here rather than trusted from an
/// earlier `findPassword` call.
#[utoipa::path(
    put,
    path = "/member/pwUpdate",
    tag = "Members",
    request_body = PasswordUpdateRequest,
    responses(
        (status = 200, description = "Password replaced", body = MemberResponse),
        (status = 400, description = "Identity mismatch or empty password", body = ErrorBody)
    )
)]
pub async fn password_update(
    State(state): State<AppState>,
    Json(request): Json<PasswordUpdateRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    if request.password.trim().is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }

    let rrn = join_rrn(&request.front_rrn, &request.back_rrn);
    let mut member = state
        .members
        .find_by_email(&request.email)?
        .filter(|member| member.name == request.name && member.rrn == rrn)
        .ok_or_else(|| ApiError::bad_request(IDENTITY_MISMATCH))?;

    member.password_hash = state.passwords.encode(&request.password)?;
    member.updated_at = Utc::now();
    state.members.update(&request.email, &member)?;
    tracing::info!(member_id = %member.id, "Password reset");

    Ok(Json(member.into()))
}

/// List all members.
#[utoipa::path(
    get,
    path = "/member/findAll",
    tag = "Members",
    responses(
        (status = 200, description = "All members", body = Vec<MemberResponse>)
    )
)]
pub async fn find_all(State(state): State<AppState>) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = state.members.find_all()?;
    Ok(Json(members.iter().map(MemberResponse::from).collect()))
}

/// Number of registered members.
#[utoipa::path(
    get,
    path = "/member/totalCount",
    tag = "Members",
    responses(
        (status = 200, description = "Member count", body = CountResponse)
    )
)]
pub async fn total_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    Ok(Json(CountResponse {
        count: state.members.count()?,
    }))
}

/// The member making the request.
#[utoipa::path(
    get,
    path = "/member/me",
    tag = "Members",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current member", body = MemberResponse),
        (status = 401, description = "Missing or unusable token", body = ErrorBody)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = state
        .members
        .find_by_email(principal.subject())?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    Ok(Json(member.into()))
}

/// Update the caller's own record.
///
/// Changing the email re-keys the member. Tokens carry the email as subject,
/// so the caller has to log in again afterwards.
#[utoipa::path(
    put,
    path = "/member/update",
    tag = "Members",
    security(("bearer" = [])),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Updated member", body = MemberResponse),
        (status = 400, description = "Invalid field or email taken", body = ErrorBody),
        (status = 401, description = "Missing or unusable token", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let current_email = principal.subject();
    let mut member = state
        .members
        .find_by_email(current_email)?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    if let Some(email) = request.email {
        if email.trim().is_empty() {
            return Err(ApiError::bad_request("email must not be empty"));
        }
        member.email = email;
    }
    if let Some(name) = request.name {
        member.name = name;
    }
    if let Some(number) = request.number {
        member.number = number;
    }
    if let (Some(front), Some(back)) = (&request.front_rrn, &request.back_rrn) {
        member.rrn = join_rrn(front, back);
    }
    if let Some(password) = request.password {
        if password.trim().is_empty() {
            return Err(ApiError::bad_request("password must not be empty"));
        }
        member.password_hash = state.passwords.encode(&password)?;
    }
    member.updated_at = Utc::now();

    state.members.update(current_email, &member)?;
    tracing::info!(member_id = %member.id, "Member updated");

    Ok(Json(member.into()))
}

/// Delete the caller's own record.
#[utoipa::path(
    delete,
    path = "/member/delete",
    tag = "Members",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 401, description = "Missing or unusable token", body = ErrorBody)
    )
)]
pub async fn delete_me(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> Result<StatusCode, ApiError> {
    state.members.delete(principal.subject())?;
    tracing::info!("Member deleted own account");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete any member (admin only).
#[utoipa::path(
    delete,
    path = "/member/{email}",
    tag = "Members",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Email of the member to delete")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 401, description = "Missing or unusable token", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "Member not found", body = ErrorBody)
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path(email): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.members.delete(&email)?;
    tracing::info!(admin = admin.subject(), "Member deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
