// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the member API. Field names are camelCase
//! on the wire. All types derive `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Registration & Login**: sign-up, credential check, issued token
//! - **Recovery**: email lookup, password reset verification and update
//! - **Profile**: the member view, partial updates, member count
//! - **Stores**: store directory listings with their average rating
//!
//! Resident registration numbers travel as two halves (`frontRrn`,
//! `backRrn`) and are stored joined. Neither the password hash nor the rrn
//! is ever part of a response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{IssuedToken, Role};
use crate::storage::{Member, RatedStore, StoreDetails};

/// Scheme reported in [`LoginResponse::token_type`].
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Registration & Login
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// First half of the resident registration number (birth date).
    pub front_rrn: String,
    /// Second half of the resident registration number.
    pub back_rrn: String,
    /// Phone number.
    pub number: String,
}

impl SignUpRequest {
    /// First blank required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("email", &self.email),
            ("password", &self.password),
            ("name", &self.name),
            ("frontRrn", &self.front_rrn),
            ("backRrn", &self.back_rrn),
            ("number", &self.number),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer token plus the member it was issued to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Compact JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Instant from which the token is rejected.
    pub expires_at: DateTime<Utc>,
    pub member: MemberResponse,
}

impl LoginResponse {
    pub fn new(issued: IssuedToken, member: &Member) -> Self {
        let expires_at = issued.claims.expires_at().unwrap_or_else(Utc::now);
        Self {
            token: issued.token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_at,
            member: member.into(),
        }
    }
}

// =============================================================================
// Recovery
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindEmailRequest {
    pub name: String,
    pub front_rrn: String,
    pub back_rrn: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindPasswordRequest {
    pub email: String,
    pub name: String,
    pub front_rrn: String,
    pub back_rrn: String,
}

/// Whether the submitted identity matches a member.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FindPasswordResponse {
    pub valid: bool,
}

/// Password reset. The identity fields must match the stored member.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub email: String,
    pub name: String,
    pub front_rrn: String,
    pub back_rrn: String,
    /// New password.
    pub password: String,
}

// =============================================================================
// Profile
// =============================================================================

/// Partial update of the caller's own record; absent fields are kept.
///
/// The rrn changes only when both halves are present.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub front_rrn: Option<String>,
    pub back_rrn: Option<String>,
    pub number: Option<String>,
}

/// Public view of a member.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub number: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            name: member.name.clone(),
            number: member.number.clone(),
            roles: member.roles.iter().copied().collect(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        (&member).into()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

// =============================================================================
// Stores
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
pub struct StoreQuery {
    /// Keep only stores whose address contains this text.
    pub address: Option<String>,
}

/// Store directory entry. `score` is the average rating, absent while unrated.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub tell: String,
    pub operating_time: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub representative_menu: String,
    pub lat: f64,
    pub lon: f64,
    pub score: Option<f64>,
}

impl From<RatedStore> for StoreResponse {
    fn from(rated: RatedStore) -> Self {
        let details = rated.store.details;
        Self {
            id: rated.store.id,
            name: details.name,
            address: details.address,
            tell: details.tell,
            operating_time: details.operating_time,
            store_type: details.store_type,
            representative_menu: details.representative_menu,
            lat: details.lat,
            lon: details.lon,
            score: rated.score,
        }
    }
}

/// New store entry, admin only.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub address: String,
    pub tell: String,
    pub operating_time: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub representative_menu: String,
    pub lat: f64,
    pub lon: f64,
}

impl CreateStoreRequest {
    /// First required text field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [("name", &self.name), ("address", &self.address)]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
    }
}

impl From<CreateStoreRequest> for StoreDetails {
    fn from(request: CreateStoreRequest) -> Self {
        Self {
            name: request.name,
            address: request.address,
            tell: request.tell,
            operating_time: request.operating_time,
            store_type: request.store_type,
            representative_menu: request.representative_menu,
            lat: request.lat,
            lon: request.lon,
        }
    }
}

/// One rating from 1 to 5.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct ScoreRequest {
    pub score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::join_rrn;

    fn kim() -> Member {
        Member::new(
            "kim@example.com",
            "$argon2id$secret",
            "Kim",
            join_rrn("900101", "1234567"),
            "010-1234-5678",
        )
    }

    #[test]
    fn sign_up_request_reads_camel_case() {
        let request: SignUpRequest = serde_json::from_str(
            r#"{"email":"kim@example.com","password":"pw","name":"Kim",
                "frontRrn":"900101","backRrn":"1234567","number":"010"}"#,
        )
        .unwrap();
        assert_eq!(request.front_rrn, "900101");
        assert_eq!(request.back_rrn, "1234567");
        assert_eq!(request.missing_field(), None);
    }

    #[test]
    fn sign_up_request_reports_blank_field() {
        let request: SignUpRequest = serde_json::from_str(
            r#"{"email":"kim@example.com","password":"  ","name":"Kim",
                "frontRrn":"900101","backRrn":"1234567","number":"010"}"#,
        )
        .unwrap();
        assert_eq!(request.missing_field(), Some("password"));
    }

    #[test]
    fn member_response_hides_secrets() {
        let json = serde_json::to_value(MemberResponse::from(kim())).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["email"], "kim@example.com");
        assert_eq!(object["roles"], serde_json::json!(["member"]));
        assert!(object.contains_key("createdAt"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("rrn"));
    }

    #[test]
    fn update_request_fields_are_optional() {
        let request: UpdateRequest = serde_json::from_str(r#"{"number":"010-0000-0000"}"#).unwrap();
        assert_eq!(request.number.as_deref(), Some("010-0000-0000"));
        assert!(request.email.is_none());
        assert!(request.front_rrn.is_none());
    }

    #[test]
    fn store_response_uses_type_key_and_average() {
        let rated = RatedStore {
            store: crate::storage::Store {
                id: 7,
                details: StoreDetails {
                    name: "Bean".to_string(),
                    address: "Seoul Mapo-gu".to_string(),
                    tell: "02-000-0000".to_string(),
                    operating_time: "09:00-18:00".to_string(),
                    store_type: "cafe".to_string(),
                    representative_menu: "latte".to_string(),
                    lat: 37.55,
                    lon: 126.92,
                },
            },
            score: Some(4.5),
        };

        let json = serde_json::to_value(StoreResponse::from(rated)).unwrap();
        assert_eq!(json["type"], "cafe");
        assert_eq!(json["operatingTime"], "09:00-18:00");
        assert_eq!(json["representativeMenu"], "latte");
        assert_eq!(json["score"], 4.5);
        assert!(json.get("storeType").is_none());
    }

    #[test]
    fn create_store_request_reports_blank_name() {
        let request: CreateStoreRequest = serde_json::from_str(
            r#"{"name":" ","address":"Seoul","tell":"","operatingTime":"",
                "type":"cafe","representativeMenu":"","lat":0.0,"lon":0.0}"#,
        )
        .unwrap();
        assert_eq!(request.missing_field(), Some("name"));
    }
}
