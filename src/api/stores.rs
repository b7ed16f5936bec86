// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Store directory endpoints.
//!
//! Reads are public. Adding a store needs the admin authority and rating one
//! needs a signed-in member.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{entry_point::ErrorBody, AdminOnly, Auth},
    error::ApiError,
    models::{CreateStoreRequest, ScoreRequest, StoreQuery, StoreResponse},
    state::AppState,
    storage::RatedStore,
};

#[utoipa::path(
    get,
    path = "/store",
    params(StoreQuery),
    tag = "Stores",
    responses((status = 200, description = "Stores ordered by id", body = [StoreResponse]))
)]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<Vec<StoreResponse>>, ApiError> {
    let stores = match query.address.as_deref().map(str::trim) {
        Some(fragment) if !fragment.is_empty() => state.stores.list_by_address(fragment)?,
        _ => state.stores.list()?,
    };
    Ok(Json(stores.into_iter().map(StoreResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/store/{id}",
    params(("id" = u64, Path, description = "Store id")),
    tag = "Stores",
    responses(
        (status = 200, body = StoreResponse),
        (status = 404, description = "No such store", body = ErrorBody)
    )
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StoreResponse>, ApiError> {
    let rated = state
        .stores
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;
    Ok(Json(rated.into()))
}

#[utoipa::path(
    post,
    path = "/store",
    request_body = CreateStoreRequest,
    tag = "Stores",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoreResponse),
        (status = 400, description = "Missing name or address", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn create_store(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Json(request): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), ApiError> {
    if let Some(field) = request.missing_field() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }

    let store = state.stores.insert(request.into())?;
    tracing::info!(store_id = store.id, admin = admin.subject(), "Store added");

    let rated = RatedStore { store, score: None };
    Ok((StatusCode::CREATED, Json(rated.into())))
}

/// Rate a store from 1 to 5; answers with the new average.
#[utoipa::path(
    post,
    path = "/store/{id}/score",
    params(("id" = u64, Path, description = "Store id")),
    request_body = ScoreRequest,
    tag = "Stores",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoreResponse),
        (status = 400, description = "Score out of range", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, description = "No such store", body = ErrorBody)
    )
)]
pub async fn rate_store(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<u64>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<StoreResponse>, ApiError> {
    let tally = state.stores.add_score(id, request.score)?;
    tracing::debug!(store_id = id, member = principal.subject(), count = tally.count, "Store rated");

    let rated = state
        .stores
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;
    Ok(Json(rated.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{test_state, TEST_ADMIN};
    use crate::auth::{Principal, Role};

    fn cafe(name: &str, address: &str) -> CreateStoreRequest {
        CreateStoreRequest {
            name: name.to_string(),
            address: address.to_string(),
            tell: "02-123-4567".to_string(),
            operating_time: "09:00-21:00".to_string(),
            store_type: "cafe".to_string(),
            representative_menu: "latte".to_string(),
            lat: 37.5665,
            lon: 126.978,
        }
    }

    fn admin() -> AdminOnly {
        AdminOnly(Principal::new(TEST_ADMIN, "plain:pw", [Role::Member, Role::Admin]))
    }

    fn member() -> Auth {
        Auth(Principal::new("kim@example.com", "plain:pw", [Role::Member]))
    }

    #[tokio::test]
    async fn created_store_is_listed_unrated() {
        let (state, _dir) = test_state();
        let (status, Json(created)) =
            create_store(State(state.clone()), admin(), Json(cafe("Bean", "Seoul Mapo-gu")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, 1);
        assert_eq!(created.score, None);

        let Json(all) = list_stores(State(state), Query(StoreQuery { address: None }))
            .await
            .unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (state, _dir) = test_state();
        let Err(error) = create_store(State(state), admin(), Json(cafe("", "Seoul"))).await else {
            panic!("store without a name was accepted");
        };
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "name is required");
    }

    #[tokio::test]
    async fn address_query_filters_and_blank_query_lists_all() {
        let (state, _dir) = test_state();
        for (name, address) in [("A", "Seoul Jongno-gu"), ("B", "Busan"), ("C", "Seoul Mapo-gu")] {
            create_store(State(state.clone()), admin(), Json(cafe(name, address)))
                .await
                .unwrap();
        }

        let Json(seoul) = list_stores(
            State(state.clone()),
            Query(StoreQuery {
                address: Some("Seoul".to_string()),
            }),
        )
        .await
        .unwrap();
        let names: Vec<&str> = seoul.iter().map(|store| store.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        let Json(all) = list_stores(
            State(state),
            Query(StoreQuery {
                address: Some("  ".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn rating_updates_the_average() {
        let (state, _dir) = test_state();
        create_store(State(state.clone()), admin(), Json(cafe("Bean", "Seoul")))
            .await
            .unwrap();

        rate_store(State(state.clone()), member(), Path(1), Json(ScoreRequest { score: 4 }))
            .await
            .unwrap();
        let Json(rated) =
            rate_store(State(state.clone()), member(), Path(1), Json(ScoreRequest { score: 1 }))
                .await
                .unwrap();
        assert_eq!(rated.score, Some(2.5));

        let Json(fetched) = get_store(State(state), Path(1)).await.unwrap();
        assert_eq!(fetched.score, Some(2.5));
    }

    #[tokio::test]
    async fn unknown_store_is_404_and_bad_score_is_400() {
        let (state, _dir) = test_state();
        let Err(missing) = get_store(State(state.clone()), Path(9)).await else {
            panic!("unknown store was found");
        };
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "Store not found");

        let Err(unrated) =
            rate_store(State(state.clone()), member(), Path(9), Json(ScoreRequest { score: 3 })).await
        else {
            panic!("unknown store was rated");
        };
        assert_eq!(unrated.status, StatusCode::NOT_FOUND);

        create_store(State(state.clone()), admin(), Json(cafe("Bean", "Seoul")))
            .await
            .unwrap();
        let Err(out_of_range) =
            rate_store(State(state), member(), Path(1), Json(ScoreRequest { score: 6 })).await
        else {
            panic!("score 6 was accepted");
        };
        assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);
    }
}
