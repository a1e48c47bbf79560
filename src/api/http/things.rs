// src/api/http/things.rs
// Drain listing and update endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::{CurrentUser, MaybeUser};
use crate::api::error::{ApiError, ApiResult};
use crate::geo::Coordinate;
use crate::state::AppState;
use crate::things::{ThingPatch, ThingResponse, UpdateThingRequest};

#[derive(Debug, Deserialize)]
pub struct ListThingsQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub limit: Option<usize>,
}

/// `PUT /things` carries the id in the body alongside the patch.
#[derive(Debug, Deserialize)]
pub struct UpdateThingByBodyRequest {
    pub id: i64,
    pub thing: ThingPatch,
}

/// GET /things?lat=..&lng=..[&limit=..]
pub async fn list_things(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Query(query): Query<ListThingsQuery>,
) -> ApiResult<Json<Vec<ThingResponse>>> {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return Err(ApiError::bad_request("lat and lng are required"));
    };
    let at = Coordinate::new(lat, lng).map_err(ApiError::bad_request)?;
    let limit = state.config.clamp_limit(query.limit);

    let things = state.locator.find_closest(at, limit).await?;
    let current_user_id = user.id();

    Ok(Json(
        things
            .iter()
            .map(|t| ThingResponse::new(t, current_user_id))
            .collect(),
    ))
}

/// PUT /things/{id}
pub async fn update_thing(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateThingRequest>,
) -> ApiResult<Json<ThingResponse>> {
    let outcome = state.thing_service.update(id, &request.thing).await?;
    Ok(Json(ThingResponse::new(&outcome.thing, Some(user.id))))
}

/// PUT /things with `{"id": .., "thing": {..}}`
pub async fn update_thing_by_body(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateThingByBodyRequest>,
) -> ApiResult<Json<ThingResponse>> {
    let outcome = state.thing_service.update(request.id, &request.thing).await?;
    Ok(Json(ThingResponse::new(&outcome.thing, Some(user.id))))
}
