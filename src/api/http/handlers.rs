// src/api/http/handlers.rs
// Health and address lookup handlers

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
    pub city_state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

/// GET /address?address=..&city_state=..
pub async fn address_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<Json<AddressResponse>> {
    let parts: Vec<&str> = [query.address.as_deref(), query.city_state.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(ApiError::bad_request("address is required"));
    }

    let location = state.geocoder.geocode(&parts.join(", ")).await?;
    Ok(Json(AddressResponse {
        lat: location.coordinate.lat,
        lng: location.coordinate.lng,
        formatted_address: location.formatted_address,
    }))
}
