// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the distribution REST API.
//!
//! Owner/catalog management plus the visitor-facing claim endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use pairdrop_core::types::{ClaimRecord, DeviceId, Owner, OwnerId, Pair, PairView};
use pairdrop_core::PairdropError;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// [`PairdropError`] carried to the HTTP boundary.
pub struct ApiError(pub PairdropError);

impl From<PairdropError> for ApiError {
    fn from(e: PairdropError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PairdropError::DailyCapReached => StatusCode::TOO_MANY_REQUESTS,
            PairdropError::NoPairsAvailable | PairdropError::Conflict => StatusCode::CONFLICT,
            PairdropError::NotFound { .. } => StatusCode::NOT_FOUND,
            PairdropError::Config(_) | PairdropError::Identity(_) => StatusCode::BAD_REQUEST,
            PairdropError::Storage { .. } | PairdropError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            error: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Request body for POST /v1/owners.
#[derive(Debug, Deserialize)]
pub struct CreateOwnerRequest {
    pub display_name: String,
    /// WhatsApp handle; normalized to digits server-side.
    pub contact_handle: String,
}

/// POST /v1/owners
pub async fn post_owner(
    State(state): State<GatewayState>,
    Json(body): Json<CreateOwnerRequest>,
) -> Result<(StatusCode, Json<Owner>), ApiError> {
    let owner = state
        .store
        .add_owner(&body.display_name, &body.contact_handle)
        .await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

/// GET /v1/owners
pub async fn list_owners(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<Owner>>, ApiError> {
    Ok(Json(state.store.owners().await?))
}

/// GET /v1/owners/{owner_id}
pub async fn get_owner(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Owner>, ApiError> {
    let owner = state
        .store
        .owner(&owner_id)
        .await?
        .ok_or(PairdropError::NotFound {
            entity: "owner",
            id: owner_id,
        })?;
    Ok(Json(owner))
}

/// Request body for PUT /v1/owners/{owner_id}/contact.
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub contact_handle: String,
}

/// PUT /v1/owners/{owner_id}/contact
pub async fn put_contact(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
    Json(body): Json<UpdateContactRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .set_contact_handle(&owner_id, &body.contact_handle)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for POST /v1/owners/{owner_id}/pairs.
#[derive(Debug, Deserialize)]
pub struct CreatePairRequest {
    pub resource_link: String,
    pub message: String,
    /// Claims this pair serves before retiring. Omitted means 1.
    #[serde(default)]
    pub usage_limit: Option<i64>,
}

/// POST /v1/owners/{owner_id}/pairs
pub async fn post_pair(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
    Json(body): Json<CreatePairRequest>,
) -> Result<(StatusCode, Json<Pair>), ApiError> {
    let pair = state
        .store
        .add_pair(&owner_id, &body.resource_link, &body.message, body.usage_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(pair)))
}

/// GET /v1/owners/{owner_id}/pairs
pub async fn list_pairs(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<Pair>>, ApiError> {
    Ok(Json(state.store.pairs(&owner_id).await?))
}

/// DELETE /v1/pairs/{pair_id}
pub async fn delete_pair(
    State(state): State<GatewayState>,
    Path(pair_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.remove_pair(&pair_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/owners/{owner_id}/claims
pub async fn list_claims(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<ClaimRecord>>, ApiError> {
    Ok(Json(state.store.claims_for_owner(&owner_id).await?))
}

/// Query string for GET /v1/claims/{owner_id}.
#[derive(Debug, Deserialize)]
pub struct ClaimQuery {
    pub device: String,
}

/// Response body for GET /v1/claims/{owner_id}.
#[derive(Debug, Serialize)]
pub struct ClaimStatusResponse {
    /// The pair this device holds today, if any.
    pub pair: Option<PairView>,
}

/// GET /v1/claims/{owner_id}?device=...
pub async fn get_claim_status(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<ClaimStatusResponse>, ApiError> {
    let pair = state
        .allocator
        .check_todays_claim(&DeviceId(query.device), &OwnerId(owner_id))
        .await?;
    Ok(Json(ClaimStatusResponse { pair }))
}

/// Request body for POST /v1/claims/{owner_id}.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub device_id: String,
}

/// POST /v1/claims/{owner_id}
pub async fn post_claim(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
    Json(body): Json<ClaimRequest>,
) -> Result<Json<PairView>, ApiError> {
    // A claim against an unknown owner must be a 404, not an empty catalog.
    if state.store.owner(&owner_id).await?.is_none() {
        return Err(PairdropError::NotFound {
            entity: "owner",
            id: owner_id,
        }
        .into());
    }
    let view = state
        .allocator
        .request_claim(&DeviceId(body.device_id), &OwnerId(owner_id))
        .await?;
    Ok(Json(view))
}
