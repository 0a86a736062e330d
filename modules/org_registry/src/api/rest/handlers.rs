//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::contract::{IncludeOptions, RegistryError};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

// ===== Organization Handlers =====

/// Query parameters selecting which payloads to attach
#[derive(Debug, Default, Deserialize)]
pub struct IncludeQuery {
    #[serde(default)]
    pub include_signatures: bool,
    #[serde(default)]
    pub include_certificates: bool,
}

fn organization_instance(id: Uuid) -> String {
    format!("/organizations/{}", id)
}

fn not_found(id: Uuid) -> Problem {
    map_domain_error(RegistryError::organization_not_found(id)).with_instance(organization_instance(id))
}

/// Get an organization with its members
pub async fn get_organization(
    service: Arc<Service>,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeQuery>,
) -> Result<Json<OrganizationWithMembersDto>, Problem> {
    let include = IncludeOptions {
        include_signatures: query.include_signatures,
        include_certificates: query.include_certificates,
    };
    let resolved = service
        .get_organization_with_members(id, include)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(resolved.into()))
}

/// List all members
pub async fn list_members(
    service: Arc<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberListResponse>, Problem> {
    let members = service
        .get_organization_members(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(members.into()))
}

/// List electoral commission members
pub async fn list_electoral_commission(
    service: Arc<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberListResponse>, Problem> {
    let members = service
        .get_electoral_commission(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(members.into()))
}

/// Get the provisional board
pub async fn get_provisional_board(
    service: Arc<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProvisionalBoardDto>, Problem> {
    let board = service
        .get_provisional_board(id)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(board.into()))
}

/// Get a single signature by key
pub async fn get_signature(
    service: Arc<Service>,
    Path((id, key)): Path<(Uuid, String)>,
) -> Result<Json<SignatureDto>, Problem> {
    let content = service
        .get_signature(id, &key)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| {
            map_domain_error(RegistryError::NotFound {
                resource: "signature".to_string(),
                id: key.clone(),
            })
            .with_instance(format!("{}/signatures/{}", organization_instance(id), key))
        })?;

    Ok(Json(SignatureDto { key, content }))
}

/// Get aggregate payload statistics
pub async fn get_document_stats(
    service: Arc<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentStatsDto>, Problem> {
    let stats = service
        .get_organization_document_stats(id)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(stats.into()))
}

// ===== Normalization Handlers =====

/// Run a migration batch
pub async fn run_migration(
    service: Arc<Service>,
    Json(req): Json<NormalizationRequest>,
) -> Result<(StatusCode, Json<MigrationSummaryDto>), Problem> {
    let summary = service
        .run_migration(&req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::OK, Json(summary.into())))
}

/// Run a rollback batch
pub async fn run_rollback(
    service: Arc<Service>,
    Json(req): Json<NormalizationRequest>,
) -> Result<(StatusCode, Json<RollbackSummaryDto>), Problem> {
    let summary = service
        .run_rollback(&req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::OK, Json(summary.into())))
}
