//! Route registration and OpenAPI schema collection

use super::{dto::*, handlers};
use crate::domain::Service;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// OpenAPI components exposed by the registry
#[derive(OpenApi)]
#[openapi(components(schemas(
    OrganizationDto,
    OrganizationWithMembersDto,
    MemberDto,
    MemberListResponse,
    ProvisionalBoardDto,
    SignatureDto,
    DocumentStatsDto,
    NormalizationRequest,
    RecordFailureDto,
    MigrationSummaryDto,
    RollbackSummaryDto,
)))]
pub struct ApiDoc;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let router = router
        // Organization read endpoints
        .route("/organizations/{id}", get(get_organization_handler))
        .route("/organizations/{id}/members", get(list_members_handler))
        .route(
            "/organizations/{id}/electoral-commission",
            get(list_electoral_commission_handler),
        )
        .route(
            "/organizations/{id}/provisional-board",
            get(get_provisional_board_handler),
        )
        .route(
            "/organizations/{id}/signatures/{key}",
            get(get_signature_handler),
        )
        .route(
            "/organizations/{id}/document-stats",
            get(get_document_stats_handler),
        )
        // Administrative endpoints
        .route("/admin/normalization", post(run_migration_handler))
        .route("/admin/normalization/rollback", post(run_rollback_handler))
        .route("/openapi.json", get(openapi_handler))
        // Add service as extension for handlers
        .layer(Extension(service));

    Ok(router)
}

// ===== Handler wrappers that extract service from Extension =====

async fn get_organization_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<uuid::Uuid>,
    query: axum::extract::Query<handlers::IncludeQuery>,
) -> Result<axum::Json<OrganizationWithMembersDto>, super::error::Problem> {
    handlers::get_organization(service, path, query).await
}

async fn list_members_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<uuid::Uuid>,
) -> Result<axum::Json<MemberListResponse>, super::error::Problem> {
    handlers::list_members(service, path).await
}

async fn list_electoral_commission_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<uuid::Uuid>,
) -> Result<axum::Json<MemberListResponse>, super::error::Problem> {
    handlers::list_electoral_commission(service, path).await
}

async fn get_provisional_board_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<uuid::Uuid>,
) -> Result<axum::Json<ProvisionalBoardDto>, super::error::Problem> {
    handlers::get_provisional_board(service, path).await
}

async fn get_signature_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<(uuid::Uuid, String)>,
) -> Result<axum::Json<SignatureDto>, super::error::Problem> {
    handlers::get_signature(service, path).await
}

async fn get_document_stats_handler(
    Extension(service): Extension<Arc<Service>>,
    path: axum::extract::Path<uuid::Uuid>,
) -> Result<axum::Json<DocumentStatsDto>, super::error::Problem> {
    handlers::get_document_stats(service, path).await
}

async fn run_migration_handler(
    Extension(service): Extension<Arc<Service>>,
    json: axum::Json<NormalizationRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<MigrationSummaryDto>), super::error::Problem> {
    handlers::run_migration(service, json).await
}

async fn run_rollback_handler(
    Extension(service): Extension<Arc<Service>>,
    json: axum::Json<NormalizationRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<RollbackSummaryDto>), super::error::Problem> {
    handlers::run_rollback(service, json).await
}

async fn openapi_handler() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
