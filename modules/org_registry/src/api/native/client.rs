//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    DocumentStats, IncludeOptions, MemberView, MigrationOptions, MigrationSummary,
    OrganizationRegistryApi, OrganizationWithMembers, ProvisionalBoard, RegistryError,
    RollbackSummary,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client implementation that directly calls the domain service
///
/// Used by in-process consumers (document generation, dashboards) without
/// HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl OrganizationRegistryApi for NativeClient {
    async fn get_organization_with_members(
        &self,
        organization_id: Uuid,
        include: IncludeOptions,
    ) -> Result<Option<OrganizationWithMembers>, RegistryError> {
        self.service
            .get_organization_with_members(organization_id, include)
            .await
    }

    async fn get_organization_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        self.service.get_organization_members(organization_id).await
    }

    async fn get_electoral_commission(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        self.service.get_electoral_commission(organization_id).await
    }

    async fn get_provisional_board(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ProvisionalBoard>, RegistryError> {
        self.service.get_provisional_board(organization_id).await
    }

    async fn get_signature(
        &self,
        organization_id: Uuid,
        signature_key: &str,
    ) -> Result<Option<String>, RegistryError> {
        self.service
            .get_signature(organization_id, signature_key)
            .await
    }

    async fn get_organization_document_stats(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<DocumentStats>, RegistryError> {
        self.service
            .get_organization_document_stats(organization_id)
            .await
    }

    async fn run_migration(
        &self,
        options: MigrationOptions,
    ) -> Result<MigrationSummary, RegistryError> {
        self.service.run_migration(&options).await
    }

    async fn run_rollback(
        &self,
        options: MigrationOptions,
    ) -> Result<RollbackSummary, RegistryError> {
        self.service.run_rollback(&options).await
    }
}
