//! Domain service - business logic orchestration

use super::accessor::OrganizationAccessor;
use super::events::ProgressReporter;
use super::migration::MigrationEngine;
use super::repository::{
    DocumentRepository, MemberRepository, NormalizationStore, OrganizationRepository,
};
use crate::contract::{
    DocumentStats, IncludeOptions, MemberView, MigrationOptions, MigrationOutcome,
    MigrationSummary, Organization, OrganizationWithMembers, ProvisionalBoard, RegistryError,
    RollbackOutcome, RollbackSummary,
};
use std::sync::Arc;
use uuid::Uuid;

/// Domain service for the organization registry
pub struct Service {
    organizations: Arc<dyn OrganizationRepository>,
    accessor: OrganizationAccessor,
    engine: MigrationEngine,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        members: Arc<dyn MemberRepository>,
        documents: Arc<dyn DocumentRepository>,
        store: Arc<dyn NormalizationStore>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            accessor: OrganizationAccessor::new(organizations.clone(), members, documents),
            engine: MigrationEngine::new(organizations.clone(), store, reporter),
            organizations,
        }
    }

    // ===== Registration =====

    /// Store a freshly registered organization in legacy format
    pub async fn register_organization(
        &self,
        organization: Organization,
    ) -> Result<Organization, RegistryError> {
        if organization.name.trim().is_empty() {
            return Err(RegistryError::Validation {
                message: "organization name must not be empty".to_string(),
            });
        }
        self.organizations
            .insert(&organization)
            .await
            .map_err(RegistryError::store)
    }

    // ===== Reads =====

    pub async fn get_organization_with_members(
        &self,
        organization_id: Uuid,
        include: IncludeOptions,
    ) -> Result<Option<OrganizationWithMembers>, RegistryError> {
        self.accessor
            .get_organization_with_members(organization_id, include)
            .await
    }

    pub async fn get_organization_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        self.accessor.get_organization_members(organization_id).await
    }

    pub async fn get_electoral_commission(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        self.accessor.get_electoral_commission(organization_id).await
    }

    pub async fn get_provisional_board(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ProvisionalBoard>, RegistryError> {
        self.accessor.get_provisional_board(organization_id).await
    }

    pub async fn get_signature(
        &self,
        organization_id: Uuid,
        signature_key: &str,
    ) -> Result<Option<String>, RegistryError> {
        self.accessor
            .get_signature(organization_id, signature_key)
            .await
    }

    pub async fn get_organization_document_stats(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<DocumentStats>, RegistryError> {
        self.accessor
            .get_organization_document_stats(organization_id)
            .await
    }

    // ===== Normalization =====

    /// Migrate a single organization by id
    pub async fn migrate_organization(
        &self,
        organization_id: Uuid,
        dry_run: bool,
    ) -> Result<MigrationOutcome, RegistryError> {
        let organization = self.load(organization_id).await?;
        self.engine.migrate_organization(&organization, dry_run).await
    }

    /// Roll back a single organization by id
    pub async fn rollback_organization(
        &self,
        organization_id: Uuid,
        dry_run: bool,
    ) -> Result<RollbackOutcome, RegistryError> {
        let organization = self.load(organization_id).await?;
        self.engine.rollback_organization(&organization, dry_run).await
    }

    pub async fn run_migration(
        &self,
        options: &MigrationOptions,
    ) -> Result<MigrationSummary, RegistryError> {
        self.engine.run_migration(options).await
    }

    pub async fn run_rollback(
        &self,
        options: &MigrationOptions,
    ) -> Result<RollbackSummary, RegistryError> {
        self.engine.run_rollback(options).await
    }

    async fn load(&self, organization_id: Uuid) -> Result<Organization, RegistryError> {
        self.organizations
            .find_by_id(organization_id)
            .await
            .map_err(RegistryError::store)?
            .ok_or_else(|| RegistryError::organization_not_found(organization_id))
    }
}
