//! Native client trait for inter-module communication
//!
//! Downstream consumers (legal document generation, dashboards) use this API
//! instead of reading raw organization fields, so they stay correct across
//! both schema generations.

use super::error::RegistryError;
use super::model::{
    DocumentStats, IncludeOptions, MemberView, MigrationOptions, MigrationSummary,
    OrganizationWithMembers, ProvisionalBoard, RollbackSummary,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Organization registry API for in-process callers
#[async_trait]
pub trait OrganizationRegistryApi: Send + Sync {
    // ===== Reads =====

    /// Organization with members resolved from the active format
    async fn get_organization_with_members(
        &self,
        organization_id: Uuid,
        include: IncludeOptions,
    ) -> Result<Option<OrganizationWithMembers>, RegistryError>;

    /// All members; empty when the organization does not exist
    async fn get_organization_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError>;

    /// Electoral commission members; empty when the organization does not exist
    async fn get_electoral_commission(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError>;

    /// Provisional board seats
    async fn get_provisional_board(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ProvisionalBoard>, RegistryError>;

    /// A single Base64 signature by key (`"ministro"` or a validation key)
    async fn get_signature(
        &self,
        organization_id: Uuid,
        signature_key: &str,
    ) -> Result<Option<String>, RegistryError>;

    /// Aggregate payload statistics
    async fn get_organization_document_stats(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<DocumentStats>, RegistryError>;

    // ===== Administrative =====

    /// Normalize every pending organization (or the targeted one)
    async fn run_migration(
        &self,
        options: MigrationOptions,
    ) -> Result<MigrationSummary, RegistryError>;

    /// Revert normalized organizations to legacy reads
    async fn run_rollback(
        &self,
        options: MigrationOptions,
    ) -> Result<RollbackSummary, RegistryError>;
}
