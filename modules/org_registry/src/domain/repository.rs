//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::planner::{MigrationPlan, RollbackPlan};
use crate::contract::{Document, DocumentType, Member, Organization};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for organization records
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Store a new organization (registration workflow entry point)
    async fn insert(&self, organization: &Organization) -> Result<Organization>;

    /// Find an organization by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>>;

    /// Find several organizations; missing ids are omitted. A row that
    /// cannot be mapped is returned as its own error so siblings still load.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Result<Organization>)>>;

    /// Ids of organizations with the given normalization flag, oldest first
    async fn list_ids(&self, normalized: bool) -> Result<Vec<Uuid>>;
}

/// Repository for normalized members
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find members by id; order is unspecified
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>>;

    /// Members of an organization flagged as provisional board
    async fn find_provisional_board(&self, organization_id: Uuid) -> Result<Vec<Member>>;
}

/// Repository for normalized documents
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Find documents by id; order is unspecified
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Document>>;

    /// Documents of the given types owned by any of the members
    async fn find_for_members(
        &self,
        member_ids: &[Uuid],
        types: &[DocumentType],
    ) -> Result<Vec<Document>>;

    /// Active documents of one type belonging to an organization
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
        doc_type: DocumentType,
    ) -> Result<Vec<Document>>;
}

/// Transactional writes of the normalization engine
///
/// Each call is one transaction scoped to a single organization: either
/// every row of the plan is written or none is.
#[async_trait]
pub trait NormalizationStore: Send + Sync {
    /// Insert members, then documents, then flip the organization to
    /// normalized. Fails with [`AlreadyNormalized`] when the organization
    /// was normalized concurrently.
    async fn commit_migration(&self, plan: &MigrationPlan) -> Result<()>;

    /// Delete the referenced members and documents and reset the
    /// organization to legacy reads. Fails with [`NotNormalized`] when the
    /// organization is not normalized. Returns (members, documents) deleted.
    async fn commit_rollback(&self, plan: &RollbackPlan) -> Result<(usize, usize)>;
}

/// The organization was already normalized when the transaction ran
#[derive(Debug, thiserror::Error)]
#[error("organization {0} is already normalized")]
pub struct AlreadyNormalized(pub Uuid);

/// The organization was not normalized when the transaction ran
#[derive(Debug, thiserror::Error)]
#[error("organization {0} is not normalized")]
pub struct NotNormalized(pub Uuid);
