//! SeaORM repository implementations

use crate::contract::{Document, DocumentType, Member, Organization, SchemaVersion};
use crate::domain::planner::{MigrationPlan, RollbackPlan};
use crate::domain::repository::{
    AlreadyNormalized, DocumentRepository, MemberRepository, NormalizationStore, NotNormalized,
    OrganizationRepository,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entity;

// ===== Organization Repository =====

pub struct SeaOrmOrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOrganizationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationRepository for SeaOrmOrganizationRepository {
    async fn insert(&self, organization: &Organization) -> Result<Organization> {
        let active_model = entity::ActiveModel::try_from(organization)?;
        let result = active_model.insert(&*self.db).await?;

        result.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let result = entity::Entity::find_by_id(id).one(&*self.db).await?;

        match result {
            Some(entity) => Ok(Some(entity.try_into()?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Result<Organization>)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;

        Ok(results
            .into_iter()
            .map(|e| (e.id, e.try_into()))
            .collect())
    }

    async fn list_ids(&self, normalized: bool) -> Result<Vec<Uuid>> {
        let ids = entity::Entity::find()
            .select_only()
            .column(entity::Column::Id)
            .filter(entity::Column::IsNormalized.eq(normalized))
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .into_tuple::<Uuid>()
            .all(&*self.db)
            .await?;

        Ok(ids)
    }
}

// ===== Member Repository =====

pub struct SeaOrmMemberRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMemberRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRepository for SeaOrmMemberRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = entity::member::Entity::find()
            .filter(entity::member::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(|e| e.try_into())
            .collect::<Result<Vec<_>>>()
    }

    async fn find_provisional_board(&self, organization_id: Uuid) -> Result<Vec<Member>> {
        let results = entity::member::Entity::find()
            .filter(entity::member::Column::OrganizationId.eq(organization_id))
            .filter(entity::member::Column::IsProvisionalBoard.eq(true))
            .order_by_asc(entity::member::Column::OriginalIndex)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(|e| e.try_into())
            .collect::<Result<Vec<_>>>()
    }
}

// ===== Document Repository =====

pub struct SeaOrmDocumentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDocumentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentRepository for SeaOrmDocumentRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = entity::document::Entity::find()
            .filter(entity::document::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(|e| e.try_into())
            .collect::<Result<Vec<_>>>()
    }

    async fn find_for_members(
        &self,
        member_ids: &[Uuid],
        types: &[DocumentType],
    ) -> Result<Vec<Document>> {
        if member_ids.is_empty() || types.is_empty() {
            return Ok(Vec::new());
        }
        let results = entity::document::Entity::find()
            .filter(entity::document::Column::MemberId.is_in(member_ids.iter().copied()))
            .filter(entity::document::Column::DocType.is_in(types.iter().map(|t| t.as_str())))
            .filter(entity::document::Column::IsActive.eq(true))
            .order_by_asc(entity::document::Column::OriginalPath)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(|e| e.try_into())
            .collect::<Result<Vec<_>>>()
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
        doc_type: DocumentType,
    ) -> Result<Vec<Document>> {
        let results = entity::document::Entity::find()
            .filter(entity::document::Column::OrganizationId.eq(organization_id))
            .filter(entity::document::Column::DocType.eq(doc_type.as_str()))
            .filter(entity::document::Column::IsActive.eq(true))
            .order_by_asc(entity::document::Column::CreatedAt)
            .order_by_asc(entity::document::Column::OriginalPath)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(|e| e.try_into())
            .collect::<Result<Vec<_>>>()
    }
}

// ===== Normalization Store =====

/// Applies migration and rollback plans, one transaction per organization.
/// A returned error means the transaction was dropped and rolled back.
pub struct SeaOrmNormalizationStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmNormalizationStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NormalizationStore for SeaOrmNormalizationStore {
    async fn commit_migration(&self, plan: &MigrationPlan) -> Result<()> {
        let txn = self.db.begin().await?;

        // Members first; documents reference them
        for member in &plan.members {
            entity::member::ActiveModel::try_from(member)?
                .insert(&txn)
                .await
                .with_context(|| format!("inserting member {}", member.rut))?;
        }
        for document in &plan.documents {
            entity::document::ActiveModel::from(document)
                .insert(&txn)
                .await
                .with_context(|| {
                    format!(
                        "inserting document {}",
                        document.original_path.as_deref().unwrap_or("-")
                    )
                })?;
        }

        let result = entity::Entity::update_many()
            .col_expr(
                entity::Column::MemberIds,
                Expr::value(serde_json::to_value(plan.member_ids())?),
            )
            .col_expr(
                entity::Column::DocumentIds,
                Expr::value(serde_json::to_value(plan.document_ids())?),
            )
            .col_expr(entity::Column::IsNormalized, Expr::value(true))
            .col_expr(entity::Column::NormalizedAt, Expr::value(plan.normalized_at))
            .col_expr(
                entity::Column::SchemaVersion,
                Expr::value(SchemaVersion::Normalized.as_i32()),
            )
            .col_expr(entity::Column::UpdatedAt, Expr::value(plan.normalized_at))
            .filter(entity::Column::Id.eq(plan.organization_id))
            .filter(entity::Column::IsNormalized.eq(false))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AlreadyNormalized(plan.organization_id).into());
        }

        txn.commit().await?;
        tracing::debug!(
            organization_id = %plan.organization_id,
            members = plan.members.len(),
            documents = plan.documents.len(),
            "migration committed"
        );
        Ok(())
    }

    async fn commit_rollback(&self, plan: &RollbackPlan) -> Result<(usize, usize)> {
        let txn = self.db.begin().await?;

        let reset = entity::Entity::update_many()
            .col_expr(entity::Column::MemberIds, Expr::value(serde_json::json!([])))
            .col_expr(entity::Column::DocumentIds, Expr::value(serde_json::json!([])))
            .col_expr(entity::Column::IsNormalized, Expr::value(false))
            .col_expr(
                entity::Column::NormalizedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(
                entity::Column::SchemaVersion,
                Expr::value(SchemaVersion::Legacy.as_i32()),
            )
            .col_expr(entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(entity::Column::Id.eq(plan.organization_id))
            .filter(entity::Column::IsNormalized.eq(true))
            .exec(&txn)
            .await?;

        if reset.rows_affected == 0 {
            txn.rollback().await?;
            return Err(NotNormalized(plan.organization_id).into());
        }

        let members_deleted = if plan.member_ids.is_empty() {
            0
        } else {
            entity::member::Entity::delete_many()
                .filter(entity::member::Column::OrganizationId.eq(plan.organization_id))
                .filter(entity::member::Column::Id.is_in(plan.member_ids.iter().copied()))
                .exec(&txn)
                .await?
                .rows_affected
        };
        let documents_deleted = if plan.document_ids.is_empty() {
            0
        } else {
            entity::document::Entity::delete_many()
                .filter(entity::document::Column::OrganizationId.eq(plan.organization_id))
                .filter(entity::document::Column::Id.is_in(plan.document_ids.iter().copied()))
                .exec(&txn)
                .await?
                .rows_affected
        };

        txn.commit().await?;
        Ok((
            usize::try_from(members_deleted)?,
            usize::try_from(documents_deleted)?,
        ))
    }
}
