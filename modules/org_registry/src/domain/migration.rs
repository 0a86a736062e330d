//! Batch driver converting organizations between schema generations

use super::events::{NormalizationEvent, ProgressReporter};
use super::planner::{plan_migration, RollbackPlan};
use super::repository::{AlreadyNormalized, NormalizationStore, NotNormalized, OrganizationRepository};
use crate::contract::{
    MigrationOptions, MigrationOutcome, MigrationSummary, Organization, RecordFailure,
    RegistryError, RollbackOutcome, RollbackSummary,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// One batch slot: the requested id and the loaded record or why it is missing
type BatchEntry = (Uuid, Result<Organization, RegistryError>);

pub struct MigrationEngine {
    organizations: Arc<dyn OrganizationRepository>,
    store: Arc<dyn NormalizationStore>,
    reporter: Arc<dyn ProgressReporter>,
}

impl MigrationEngine {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        store: Arc<dyn NormalizationStore>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            organizations,
            store,
            reporter,
        }
    }

    // ===== Single record =====

    /// Convert one organization. Dry runs plan the same rows and write nothing.
    pub async fn migrate_organization(
        &self,
        organization: &Organization,
        dry_run: bool,
    ) -> Result<MigrationOutcome, RegistryError> {
        if organization.is_normalized {
            return Ok(MigrationOutcome::Skipped);
        }

        let plan = plan_migration(organization, Utc::now());
        if !dry_run {
            if let Err(e) = self.store.commit_migration(&plan).await {
                if e.downcast_ref::<AlreadyNormalized>().is_some() {
                    return Ok(MigrationOutcome::Skipped);
                }
                return Err(RegistryError::store(e));
            }
        }

        Ok(MigrationOutcome::Migrated {
            members_created: plan.members.len(),
            documents_created: plan.documents.len(),
            anomalies: plan.anomalies,
        })
    }

    /// Revert one organization to legacy reads
    pub async fn rollback_organization(
        &self,
        organization: &Organization,
        dry_run: bool,
    ) -> Result<RollbackOutcome, RegistryError> {
        if !organization.is_normalized {
            return Ok(RollbackOutcome::Skipped);
        }

        let plan = RollbackPlan::for_organization(organization);
        if dry_run {
            return Ok(RollbackOutcome::RolledBack {
                members_deleted: plan.member_ids.len(),
                documents_deleted: plan.document_ids.len(),
            });
        }

        match self.store.commit_rollback(&plan).await {
            Ok((members_deleted, documents_deleted)) => Ok(RollbackOutcome::RolledBack {
                members_deleted,
                documents_deleted,
            }),
            Err(e) if e.downcast_ref::<NotNormalized>().is_some() => Ok(RollbackOutcome::Skipped),
            Err(e) => Err(RegistryError::store(e)),
        }
    }

    // ===== Batch runs =====

    /// Migrate every legacy organization (or the targeted one)
    pub async fn run_migration(
        &self,
        options: &MigrationOptions,
    ) -> Result<MigrationSummary, RegistryError> {
        validate_batch_size(options.batch_size)?;
        let ids = self.select(options.organization_id, false).await?;
        tracing::info!(
            organizations = ids.len(),
            batch_size = options.batch_size,
            dry_run = options.dry_run,
            "starting migration run"
        );

        let mut summary = MigrationSummary {
            dry_run: options.dry_run,
            ..Default::default()
        };

        for (n, chunk) in ids.chunks(options.batch_size).enumerate() {
            tracing::debug!(batch = n + 1, size = chunk.len(), "processing batch");
            for (id, organization) in self.load_batch(chunk).await {
                summary.processed += 1;
                let result = match &organization {
                    Ok(org) => self.migrate_organization(org, options.dry_run).await,
                    Err(e) => Err(e.clone()),
                };
                match result {
                    Ok(MigrationOutcome::Migrated {
                        members_created,
                        documents_created,
                        anomalies,
                    }) => {
                        summary.migrated += 1;
                        summary.members_created += members_created;
                        summary.documents_created += documents_created;
                        self.report(NormalizationEvent::migrated(
                            id,
                            members_created,
                            documents_created,
                            anomalies,
                            options.dry_run,
                        ))
                        .await;
                    }
                    Ok(MigrationOutcome::Skipped) => {
                        summary.skipped += 1;
                        self.report(NormalizationEvent::skipped(id, "already normalized"))
                            .await;
                    }
                    Err(e) => {
                        summary.errors += 1;
                        summary.failures.push(RecordFailure {
                            organization_id: id,
                            error: e.to_string(),
                        });
                        self.report(NormalizationEvent::failed(id, "migrate", e.to_string()))
                            .await;
                    }
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            migrated = summary.migrated,
            skipped = summary.skipped,
            errors = summary.errors,
            members_created = summary.members_created,
            documents_created = summary.documents_created,
            dry_run = summary.dry_run,
            "migration run finished"
        );
        Ok(summary)
    }

    /// Roll back every normalized organization (or the targeted one)
    pub async fn run_rollback(
        &self,
        options: &MigrationOptions,
    ) -> Result<RollbackSummary, RegistryError> {
        validate_batch_size(options.batch_size)?;
        let ids = self.select(options.organization_id, true).await?;
        tracing::info!(
            organizations = ids.len(),
            batch_size = options.batch_size,
            dry_run = options.dry_run,
            "starting rollback run"
        );

        let mut summary = RollbackSummary {
            dry_run: options.dry_run,
            ..Default::default()
        };

        for (n, chunk) in ids.chunks(options.batch_size).enumerate() {
            tracing::debug!(batch = n + 1, size = chunk.len(), "processing batch");
            for (id, organization) in self.load_batch(chunk).await {
                summary.processed += 1;
                let result = match &organization {
                    Ok(org) => self.rollback_organization(org, options.dry_run).await,
                    Err(e) => Err(e.clone()),
                };
                match result {
                    Ok(RollbackOutcome::RolledBack {
                        members_deleted,
                        documents_deleted,
                    }) => {
                        summary.rolled_back += 1;
                        summary.members_deleted += members_deleted;
                        summary.documents_deleted += documents_deleted;
                        self.report(NormalizationEvent::rolled_back(
                            id,
                            members_deleted,
                            documents_deleted,
                            options.dry_run,
                        ))
                        .await;
                    }
                    Ok(RollbackOutcome::Skipped) => {
                        summary.skipped += 1;
                        self.report(NormalizationEvent::skipped(id, "not normalized"))
                            .await;
                    }
                    Err(e) => {
                        summary.errors += 1;
                        summary.failures.push(RecordFailure {
                            organization_id: id,
                            error: e.to_string(),
                        });
                        self.report(NormalizationEvent::failed(id, "rollback", e.to_string()))
                            .await;
                    }
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            rolled_back = summary.rolled_back,
            skipped = summary.skipped,
            errors = summary.errors,
            members_deleted = summary.members_deleted,
            documents_deleted = summary.documents_deleted,
            dry_run = summary.dry_run,
            "rollback run finished"
        );
        Ok(summary)
    }

    /// Ids to process. A targeted id is always processed so that a record
    /// in the wrong state is reported as skipped.
    async fn select(
        &self,
        target: Option<Uuid>,
        normalized: bool,
    ) -> Result<Vec<Uuid>, RegistryError> {
        match target {
            Some(id) => {
                let exists = self
                    .organizations
                    .find_by_id(id)
                    .await
                    .map_err(RegistryError::store)?
                    .is_some();
                if !exists {
                    return Err(RegistryError::organization_not_found(id));
                }
                Ok(vec![id])
            }
            None => self
                .organizations
                .list_ids(normalized)
                .await
                .map_err(RegistryError::store),
        }
    }

    /// Load one batch, keeping the requested order. A failed fetch fails
    /// every id of the batch; an unreadable record fails only itself.
    async fn load_batch(&self, chunk: &[Uuid]) -> Vec<BatchEntry> {
        match self.organizations.find_by_ids(chunk).await {
            Ok(organizations) => {
                let mut found: HashMap<Uuid, anyhow::Result<Organization>> =
                    organizations.into_iter().collect();
                chunk
                    .iter()
                    .map(|id| {
                        let entry = match found.remove(id) {
                            Some(Ok(organization)) => Ok(organization),
                            Some(Err(e)) => Err(RegistryError::store(e)),
                            None => Err(RegistryError::organization_not_found(*id)),
                        };
                        (*id, entry)
                    })
                    .collect()
            }
            Err(e) => {
                let error = RegistryError::store(e);
                tracing::error!(error = %error, size = chunk.len(), "failed to load batch");
                chunk.iter().map(|id| (*id, Err(error.clone()))).collect()
            }
        }
    }

    async fn report(&self, event: NormalizationEvent) {
        let organization_id = event.organization_id();
        if let Err(e) = self.reporter.report(event).await {
            tracing::warn!(%organization_id, error = %e, "progress reporter failed");
        }
    }
}

fn validate_batch_size(batch_size: usize) -> Result<(), RegistryError> {
    if batch_size == 0 {
        return Err(RegistryError::Validation {
            message: "batch_size must be greater than zero".to_string(),
        });
    }
    Ok(())
}
