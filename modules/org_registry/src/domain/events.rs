//! Progress events for normalization runs
//!
//! One event is reported per organization processed by a batch run:
//! - Migrated / rolled back (including dry-run intent)
//! - Skipped (already in the requested format)
//! - Failed (transaction aborted, record untouched)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-organization outcome events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum NormalizationEvent {
    /// Organization converted to normalized format
    OrganizationMigrated(OrganizationMigratedEvent),
    /// Organization reverted to legacy format
    OrganizationRolledBack(OrganizationRolledBackEvent),
    /// Organization already in the requested format
    OrganizationSkipped(OrganizationSkippedEvent),
    /// Organization failed; its transaction was aborted
    OrganizationFailed(OrganizationFailedEvent),
}

/// Event data for a migrated organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMigratedEvent {
    pub organization_id: Uuid,
    pub members_created: usize,
    pub documents_created: usize,
    /// Repaired data problems (placeholder ruts, unknown roles, ...)
    pub anomalies: Vec<String>,
    /// Nothing was written
    pub dry_run: bool,
    pub timestamp: DateTime<Utc>,
}

/// Event data for a rolled back organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRolledBackEvent {
    pub organization_id: Uuid,
    pub members_deleted: usize,
    pub documents_deleted: usize,
    pub dry_run: bool,
    pub timestamp: DateTime<Utc>,
}

/// Event data for a skipped organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSkippedEvent {
    pub organization_id: Uuid,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Event data for a failed organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationFailedEvent {
    pub organization_id: Uuid,
    /// "migrate" or "rollback"
    pub operation: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl NormalizationEvent {
    pub fn migrated(
        organization_id: Uuid,
        members_created: usize,
        documents_created: usize,
        anomalies: Vec<String>,
        dry_run: bool,
    ) -> Self {
        Self::OrganizationMigrated(OrganizationMigratedEvent {
            organization_id,
            members_created,
            documents_created,
            anomalies,
            dry_run,
            timestamp: Utc::now(),
        })
    }

    pub fn rolled_back(
        organization_id: Uuid,
        members_deleted: usize,
        documents_deleted: usize,
        dry_run: bool,
    ) -> Self {
        Self::OrganizationRolledBack(OrganizationRolledBackEvent {
            organization_id,
            members_deleted,
            documents_deleted,
            dry_run,
            timestamp: Utc::now(),
        })
    }

    pub fn skipped(organization_id: Uuid, reason: impl Into<String>) -> Self {
        Self::OrganizationSkipped(OrganizationSkippedEvent {
            organization_id,
            reason: reason.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn failed(organization_id: Uuid, operation: &str, error: impl Into<String>) -> Self {
        Self::OrganizationFailed(OrganizationFailedEvent {
            organization_id,
            operation: operation.to_string(),
            error: error.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn organization_id(&self) -> Uuid {
        match self {
            Self::OrganizationMigrated(e) => e.organization_id,
            Self::OrganizationRolledBack(e) => e.organization_id,
            Self::OrganizationSkipped(e) => e.organization_id,
            Self::OrganizationFailed(e) => e.organization_id,
        }
    }
}

/// Sink for per-organization progress
///
/// Implementations must not fail the run; errors are logged and dropped
/// by the caller.
#[async_trait::async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, event: NormalizationEvent) -> anyhow::Result<()>;
}

/// Reports progress as structured `tracing` events
pub struct TracingProgressReporter;

#[async_trait::async_trait]
impl ProgressReporter for TracingProgressReporter {
    async fn report(&self, event: NormalizationEvent) -> anyhow::Result<()> {
        match &event {
            NormalizationEvent::OrganizationMigrated(e) => {
                tracing::info!(
                    organization_id = %e.organization_id,
                    members = e.members_created,
                    documents = e.documents_created,
                    anomalies = e.anomalies.len(),
                    dry_run = e.dry_run,
                    "organization migrated"
                );
                for anomaly in &e.anomalies {
                    tracing::warn!(organization_id = %e.organization_id, "{}", anomaly);
                }
            }
            NormalizationEvent::OrganizationRolledBack(e) => {
                tracing::info!(
                    organization_id = %e.organization_id,
                    members = e.members_deleted,
                    documents = e.documents_deleted,
                    dry_run = e.dry_run,
                    "organization rolled back"
                );
            }
            NormalizationEvent::OrganizationSkipped(e) => {
                tracing::info!(
                    organization_id = %e.organization_id,
                    reason = %e.reason,
                    "organization skipped"
                );
            }
            NormalizationEvent::OrganizationFailed(e) => {
                tracing::error!(
                    organization_id = %e.organization_id,
                    operation = %e.operation,
                    error = %e.error,
                    "organization failed"
                );
            }
        }
        Ok(())
    }
}

/// No-op reporter for testing or when progress output is disabled
pub struct NoOpProgressReporter;

#[async_trait::async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report(&self, _event: NormalizationEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
